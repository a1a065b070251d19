//! MindMetric: self-assessment scoring, content recommendation, and
//! consultation booking.

pub mod accounts;
pub mod assessment;
pub mod booking;
pub mod config;
pub mod error;
pub mod notifications;
pub mod repository;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;
