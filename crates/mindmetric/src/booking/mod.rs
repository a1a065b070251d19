//! Consultation booking with one booking per date and time slot.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;


pub use domain::{
    parse_date, parse_time, Booking, BookingId, BookingRequest, BookingStatus, ConsultationType,
};
pub use repository::BookingRepository;
pub use router::booking_router;
pub use service::{BookingError, BookingService};
