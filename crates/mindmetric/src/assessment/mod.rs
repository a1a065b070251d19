//! Questionnaire scoring, content recommendation, and assessment history.
//!
//! A submission flows answers -> stress score -> recommendation -> summary.
//! The classifier is optional; every failure along the way degrades to the
//! deterministic score buckets or the templated summary.

pub mod classifier;
pub mod details;
pub mod features;
pub mod gemini;
pub mod log;
pub mod pipeline;
pub mod questionnaire;
pub mod recommendation;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod scoring;
pub mod service;
pub mod summary;

#[cfg(test)]
mod tests;

pub use classifier::{ArtifactCache, ArtifactError, ClassifierArtifact};
pub use details::CategoryDetails;
pub use gemini::GeminiSummaryGenerator;
pub use log::CsvAssessmentLog;
pub use pipeline::{AssessmentOutcome, AssessmentPipeline, ScoreCard};
pub use questionnaire::{AnswerError, AnswerSet, PersonalityResponse, StressLevel};
pub use recommendation::{ContentCategory, Recommendation, RecommendationSource};
pub use repository::{
    AssessmentId, AssessmentLog, AssessmentLogError, AssessmentRecord, AssessmentRepository,
    AssessmentView,
};
pub use resolver::RecommendationResolver;
pub use router::{assessment_router, AssessmentSubmission};
pub use scoring::stress_score;
pub use service::{AssessmentService, AssessmentServiceError};
pub use summary::{Summary, SummaryGenerator, SummarySource, TemplateSummaryGenerator};
