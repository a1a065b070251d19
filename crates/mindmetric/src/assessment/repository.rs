use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::details::CategoryDetails;
use super::recommendation::Recommendation;
use super::summary::Summary;
use crate::accounts::UserId;
use crate::repository::RepositoryError;

/// Identifier wrapper for persisted assessments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssessmentId(pub u64);

/// Derived results of one questionnaire submission. Raw answers are kept only
/// in their canonical label form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    pub user_id: UserId,
    pub stress_score: f64,
    pub recommendation: Recommendation,
    pub summary: Summary,
    pub responses: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl AssessmentRecord {
    /// API projection, with the category's detailed guidance attached.
    pub fn view(&self) -> AssessmentView {
        AssessmentView {
            id: self.id,
            stress_score: self.stress_score,
            recommendation: self.recommendation,
            details: self.recommendation.category.details(),
            summary: self.summary.clone(),
            responses: self.responses.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentView {
    pub id: AssessmentId,
    pub stress_score: f64,
    pub recommendation: Recommendation,
    pub details: CategoryDetails,
    pub summary: Summary,
    pub responses: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction for assessment results.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError>;
    fn fetch(&self, id: AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    /// All records owned by `user`, newest first.
    fn list_for_user(&self, user: UserId) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}

/// Append-only audit trail of completed assessments.
pub trait AssessmentLog: Send + Sync {
    fn append(&self, email: &str, record: &AssessmentRecord) -> Result<(), AssessmentLogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AssessmentLogError {
    #[error("failed to open assessment log: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write assessment log row: {0}")]
    Csv(#[from] csv::Error),
}
