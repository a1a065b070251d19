use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::pipeline::{AssessmentPipeline, ScoreCard};
use super::questionnaire::{AnswerError, AnswerSet};
use super::repository::{AssessmentId, AssessmentLog, AssessmentRecord, AssessmentRepository};
use crate::accounts::User;
use crate::repository::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Answers(#[from] AnswerError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("assessment not found")]
    NotFound,
    #[error("assessment belongs to another account")]
    Forbidden,
}

/// Runs submitted questionnaires through the pipeline and keeps the results.
pub struct AssessmentService<R, L> {
    pipeline: Arc<AssessmentPipeline>,
    repository: Arc<R>,
    log: Arc<L>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    AssessmentId(ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

impl<R, L> AssessmentService<R, L>
where
    R: AssessmentRepository + 'static,
    L: AssessmentLog + 'static,
{
    pub fn new(pipeline: Arc<AssessmentPipeline>, repository: Arc<R>, log: Arc<L>) -> Self {
        Self {
            pipeline,
            repository,
            log,
        }
    }

    /// Evaluate and persist one submission. May block on the summary generator.
    pub fn submit(
        &self,
        user: &User,
        raw: &BTreeMap<String, String>,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let answers = AnswerSet::from_raw(raw)?;
        let outcome = self.pipeline.evaluate(&answers, user.age);

        let record = AssessmentRecord {
            id: next_assessment_id(),
            user_id: user.id,
            stress_score: outcome.score_card.stress_score,
            recommendation: outcome.score_card.recommendation,
            summary: outcome.summary,
            responses: answers.to_raw(),
            created_at: Utc::now(),
        };
        let record = self.repository.insert(record)?;

        if let Err(err) = self.log.append(&user.email, &record) {
            warn!(assessment_id = record.id.0, error = %err, "failed to append assessment log");
        }

        info!(
            assessment_id = record.id.0,
            user_id = user.id.0,
            category = %record.recommendation.category,
            "assessment stored"
        );
        Ok(record)
    }

    pub fn get(
        &self,
        user: &User,
        id: AssessmentId,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(AssessmentServiceError::NotFound)?;
        if record.user_id != user.id {
            return Err(AssessmentServiceError::Forbidden);
        }
        Ok(record)
    }

    /// The caller's assessments, newest first.
    pub fn history(&self, user: &User) -> Result<Vec<AssessmentRecord>, AssessmentServiceError> {
        Ok(self.repository.list_for_user(user.id)?)
    }

    /// Stateless scoring; nothing is stored and no summary is requested.
    pub fn score(&self, raw: &BTreeMap<String, String>) -> Result<ScoreCard, AssessmentServiceError> {
        let answers = AnswerSet::from_raw(raw)?;
        Ok(self.pipeline.score(&answers))
    }
}
