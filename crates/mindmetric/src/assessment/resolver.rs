use std::sync::Arc;

use tracing::{debug, warn};

use super::classifier::ArtifactCache;
use super::questionnaire::AnswerSet;
use super::recommendation::{fallback_recommendation, Recommendation};

/// Picks a content category, preferring the classifier and falling back to
/// the score bucket table on any classifier fault.
#[derive(Debug, Clone)]
pub struct RecommendationResolver {
    artifacts: Arc<ArtifactCache>,
}

impl RecommendationResolver {
    pub fn new(artifacts: Arc<ArtifactCache>) -> Self {
        Self { artifacts }
    }

    pub fn resolve(&self, answers: &AnswerSet, stress_score: f64) -> Recommendation {
        let high_stress_count = answers.high_stress_count();

        let Some(artifact) = self.artifacts.get() else {
            debug!(stress_score, "no classifier artifact, using score buckets");
            return fallback_recommendation(stress_score, high_stress_count);
        };

        match artifact.recommend(answers, stress_score) {
            Ok(recommendation) => recommendation,
            Err(err) => {
                warn!(error = %err, stress_score, "classifier prediction failed, using score buckets");
                fallback_recommendation(stress_score, high_stress_count)
            }
        }
    }
}
