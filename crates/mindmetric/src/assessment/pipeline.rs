use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::details::CategoryDetails;
use super::questionnaire::AnswerSet;
use super::recommendation::Recommendation;
use super::resolver::RecommendationResolver;
use super::scoring::stress_score;
use super::summary::{summarize, Summary, SummaryGenerator, SummaryRequest};

/// Score and recommendation, without the narrative summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    pub stress_score: f64,
    pub high_stress_count: u8,
    pub low_stress_count: u8,
    pub recommendation: Recommendation,
    pub details: CategoryDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentOutcome {
    pub score_card: ScoreCard,
    pub summary: Summary,
}

/// Answers -> stress score -> recommendation -> summary.
#[derive(Debug, Clone)]
pub struct AssessmentPipeline {
    resolver: RecommendationResolver,
    summaries: Arc<dyn SummaryGenerator>,
}

impl AssessmentPipeline {
    pub fn new(resolver: RecommendationResolver, summaries: Arc<dyn SummaryGenerator>) -> Self {
        Self {
            resolver,
            summaries,
        }
    }

    /// Scoring and recommendation only; never touches the network.
    pub fn score(&self, answers: &AnswerSet) -> ScoreCard {
        let stress_score = stress_score(&answers.stress_codes());
        let recommendation = self.resolver.resolve(answers, stress_score);

        ScoreCard {
            stress_score,
            high_stress_count: answers.high_stress_count(),
            low_stress_count: answers.low_stress_count(),
            recommendation,
            details: recommendation.category.details(),
        }
    }

    /// Full evaluation including the summary. May block on the summary collaborator.
    pub fn evaluate(&self, answers: &AnswerSet, age: u8) -> AssessmentOutcome {
        let score_card = self.score(answers);
        let summary = summarize(
            self.summaries.as_ref(),
            &SummaryRequest {
                answers,
                stress_score: score_card.stress_score,
                age,
            },
        );

        info!(
            stress_score = score_card.stress_score,
            category = %score_card.recommendation.category,
            source = ?score_card.recommendation.source,
            summary = ?summary.source,
            "assessment evaluated"
        );

        AssessmentOutcome {
            score_card,
            summary,
        }
    }
}
