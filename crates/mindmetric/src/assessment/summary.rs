use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::questionnaire::{AnswerSet, PERSONALITY_QUESTIONS};

/// Inputs handed to a text-generation collaborator.
#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    pub answers: &'a AnswerSet,
    pub stress_score: f64,
    pub age: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("text generation is not configured")]
    NotConfigured,
    #[error("text generation request failed: {0}")]
    Transport(String),
    #[error("text generation returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("text generation response was malformed: {0}")]
    Malformed(String),
    #[error("text generation returned no text")]
    Empty,
}

/// External natural-language summary collaborator.
pub trait SummaryGenerator: Debug + Send + Sync {
    fn generate(&self, request: &SummaryRequest<'_>) -> Result<String, SummaryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub text: String,
    pub source: SummarySource,
}

/// Ask the generator for a summary, degrading to the templated message on any failure.
pub fn summarize(generator: &dyn SummaryGenerator, request: &SummaryRequest<'_>) -> Summary {
    match generator.generate(request) {
        Ok(text) => Summary {
            text: text.trim().to_string(),
            source: SummarySource::Generated,
        },
        Err(SummaryError::NotConfigured) => fallback_summary(request.stress_score, request.age),
        Err(err) => {
            warn!(error = %err, "summary generation failed, using templated summary");
            fallback_summary(request.stress_score, request.age)
        }
    }
}

/// Generator used when no text-generation API is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateSummaryGenerator;

impl SummaryGenerator for TemplateSummaryGenerator {
    fn generate(&self, _request: &SummaryRequest<'_>) -> Result<String, SummaryError> {
        Err(SummaryError::NotConfigured)
    }
}

/// Coarse age grouping used to tailor the templated summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBracket {
    Youth,
    YoungAdult,
    Adult,
    Senior,
}

impl AgeBracket {
    pub fn from_age(age: u8) -> Self {
        match age {
            0..=17 => Self::Youth,
            18..=25 => Self::YoungAdult,
            26..=59 => Self::Adult,
            _ => Self::Senior,
        }
    }

    fn life_stage(self) -> &'static str {
        match self {
            AgeBracket::Youth => "while you are still in school",
            AgeBracket::YoungAdult => "in early adulthood",
            AgeBracket::Adult => "alongside work and family demands",
            AgeBracket::Senior => "later in life",
        }
    }

    fn support_hint(self) -> &'static str {
        match self {
            AgeBracket::Youth => "a parent, teacher, or school counselor",
            AgeBracket::YoungAdult => "a campus or community counselor",
            AgeBracket::Adult => "your doctor or a licensed therapist",
            AgeBracket::Senior => "your physician or a geriatric care specialist",
        }
    }
}

/// Deterministic summary keyed only on the stress score band and age bracket.
pub fn fallback_summary(stress_score: f64, age: u8) -> Summary {
    let bracket = AgeBracket::from_age(age);
    let text = if stress_score <= 3.0 {
        format!(
            "Based on your assessment, you appear to be managing stress relatively well. \
             Keeping up good mental health habits {} supports long-term wellness. Your current \
             stress level suggests you have developed effective coping mechanisms. Continue with \
             regular self-care and mindfulness practices to maintain this positive state.",
            bracket.life_stage()
        )
    } else if stress_score <= 6.0 {
        format!(
            "Your assessment indicates moderate stress levels, which are common {}. You may \
             benefit from adding stress management techniques to your daily routine. Consider \
             meditation, regular exercise, or speaking with {} to build stronger coping \
             strategies.",
            bracket.life_stage(),
            bracket.support_hint()
        )
    } else {
        format!(
            "Your assessment shows elevated stress levels that deserve prompt attention. \
             Consider reaching out to {} for personalized support. In the meantime, focus on \
             basic self-care: adequate sleep, regular meals, and gentle exercise can help manage \
             acute stress symptoms.",
            bracket.support_hint()
        )
    };

    Summary {
        text,
        source: SummarySource::Fallback,
    }
}

/// Prompt sent to the text-generation API.
pub fn build_prompt(request: &SummaryRequest<'_>) -> String {
    let answers = request.answers;
    let stress_responses: Vec<&str> = answers
        .stress_levels()
        .iter()
        .map(|level| level.label())
        .collect();

    format!(
        "You are a professional psychologist providing a personalized mental wellness assessment.\n\
         Based on the following data, create a psychological summary.\n\n\
         USER PROFILE:\n\
         - Age: {age}\n\
         - Stress Score: {score}/10\n\
         - High-stress indicators: {high}/{total}\n\
         - Low-stress indicators: {low}/{total}\n\n\
         STRESS LEVEL RESPONSES:\n\
         {stress}\n\n\
         Provide a personalized analysis, each part on a new line, covering:\n\
         1. Current Mental State Assessment\n\
         2. Stress Management Insights\n\
         3. Behavioral Patterns Observed\n\
         4. Personalized Recommendations for Improvement\n\
         5. Coping Strategies Tailored to Their Profile\n\n\
         Keep the tone professional yet empathetic with actionable insights. Use plain text \
         with no emojis or decorative symbols. Limit the response to 300-400 words.",
        age = request.age,
        score = request.stress_score,
        high = answers.high_stress_count(),
        low = answers.low_stress_count(),
        total = PERSONALITY_QUESTIONS,
        stress = stress_responses.join(", "),
    )
}
