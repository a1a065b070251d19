use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of personality/behaviour questions (`q1`..`q10`).
pub const PERSONALITY_QUESTIONS: usize = 10;
/// Number of stress-level questions (`q11`..`q15`).
pub const STRESS_QUESTIONS: usize = 5;

/// Answer to a personality question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PersonalityResponse {
    A,
    B,
    C,
    D,
    E,
}

impl PersonalityResponse {
    pub const ALL: [PersonalityResponse; 5] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    pub const fn label(self) -> &'static str {
        match self {
            PersonalityResponse::A => "A",
            PersonalityResponse::B => "B",
            PersonalityResponse::C => "C",
            PersonalityResponse::D => "D",
            PersonalityResponse::E => "E",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.label().eq_ignore_ascii_case(raw.trim()))
    }

    /// D and E answers signal elevated stress.
    pub const fn is_high_stress(self) -> bool {
        matches!(self, PersonalityResponse::D | PersonalityResponse::E)
    }

    /// A and B answers signal low stress.
    pub const fn is_low_stress(self) -> bool {
        matches!(self, PersonalityResponse::A | PersonalityResponse::B)
    }
}

/// Answer to a stress-level question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StressLevel {
    Low,
    Medium,
    High,
}

impl StressLevel {
    pub const fn label(self) -> &'static str {
        match self {
            StressLevel::Low => "Low",
            StressLevel::Medium => "Medium",
            StressLevel::High => "High",
        }
    }

    pub const fn ordinal(self) -> u8 {
        match self {
            StressLevel::Low => 1,
            StressLevel::Medium => 2,
            StressLevel::High => 3,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Validation failures for a raw questionnaire submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerError {
    #[error("question {0} was not answered")]
    Missing(String),
    #[error("response '{value}' is not valid for question {question}")]
    InvalidResponse { question: String, value: String },
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),
}

/// A complete, validated questionnaire submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSet {
    personality: [PersonalityResponse; PERSONALITY_QUESTIONS],
    stress: [StressLevel; STRESS_QUESTIONS],
}

impl AnswerSet {
    pub fn new(
        personality: [PersonalityResponse; PERSONALITY_QUESTIONS],
        stress: [StressLevel; STRESS_QUESTIONS],
    ) -> Self {
        Self {
            personality,
            stress,
        }
    }

    /// Validate the web-layer mapping of question key to response string.
    pub fn from_raw(raw: &BTreeMap<String, String>) -> Result<Self, AnswerError> {
        if let Some(unknown) = raw.keys().find(|key| question_index(key).is_none()) {
            return Err(AnswerError::UnknownQuestion(unknown.clone()));
        }

        let mut personality = [PersonalityResponse::A; PERSONALITY_QUESTIONS];
        for (offset, slot) in personality.iter_mut().enumerate() {
            let key = question_key(offset + 1);
            let value = raw.get(&key).ok_or_else(|| AnswerError::Missing(key.clone()))?;
            *slot = PersonalityResponse::parse(value).ok_or_else(|| {
                AnswerError::InvalidResponse {
                    question: key.clone(),
                    value: value.clone(),
                }
            })?;
        }

        let mut stress = [StressLevel::Low; STRESS_QUESTIONS];
        for (offset, slot) in stress.iter_mut().enumerate() {
            let key = question_key(PERSONALITY_QUESTIONS + offset + 1);
            let value = raw.get(&key).ok_or_else(|| AnswerError::Missing(key.clone()))?;
            *slot = StressLevel::parse(value).ok_or_else(|| AnswerError::InvalidResponse {
                question: key.clone(),
                value: value.clone(),
            })?;
        }

        Ok(Self::new(personality, stress))
    }

    pub fn personality(&self) -> &[PersonalityResponse; PERSONALITY_QUESTIONS] {
        &self.personality
    }

    pub fn stress_levels(&self) -> &[StressLevel; STRESS_QUESTIONS] {
        &self.stress
    }

    /// Ordinal codes (1..=3) of the stress-level answers, in question order.
    pub fn stress_codes(&self) -> Vec<u8> {
        self.stress.iter().map(|level| level.ordinal()).collect()
    }

    pub fn high_stress_count(&self) -> u8 {
        self.personality
            .iter()
            .filter(|response| response.is_high_stress())
            .count() as u8
    }

    pub fn low_stress_count(&self) -> u8 {
        self.personality
            .iter()
            .filter(|response| response.is_low_stress())
            .count() as u8
    }

    /// Canonical key/label mapping, used for persistence and prompts.
    pub fn to_raw(&self) -> BTreeMap<String, String> {
        let personality = self
            .personality
            .iter()
            .enumerate()
            .map(|(offset, response)| (question_key(offset + 1), response.label().to_string()));
        let stress = self.stress.iter().enumerate().map(|(offset, level)| {
            (
                question_key(PERSONALITY_QUESTIONS + offset + 1),
                level.label().to_string(),
            )
        });
        personality.chain(stress).collect()
    }
}

impl fmt::Display for AnswerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let personality: String = self.personality.iter().map(|r| r.label()).collect();
        let stress: Vec<&str> = self.stress.iter().map(|l| l.label()).collect();
        write!(f, "{} / {}", personality, stress.join(","))
    }
}

pub fn question_key(number: usize) -> String {
    format!("q{number}")
}

/// Only the canonical spelling counts: `q01` and `q+1` are unknown keys.
fn question_index(key: &str) -> Option<usize> {
    (1..=PERSONALITY_QUESTIONS + STRESS_QUESTIONS).find(|&number| question_key(number) == key)
}
