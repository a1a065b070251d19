use super::classifier::{EncoderSet, EncodingError};
use super::questionnaire::{question_key, AnswerSet, PERSONALITY_QUESTIONS};

/// Encoded personality answers, stress score, high- and low-stress counts.
pub const FEATURE_COUNT: usize = PERSONALITY_QUESTIONS + 3;

/// Classifier input in training order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

pub fn prepare_features(
    answers: &AnswerSet,
    stress_score: f64,
    encoders: &EncoderSet,
) -> Result<FeatureVector, EncodingError> {
    let mut features = Vec::with_capacity(FEATURE_COUNT);

    for (offset, response) in answers.personality().iter().enumerate() {
        let code = encoders.encode(&question_key(offset + 1), response.label())?;
        features.push(code as f64);
    }

    features.push(stress_score);
    features.push(f64::from(answers.high_stress_count()));
    features.push(f64::from(answers.low_stress_count()));

    Ok(FeatureVector(features))
}
