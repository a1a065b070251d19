use std::collections::BTreeMap;

use serde::Deserialize;

/// Failure to turn a categorical answer into its fitted numeric code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("response '{value}' for {question} was not seen when the encoder was fitted")]
    UnknownCategory { question: String, value: String },
    #[error("no fitted encoder for {0}")]
    MissingEncoder(String),
}

/// Label encoder fitted on a fixed class list; a value encodes to its index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CategoricalEncoder {
    classes: Vec<String>,
}

impl CategoricalEncoder {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, question: &str, value: &str) -> Result<usize, EncodingError> {
        self.classes
            .iter()
            .position(|class| class == value)
            .ok_or_else(|| EncodingError::UnknownCategory {
                question: question.to_string(),
                value: value.to_string(),
            })
    }
}

/// Per-question encoders keyed by question identifier (`q1`, `q2`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct EncoderSet {
    encoders: BTreeMap<String, CategoricalEncoder>,
}

impl EncoderSet {
    pub fn insert(&mut self, question: impl Into<String>, encoder: CategoricalEncoder) {
        self.encoders.insert(question.into(), encoder);
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    pub fn encode(&self, question: &str, value: &str) -> Result<usize, EncodingError> {
        self.encoders
            .get(question)
            .ok_or_else(|| EncodingError::MissingEncoder(question.to_string()))?
            .transform(question, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_by_fitted_position() {
        let encoder = CategoricalEncoder::new(["A", "B", "C", "D", "E"]);
        assert_eq!(encoder.transform("q1", "A"), Ok(0));
        assert_eq!(encoder.transform("q1", "E"), Ok(4));
    }

    #[test]
    fn unseen_values_fail_instead_of_defaulting() {
        let encoder = CategoricalEncoder::new(["A", "B", "C"]);
        assert_eq!(
            encoder.transform("q4", "D"),
            Err(EncodingError::UnknownCategory {
                question: "q4".to_string(),
                value: "D".to_string(),
            })
        );
    }

    #[test]
    fn missing_question_encoder_is_reported() {
        let encoders: EncoderSet =
            serde_json::from_str(r#"{ "q1": ["A", "B"] }"#).expect("encoders parse");
        assert_eq!(encoders.encode("q1", "B"), Ok(1));
        assert_eq!(
            encoders.encode("q2", "A"),
            Err(EncodingError::MissingEncoder("q2".to_string()))
        );
    }
}
