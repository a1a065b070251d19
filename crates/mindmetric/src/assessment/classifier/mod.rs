//! Pre-trained content classifier and its per-question encoders.
//!
//! The artifact is two JSON byte streams: a decision forest and the fitted
//! categorical encoders for the personality questions. Both are read once and
//! shared read-only for the lifetime of the process. A missing or corrupt
//! artifact is never fatal; callers fall back to the deterministic bucket table.

mod encoder;
mod forest;

pub use encoder::{CategoricalEncoder, EncoderSet, EncodingError};
pub use forest::{DecisionForest, DecisionTree, ForestPrediction, PredictionError, TreeNode};

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use super::features::{prepare_features, FEATURE_COUNT};
use super::questionnaire::AnswerSet;
use super::recommendation::{ContentCategory, Recommendation, RecommendationSource, UnknownCategory};
use crate::config::ArtifactConfig;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid classifier model: {0}")]
    Model(serde_json::Error),
    #[error("invalid encoder set: {0}")]
    Encoders(serde_json::Error),
    #[error(transparent)]
    Forest(#[from] PredictionError),
    #[error("model class is not a content category: {0}")]
    UnknownClass(#[from] UnknownCategory),
    #[error("model expects {found} features, the questionnaire produces {expected}")]
    FeatureShape { expected: usize, found: usize },
}

/// Failure while running the classifier on one answer set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

/// A validated forest paired with its encoders and resolved class labels.
#[derive(Debug, Clone)]
pub struct ClassifierArtifact {
    forest: DecisionForest,
    encoders: EncoderSet,
    categories: Vec<ContentCategory>,
}

impl ClassifierArtifact {
    pub fn new(forest: DecisionForest, encoders: EncoderSet) -> Result<Self, ArtifactError> {
        forest.validate()?;
        if forest.n_features != FEATURE_COUNT {
            return Err(ArtifactError::FeatureShape {
                expected: FEATURE_COUNT,
                found: forest.n_features,
            });
        }
        let categories = forest
            .classes
            .iter()
            .map(|label| label.parse::<ContentCategory>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            forest,
            encoders,
            categories,
        })
    }

    pub fn from_readers<M: Read, E: Read>(model: M, encoders: E) -> Result<Self, ArtifactError> {
        let forest: DecisionForest = serde_json::from_reader(model).map_err(ArtifactError::Model)?;
        let encoders: EncoderSet =
            serde_json::from_reader(encoders).map_err(ArtifactError::Encoders)?;
        Self::new(forest, encoders)
    }

    pub fn from_paths(model_path: &Path, encoders_path: &Path) -> Result<Self, ArtifactError> {
        let open = |path: &Path| {
            File::open(path)
                .map(BufReader::new)
                .map_err(|source| ArtifactError::Io {
                    path: path.to_path_buf(),
                    source,
                })
        };
        Self::from_readers(open(model_path)?, open(encoders_path)?)
    }

    pub fn classes(&self) -> &[ContentCategory] {
        &self.categories
    }

    /// Encode the answers and run a single-sample prediction.
    pub fn recommend(
        &self,
        answers: &AnswerSet,
        stress_score: f64,
    ) -> Result<Recommendation, ClassifierError> {
        let features = prepare_features(answers, stress_score, &self.encoders)?;
        let prediction = self.forest.predict(features.as_slice())?;

        Ok(Recommendation {
            category: self.categories[prediction.class_index],
            confidence: prediction.probability,
            source: RecommendationSource::Classifier,
        })
    }
}

/// Once-initialised, read-only holder for the classifier artifact.
///
/// The first call to [`ArtifactCache::get`] loads the artifact from disk and the
/// result, including a failed load, is kept for the life of the process.
#[derive(Debug)]
pub struct ArtifactCache {
    source: Option<ArtifactConfig>,
    loaded: OnceLock<Option<Arc<ClassifierArtifact>>>,
}

impl ArtifactCache {
    pub fn new(config: ArtifactConfig) -> Self {
        Self {
            source: Some(config),
            loaded: OnceLock::new(),
        }
    }

    /// Cache that already holds an artifact; nothing is read from disk.
    pub fn with_artifact(artifact: ClassifierArtifact) -> Self {
        let loaded = OnceLock::new();
        let _ = loaded.set(Some(Arc::new(artifact)));
        Self {
            source: None,
            loaded,
        }
    }

    /// Cache with no artifact; every lookup takes the fallback path.
    pub fn disabled() -> Self {
        let loaded = OnceLock::new();
        let _ = loaded.set(None);
        Self {
            source: None,
            loaded,
        }
    }

    pub fn get(&self) -> Option<Arc<ClassifierArtifact>> {
        self.loaded.get_or_init(|| self.load()).clone()
    }

    /// Force the load now, reporting whether a usable artifact is available.
    pub fn preload(&self) -> bool {
        self.get().is_some()
    }

    fn load(&self) -> Option<Arc<ClassifierArtifact>> {
        let config = self.source.as_ref()?;
        match ClassifierArtifact::from_paths(&config.model_path, &config.encoders_path) {
            Ok(artifact) => {
                info!(
                    model = %config.model_path.display(),
                    classes = artifact.classes().len(),
                    "classifier artifact loaded"
                );
                Some(Arc::new(artifact))
            }
            Err(err) => {
                warn!(
                    model = %config.model_path.display(),
                    encoders = %config.encoders_path.display(),
                    error = %err,
                    "classifier artifact unavailable, using score buckets"
                );
                None
            }
        }
    }
}
