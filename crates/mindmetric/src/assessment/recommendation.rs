use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coping-content categories a user can be pointed towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentCategory {
    #[serde(rename = "Meditation")]
    Meditation,
    #[serde(rename = "Nature Sounds")]
    NatureSounds,
    #[serde(rename = "Relaxing Music")]
    RelaxingMusic,
    #[serde(rename = "Guided Breathing")]
    GuidedBreathing,
    #[serde(rename = "Professional Therapy")]
    ProfessionalTherapy,
    #[serde(rename = "Podcasts")]
    Podcasts,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 6] = [
        Self::Meditation,
        Self::NatureSounds,
        Self::RelaxingMusic,
        Self::GuidedBreathing,
        Self::ProfessionalTherapy,
        Self::Podcasts,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ContentCategory::Meditation => "Meditation",
            ContentCategory::NatureSounds => "Nature Sounds",
            ContentCategory::RelaxingMusic => "Relaxing Music",
            ContentCategory::GuidedBreathing => "Guided Breathing",
            ContentCategory::ProfessionalTherapy => "Professional Therapy",
            ContentCategory::Podcasts => "Podcasts",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a known content category")]
pub struct UnknownCategory(pub String);

impl FromStr for ContentCategory {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownCategory(value.to_string()))
    }
}

/// Which resolution path produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Classifier,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: ContentCategory,
    pub confidence: f64,
    pub source: RecommendationSource,
}

/// Outcome of a score bucket: a fixed category, or one chosen by the
/// high-stress indicator count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BucketOutcome {
    Fixed(ContentCategory),
    ByIndicators {
        above_threshold: ContentCategory,
        otherwise: ContentCategory,
    },
}

/// High-stress indicator count above which the top bucket prefers
/// professional support.
pub const HIGH_STRESS_INDICATOR_THRESHOLD: u8 = 3;

const MAX_SCORE: f64 = 10.0;

/// Contiguous `[lower, upper)` score ranges checked in order; the last range
/// also includes `MAX_SCORE`.
const FALLBACK_BUCKETS: [(f64, f64, BucketOutcome); 5] = [
    (0.0, 2.0, BucketOutcome::Fixed(ContentCategory::Meditation)),
    (2.0, 4.0, BucketOutcome::Fixed(ContentCategory::NatureSounds)),
    (4.0, 6.0, BucketOutcome::Fixed(ContentCategory::RelaxingMusic)),
    (6.0, 8.0, BucketOutcome::Fixed(ContentCategory::GuidedBreathing)),
    (
        8.0,
        MAX_SCORE,
        BucketOutcome::ByIndicators {
            above_threshold: ContentCategory::ProfessionalTherapy,
            otherwise: ContentCategory::Podcasts,
        },
    ),
];

/// Deterministic score-range lookup used whenever the classifier is unavailable.
///
/// Scores outside `[0, 10]` are clamped and NaN is read as `0.0`, so every input
/// lands in exactly one bucket.
pub fn fallback_category(stress_score: f64, high_stress_count: u8) -> ContentCategory {
    let score = if stress_score.is_nan() {
        0.0
    } else {
        stress_score.clamp(0.0, MAX_SCORE)
    };

    let last = FALLBACK_BUCKETS.len() - 1;
    let outcome = FALLBACK_BUCKETS
        .iter()
        .enumerate()
        .find(|(index, (lower, upper, _))| {
            score >= *lower && (score < *upper || (*index == last && score <= *upper))
        })
        .map(|(_, (_, _, outcome))| *outcome)
        .unwrap_or(FALLBACK_BUCKETS[last].2);

    match outcome {
        BucketOutcome::Fixed(category) => category,
        BucketOutcome::ByIndicators {
            above_threshold,
            otherwise,
        } => {
            if high_stress_count > HIGH_STRESS_INDICATOR_THRESHOLD {
                above_threshold
            } else {
                otherwise
            }
        }
    }
}

/// Static confidence for a score: extremes are more certain than the middle.
pub fn confidence_estimate(stress_score: f64) -> f64 {
    if stress_score <= 3.0 || stress_score >= 8.0 {
        0.85
    } else {
        0.75
    }
}

pub fn fallback_recommendation(stress_score: f64, high_stress_count: u8) -> Recommendation {
    Recommendation {
        category: fallback_category(stress_score, high_stress_count),
        confidence: confidence_estimate(stress_score),
        source: RecommendationSource::Fallback,
    }
}
