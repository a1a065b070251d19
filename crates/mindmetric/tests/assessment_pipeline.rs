use std::path::PathBuf;
use std::sync::Arc;

use mindmetric::assessment::{
    ArtifactCache, AnswerSet, AssessmentPipeline, ContentCategory, PersonalityResponse,
    RecommendationResolver, RecommendationSource, StressLevel, SummarySource,
    TemplateSummaryGenerator,
};
use mindmetric::config::ArtifactConfig;

fn artifacts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../artifacts")
}

fn shipped_artifacts() -> ArtifactCache {
    let dir = artifacts_dir();
    ArtifactCache::new(ArtifactConfig {
        model_path: dir.join("model.json"),
        encoders_path: dir.join("encoders.json"),
    })
}

fn pipeline(cache: ArtifactCache) -> AssessmentPipeline {
    AssessmentPipeline::new(
        RecommendationResolver::new(Arc::new(cache)),
        Arc::new(TemplateSummaryGenerator),
    )
}

fn calm() -> AnswerSet {
    AnswerSet::new([PersonalityResponse::A; 10], [StressLevel::Low; 5])
}

fn overwhelmed() -> AnswerSet {
    AnswerSet::new([PersonalityResponse::E; 10], [StressLevel::High; 5])
}

#[test]
fn shipped_artifacts_load() {
    let cache = shipped_artifacts();
    assert!(cache.preload(), "artifacts under {:?} should load", artifacts_dir());
    let artifact = cache.get().expect("artifact cached");
    assert_eq!(artifact.classes().len(), ContentCategory::ALL.len());
}

#[test]
fn calm_answers_recommend_meditation_with_either_path() {
    for cache in [ArtifactCache::disabled(), shipped_artifacts()] {
        let outcome = pipeline(cache).evaluate(&calm(), 30);
        assert_eq!(outcome.score_card.stress_score, 0.0);
        assert_eq!(
            outcome.score_card.recommendation.category,
            ContentCategory::Meditation
        );
        assert_eq!(outcome.summary.source, SummarySource::Fallback);
        assert!(!outcome.summary.text.is_empty());
    }
}

#[test]
fn overwhelmed_answers_recommend_professional_therapy() {
    let fallback = pipeline(ArtifactCache::disabled()).score(&overwhelmed());
    assert_eq!(fallback.stress_score, 10.0);
    assert_eq!(fallback.high_stress_count, 10);
    assert_eq!(
        fallback.recommendation.category,
        ContentCategory::ProfessionalTherapy
    );
    assert_eq!(fallback.recommendation.source, RecommendationSource::Fallback);
    assert_eq!(fallback.recommendation.confidence, 0.85);

    let classified = pipeline(shipped_artifacts()).score(&overwhelmed());
    assert_eq!(
        classified.recommendation.category,
        ContentCategory::ProfessionalTherapy
    );
    assert_eq!(classified.recommendation.source, RecommendationSource::Classifier);
    assert!(classified.recommendation.confidence > 0.5);
}

#[test]
fn missing_artifacts_fall_back_instead_of_failing() {
    let cache = ArtifactCache::new(ArtifactConfig {
        model_path: artifacts_dir().join("absent-model.json"),
        encoders_path: artifacts_dir().join("absent-encoders.json"),
    });
    assert!(!cache.preload());

    let card = pipeline(cache).score(&calm());
    assert_eq!(card.recommendation.source, RecommendationSource::Fallback);
    assert_eq!(card.recommendation.category, ContentCategory::Meditation);
}

#[test]
fn repeated_evaluation_is_deterministic() {
    let pipeline = pipeline(shipped_artifacts());
    let mixed = AnswerSet::new(
        [
            PersonalityResponse::A,
            PersonalityResponse::C,
            PersonalityResponse::D,
            PersonalityResponse::B,
            PersonalityResponse::E,
            PersonalityResponse::C,
            PersonalityResponse::A,
            PersonalityResponse::D,
            PersonalityResponse::B,
            PersonalityResponse::C,
        ],
        [
            StressLevel::Medium,
            StressLevel::High,
            StressLevel::Low,
            StressLevel::Medium,
            StressLevel::High,
        ],
    );

    let first = pipeline.score(&mixed);
    for _ in 0..5 {
        assert_eq!(pipeline.score(&mixed), first);
    }
}
