use clap::Args;
use mindmetric::assessment::{
    AnswerSet, ArtifactCache, AssessmentOutcome, AssessmentPipeline, GeminiSummaryGenerator,
    RecommendationResolver, SummaryGenerator, TemplateSummaryGenerator,
};
use mindmetric::config::AppConfig;
use mindmetric::error::AppError;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON object mapping q1..q15 to responses (A-E for q1-q10, Low/Medium/High for q11-q15)
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Respondent age, used to tailor the summary
    #[arg(long, default_value_t = 30)]
    pub(crate) age: u8,
    /// Use the templated summary instead of calling the text-generation API
    #[arg(long)]
    pub(crate) offline: bool,
}

fn read_answers(path: &Path) -> Result<AnswerSet, AppError> {
    let reader = BufReader::new(File::open(path)?);
    let raw: BTreeMap<String, String> = serde_json::from_reader(reader)?;
    Ok(AnswerSet::from_raw(&raw)?)
}

/// Runs the full pipeline once. Blocking; call from a blocking context.
pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        answers,
        age,
        offline,
    } = args;

    let config = AppConfig::load()?;
    let answers = read_answers(&answers)?;

    let summaries: Arc<dyn SummaryGenerator> = if offline {
        Arc::new(TemplateSummaryGenerator)
    } else {
        Arc::new(GeminiSummaryGenerator::from_config(&config.text_generation)?)
    };
    let pipeline = AssessmentPipeline::new(
        RecommendationResolver::new(Arc::new(ArtifactCache::new(config.artifacts.clone()))),
        summaries,
    );

    render_outcome(&answers, &pipeline.evaluate(&answers, age));
    Ok(())
}

fn render_outcome(answers: &AnswerSet, outcome: &AssessmentOutcome) {
    let card = &outcome.score_card;
    let details = &card.details;

    println!("MindMetric assessment");
    println!("- Answers: {}", answers);
    println!(
        "- Stress score {:.2}/10 | {} high-stress and {} low-stress indicators",
        card.stress_score, card.high_stress_count, card.low_stress_count
    );
    println!(
        "- Recommendation: {} ({:.0}% confidence, {:?})",
        card.recommendation.category,
        card.recommendation.confidence * 100.0,
        card.recommendation.source
    );
    println!("  {}", details.description);
    println!("  Suggested duration: {}", details.duration);
    println!("  Techniques:");
    for technique in details.techniques {
        println!("    - {}", technique);
    }
    println!("  Resources:");
    for resource in details.resources {
        println!("    - {}", resource);
    }
    println!("\nSummary ({:?})", outcome.summary.source);
    println!("{}", outcome.summary.text);
}
