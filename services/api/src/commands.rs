use crate::cli::ScoringArgs;
use crate::infra::apply_scoring_overrides;
use clap::{ArgGroup, Args};
use dept_advisor::advisor::scoring::classifier::ForestParams;
use dept_advisor::advisor::{
    fit_department_model, Advisor, DepartmentCatalog, FeatureBuilder, ProfileDocument,
    Recommendations, SelectionMode, StudentProfile, TrainingConfig,
};
use dept_advisor::config::AppConfig;
use dept_advisor::error::AppError;
use dept_advisor::telemetry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("document")
        .required(true)
        .args(["text_file", "profile_json"])
))]
pub(crate) struct RecommendArgs {
    /// Plain-text transcript or autobiography to extract a profile from
    #[arg(long)]
    pub(crate) text_file: Option<PathBuf>,
    /// Structured profile JSON (academic_scores, interests, achievements, ...)
    #[arg(long)]
    pub(crate) profile_json: Option<PathBuf>,
    /// Pick institutions and majors with a seeded generator instead of the configured mode
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Print the full result as JSON
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) scoring: ScoringArgs,
}

#[derive(Args, Debug)]
pub(crate) struct TrainArgs {
    /// Output directory for the model artifacts (defaults to ADVISOR_MODEL_DIR)
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
    /// Seed for data generation, splitting and forest growth
    #[arg(long, default_value_t = 42)]
    pub(crate) seed: u64,
    /// Number of synthetic profiles to generate
    #[arg(long, default_value_t = 1000)]
    pub(crate) samples: usize,
    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    pub(crate) trees: usize,
    /// Also export the synthetic dataset as CSV
    #[arg(long)]
    pub(crate) dataset_csv: Option<PathBuf>,
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let RecommendArgs {
        text_file,
        profile_json,
        seed,
        json,
        scoring,
    } = args;

    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    apply_scoring_overrides(&mut config.advisor, scoring);
    if let Some(seed) = seed {
        config.advisor.selection = SelectionMode::Seeded(seed);
    }

    let document = match (text_file, profile_json) {
        (Some(path), _) => ProfileDocument::raw_text(fs::read_to_string(path)?),
        (None, Some(path)) => load_profile_json(&path)?,
        (None, None) => ProfileDocument::raw_text(String::new()),
    };

    let advisor = Advisor::from_config(&config.advisor)?;
    let result = advisor.recommend(&document);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_recommendations(&result);
    }
    Ok(())
}

/// Structured profiles are read leniently: malformed fields fall back to empty values.
fn load_profile_json(path: &Path) -> Result<ProfileDocument, AppError> {
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    Ok(ProfileDocument::structured(StudentProfile::from_json_value(
        &value,
    )))
}

fn render_recommendations(result: &Recommendations) {
    let profile = &result.profile;
    println!("Department recommendations ({} scoring)", result.strategy.label());
    if let Some(name) = profile.personal_info.name.as_deref() {
        println!("- Student: {name}");
    }
    if !profile.academic_scores.is_empty() {
        let scores: Vec<String> = profile
            .academic_scores
            .iter()
            .map(|(subject, score)| format!("{} {:.0}", subject.label(), score))
            .collect();
        println!("- Scores: {}", scores.join(" | "));
    }
    if !profile.interests.is_empty() {
        println!("- Interests: {}", profile.interests.join(", "));
    }
    if profile.has_career_goal() {
        println!("- Career goal: {}", profile.career_goals);
    }

    if result.recommendations.is_empty() {
        println!("\nNo department cleared the match threshold.");
        return;
    }

    println!();
    for recommendation in &result.recommendations {
        println!(
            "{}. {} ({:.1}%) -> {} / {}",
            recommendation.rank,
            recommendation.department,
            recommendation.score * 100.0,
            recommendation.university,
            recommendation.major
        );
        println!("   {}", recommendation.reason);
        if !recommendation.match_factors.is_empty() {
            let tags: Vec<&str> = recommendation
                .match_factors
                .iter()
                .map(|factor| factor.label())
                .collect();
            println!("   Factors: {}", tags.join(", "));
        }
    }
}

pub(crate) fn run_train(args: TrainArgs) -> Result<(), AppError> {
    let TrainArgs {
        out,
        seed,
        samples,
        trees,
        dataset_csv,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let out = out.unwrap_or(config.advisor.model_dir);

    let catalog = DepartmentCatalog::standard()?;
    let builder = FeatureBuilder::from_catalog(&catalog);
    let training = TrainingConfig {
        seed,
        samples,
        forest: ForestParams {
            trees,
            ..ForestParams::default()
        },
        ..TrainingConfig::default()
    };

    let report = fit_department_model(&training, &builder)?;
    report.artifacts.save(&out)?;
    if let Some(path) = dataset_csv {
        report.dataset.to_csv_path(&path)?;
        info!(path = %path.display(), rows = report.dataset.len(), "exported training dataset");
    }

    println!("Department classifier fitted");
    println!(
        "- {} synthetic profiles | {} train / {} holdout",
        report.dataset.len(),
        report.train_samples,
        report.test_samples
    );
    match report.holdout_accuracy {
        Some(accuracy) => println!("- Holdout accuracy: {:.1}%", accuracy * 100.0),
        None => println!("- Holdout accuracy: n/a (empty holdout)"),
    }
    println!("- Labels: {}", report.artifacts.labels.join(", "));
    println!("- Artifacts written to {}", out.display());
    Ok(())
}

pub(crate) fn run_catalog() -> Result<(), AppError> {
    let catalog = DepartmentCatalog::standard()?;

    println!("Department catalog ({} departments)", catalog.len());
    for department in catalog.departments() {
        let subjects: Vec<&str> = department
            .required_subjects()
            .map(|subject| subject.label())
            .collect();
        println!(
            "- {} [{}] {}",
            department.name,
            department.category.label(),
            department.description
        );
        println!("  Subjects: {}", subjects.join(", "));
        println!("  Institutions: {}", department.institutions.join(", "));
        println!("  Majors: {}", department.majors.join(", "));
    }
    Ok(())
}
