use std::fs;
use std::sync::Arc;

use dept_advisor::advisor::scoring::classifier::{ForestParams, CLASSIFIER_FILE, LABELS_FILE};
use dept_advisor::advisor::{
    fit_department_model, Advisor, ClassifierScorer, DepartmentCatalog, FeatureBuilder,
    FirstChooser, ModelArtifactError, ModelArtifacts, ProfileDocument, ScoringEngine, ScoringMode,
    StrategyKind, StudentProfile, Subject, TrainingConfig,
};

fn small_config() -> TrainingConfig {
    TrainingConfig {
        seed: 7,
        samples: 240,
        test_fraction: 0.2,
        forest: ForestParams {
            trees: 12,
            max_depth: 6,
            ..ForestParams::default()
        },
    }
}

fn catalog() -> Arc<DepartmentCatalog> {
    Arc::new(DepartmentCatalog::standard().expect("standard catalog"))
}

fn engineering_profile() -> StudentProfile {
    let mut profile = StudentProfile {
        interests: vec!["程式設計".to_string(), "物理".to_string()],
        achievements: vec!["全國資訊競賽第一名".to_string()],
        ..StudentProfile::default()
    };
    profile.set_score(Subject::Math, 92.0);
    profile.set_score(Subject::Science, 90.0);
    profile.set_score(Subject::English, 70.0);
    profile
}

#[test]
fn fitted_artifacts_round_trip_through_disk() {
    let catalog = catalog();
    let builder = FeatureBuilder::from_catalog(&catalog);
    let report = fit_department_model(&small_config(), &builder).expect("model fits");
    assert_eq!(report.train_samples + report.test_samples, 240);
    assert_eq!(report.dataset.len(), 240);

    let dir = tempfile::tempdir().expect("temp dir");
    report.artifacts.save(dir.path()).expect("artifacts saved");

    let loaded =
        ModelArtifacts::load(dir.path(), builder.feature_names()).expect("artifacts load");
    assert_eq!(loaded.labels, report.artifacts.labels);
    assert_eq!(loaded.classifier.seed, 7);
    assert_eq!(
        loaded.classifier.feature_names.as_slice(),
        builder.feature_names()
    );
}

#[test]
fn classifier_strategy_returns_at_most_three_recommendations() {
    let catalog = catalog();
    let builder = FeatureBuilder::from_catalog(&catalog);
    let report = fit_department_model(&small_config(), &builder).expect("model fits");
    let dir = tempfile::tempdir().expect("temp dir");
    report.artifacts.save(dir.path()).expect("artifacts saved");

    let engine = ScoringEngine::select(catalog.clone(), &builder, ScoringMode::Auto, dir.path());
    assert_eq!(engine.strategy(), StrategyKind::Classifier);

    let sheet = engine.score(&engineering_profile());
    let total: f64 = sheet.scores.iter().map(|score| score.score).sum();
    assert!((total - 1.0).abs() < 1e-6, "probabilities sum to {total}");

    let advisor = Advisor::new(catalog, engine, Arc::new(FirstChooser));
    let result = advisor.recommend(&ProfileDocument::structured(engineering_profile()));
    assert_eq!(result.strategy, StrategyKind::Classifier);
    assert!(!result.recommendations.is_empty());
    assert!(result.recommendations.len() <= 3);
    for (index, recommendation) in result.recommendations.iter().enumerate() {
        assert_eq!(recommendation.rank, index + 1);
        assert!(recommendation.reason.contains("AI 分析顯示"));
        assert!(recommendation.match_factors.is_empty());
    }
}

#[test]
fn missing_artifacts_fall_back_to_heuristic_scoring() {
    let catalog = catalog();
    let builder = FeatureBuilder::from_catalog(&catalog);
    let dir = tempfile::tempdir().expect("temp dir");

    match ClassifierScorer::load(builder.clone(), dir.path()) {
        Err(ModelArtifactError::Missing(path)) => assert!(path.ends_with(CLASSIFIER_FILE)),
        other => panic!("expected missing artifact, got {other:?}"),
    }

    let engine = ScoringEngine::select(catalog, &builder, ScoringMode::Auto, dir.path());
    assert_eq!(engine.strategy(), StrategyKind::Heuristic);
}

#[test]
fn corrupt_artifacts_fall_back_to_heuristic_scoring() {
    let catalog = catalog();
    let builder = FeatureBuilder::from_catalog(&catalog);
    let report = fit_department_model(&small_config(), &builder).expect("model fits");
    let dir = tempfile::tempdir().expect("temp dir");
    report.artifacts.save(dir.path()).expect("artifacts saved");
    fs::write(dir.path().join(LABELS_FILE), b"{not json").expect("overwrite labels");

    match ModelArtifacts::load(dir.path(), builder.feature_names()) {
        Err(ModelArtifactError::Json { path, .. }) => assert!(path.ends_with(LABELS_FILE)),
        other => panic!("expected decode failure, got {other:?}"),
    }

    let engine = ScoringEngine::select(catalog, &builder, ScoringMode::Auto, dir.path());
    assert_eq!(engine.strategy(), StrategyKind::Heuristic);
}

#[test]
fn feature_order_mismatch_is_rejected() {
    let catalog = catalog();
    let builder = FeatureBuilder::from_catalog(&catalog);
    let report = fit_department_model(&small_config(), &builder).expect("model fits");

    let mut reordered = builder.feature_names().to_vec();
    reordered.swap(0, 1);

    match report.artifacts.validate(&reordered) {
        Err(ModelArtifactError::FeatureOrder { expected, found }) => {
            assert_eq!(expected, found);
        }
        other => panic!("expected feature order error, got {other:?}"),
    }
}

#[test]
fn heuristic_mode_never_reads_artifacts() {
    let catalog = catalog();
    let builder = FeatureBuilder::from_catalog(&catalog);
    let report = fit_department_model(&small_config(), &builder).expect("model fits");
    let dir = tempfile::tempdir().expect("temp dir");
    report.artifacts.save(dir.path()).expect("artifacts saved");

    let engine = ScoringEngine::select(catalog, &builder, ScoringMode::Heuristic, dir.path());
    assert_eq!(engine.strategy(), StrategyKind::Heuristic);
}
