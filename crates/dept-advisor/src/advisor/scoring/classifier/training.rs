//! Offline preparation of the fitted classifier from a synthetic, rule-labelled dataset.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use statrs::distribution::{Beta, Normal};
use tracing::info;

use super::forest::{ForestParams, RandomForest};
use super::scaler::StandardScaler;
use super::{FittedClassifier, ModelArtifacts};
use crate::advisor::features::FeatureBuilder;
use crate::advisor::profile::{MAX_SCORE, MIN_SCORE};

const MIN_SAMPLES: usize = 10;

/// Normal(mean, std) per academic score column.
const SCORE_DISTRIBUTIONS: &[(&str, f64, f64)] = &[
    ("chinese_score", 75.0, 15.0),
    ("english_score", 80.0, 12.0),
    ("math_score", 70.0, 18.0),
    ("science_score", 75.0, 16.0),
    ("social_score", 78.0, 14.0),
];

/// Interest ratios are drawn from Beta(alpha, beta).
const INTEREST_SHAPE: (f64, f64) = (2.0, 5.0);

/// Bernoulli probability per activity or competition flag.
const FLAG_PROBABILITIES: &[(&str, f64)] = &[
    ("club_leadership", 0.3),
    ("club_tech", 0.4),
    ("club_art", 0.2),
    ("club_sports", 0.3),
    ("club_academic", 0.5),
    ("competition_math", 0.15),
    ("competition_science", 0.12),
    ("competition_programming", 0.08),
    ("competition_language", 0.1),
    ("competition_art", 0.05),
];

// Interest terms are ratios in [0, 1] and carry their weight pre-multiplied by 100.
const LABEL_RULES: &[(&str, &[(&str, f64)])] = &[
    (
        "資訊工程學系",
        &[
            ("math_score", 0.3),
            ("science_score", 0.3),
            ("interest_programming", 20.0),
            ("interest_mathematics", 10.0),
            ("club_tech", 20.0),
            ("competition_programming", 30.0),
            ("competition_math", 20.0),
        ],
    ),
    (
        "電機工程學系",
        &[
            ("math_score", 0.25),
            ("science_score", 0.35),
            ("interest_physics", 20.0),
            ("interest_mathematics", 10.0),
            ("club_tech", 15.0),
            ("competition_math", 25.0),
            ("competition_science", 25.0),
        ],
    ),
    (
        "商業管理學系",
        &[
            ("chinese_score", 0.3),
            ("english_score", 0.3),
            ("social_score", 0.2),
            ("interest_leadership", 10.0),
            ("interest_communication", 10.0),
            ("club_leadership", 25.0),
            ("competition_language", 20.0),
        ],
    ),
    (
        "數學系",
        &[
            ("math_score", 0.3),
            ("science_score", 0.4),
            ("interest_research", 20.0),
            ("interest_analysis", 10.0),
            ("club_academic", 20.0),
            ("competition_science", 30.0),
            ("competition_math", 20.0),
        ],
    ),
    (
        "外國語文學系",
        &[
            ("chinese_score", 0.3),
            ("interest_art", 40.0),
            ("interest_creativity", 30.0),
            ("club_art", 30.0),
            ("competition_art", 40.0),
        ],
    ),
];

/// Parameters of the offline fit.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub seed: u64,
    pub samples: usize,
    pub test_fraction: f64,
    pub forest: ForestParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            samples: 1000,
            test_fraction: 0.2,
            forest: ForestParams::default(),
        }
    }
}

/// Synthetic feature rows with their rule-assigned department labels.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticDataset {
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    pub labels: Vec<String>,
}

enum Column {
    Score(Normal),
    Interest(Beta),
    Flag(f64),
}

impl SyntheticDataset {
    /// Draws `samples` rows column by column, then labels each row by the rule table.
    pub fn generate(
        samples: usize,
        builder: &FeatureBuilder,
        rng: &mut StdRng,
    ) -> Result<Self, TrainingError> {
        let feature_names = builder.feature_names().to_vec();
        let columns = feature_names
            .iter()
            .map(|name| column_for(name))
            .collect::<Result<Vec<_>, _>>()?;
        let rules = resolve_rules(&feature_names)?;

        let mut rows = vec![Vec::with_capacity(columns.len()); samples];
        for column in &columns {
            for row in rows.iter_mut() {
                let value = match column {
                    Column::Score(normal) => normal.sample(rng).clamp(MIN_SCORE, MAX_SCORE),
                    Column::Interest(beta) => beta.sample(rng),
                    Column::Flag(probability) => {
                        if rng.gen_bool(*probability) {
                            1.0
                        } else {
                            0.0
                        }
                    }
                };
                row.push(value);
            }
        }

        let labels = rows
            .iter()
            .map(|row| assign_department(&rules, row).to_string())
            .collect();

        Ok(Self {
            feature_names,
            rows,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<(), TrainingError> {
        let file = std::fs::File::create(path)?;
        self.to_csv_writer(file)
    }

    /// Writes a header of feature names plus `department`, then one record per row.
    pub fn to_csv_writer<W: Write>(&self, writer: W) -> Result<(), TrainingError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = self.feature_names.clone();
        header.push("department".to_string());
        csv_writer.write_record(&header)?;

        for (row, label) in self.rows.iter().zip(&self.labels) {
            let mut record: Vec<String> = row.iter().map(|value| format!("{value:.4}")).collect();
            record.push(label.clone());
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

fn column_for(name: &str) -> Result<Column, TrainingError> {
    if let Some((_, mean, deviation)) = SCORE_DISTRIBUTIONS
        .iter()
        .find(|(candidate, _, _)| *candidate == name)
    {
        return Ok(Column::Score(Normal::new(*mean, *deviation)?));
    }
    if name.starts_with("interest_") {
        let (alpha, beta) = INTEREST_SHAPE;
        return Ok(Column::Interest(Beta::new(alpha, beta)?));
    }
    FLAG_PROBABILITIES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, probability)| Column::Flag(*probability))
        .ok_or_else(|| TrainingError::UnknownFeature(name.to_string()))
}

struct LabelRule {
    department: &'static str,
    terms: Vec<(usize, f64)>,
}

fn resolve_rules(feature_names: &[String]) -> Result<Vec<LabelRule>, TrainingError> {
    LABEL_RULES
        .iter()
        .map(|(department, terms)| {
            let terms = terms
                .iter()
                .map(|(name, weight)| {
                    feature_names
                        .iter()
                        .position(|candidate| candidate == name)
                        .map(|index| (index, *weight))
                        .ok_or_else(|| TrainingError::UnknownFeature(name.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(LabelRule { department, terms })
        })
        .collect()
}

/// Highest rule total wins; ties go to the rule declared first.
fn assign_department(rules: &[LabelRule], row: &[f64]) -> &'static str {
    let mut best: Option<(&'static str, f64)> = None;
    for rule in rules {
        let total: f64 = rule
            .terms
            .iter()
            .map(|(index, weight)| row[*index] * weight)
            .sum();
        if best.map_or(true, |(_, current)| total > current) {
            best = Some((rule.department, total));
        }
    }
    best.map(|(department, _)| department).unwrap_or_default()
}

/// Result of an offline fit: the artifacts plus the data they were fit on.
#[derive(Debug, Clone)]
pub struct FitReport {
    pub artifacts: ModelArtifacts,
    pub dataset: SyntheticDataset,
    pub train_samples: usize,
    pub test_samples: usize,
    pub holdout_accuracy: Option<f64>,
}

/// Generates the synthetic dataset, fits scaler and forest on a stratified split, and reports
/// holdout accuracy. Deterministic for a given seed.
pub fn fit_department_model(
    config: &TrainingConfig,
    builder: &FeatureBuilder,
) -> Result<FitReport, TrainingError> {
    if config.samples < MIN_SAMPLES {
        return Err(TrainingError::TooFewSamples(config.samples));
    }
    if config.forest.trees == 0 || config.forest.max_depth == 0 {
        return Err(TrainingError::InvalidForest {
            trees: config.forest.trees,
            max_depth: config.forest.max_depth,
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let dataset = SyntheticDataset::generate(config.samples, builder, &mut rng)?;

    let labels: Vec<String> = dataset
        .labels
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let class_ids: Vec<usize> = dataset
        .labels
        .iter()
        .map(|label| labels.iter().position(|known| known == label).unwrap_or(0))
        .collect();

    let (train, test) = stratified_split(&class_ids, labels.len(), config.test_fraction, &mut rng);

    let train_rows: Vec<Vec<f64>> = train.iter().map(|row| dataset.rows[*row].clone()).collect();
    let scaler = StandardScaler::fit(&train_rows);
    let scaled_train: Vec<Vec<f64>> = train_rows.iter().map(|row| scaler.transform(row)).collect();
    let train_labels: Vec<usize> = train.iter().map(|row| class_ids[*row]).collect();

    let forest = RandomForest::fit(
        &scaled_train,
        &train_labels,
        labels.len(),
        &config.forest,
        &mut rng,
    );

    let holdout_accuracy = (!test.is_empty()).then(|| {
        let correct = test
            .iter()
            .filter(|row| {
                let scaled = scaler.transform(&dataset.rows[**row]);
                forest.predict(&scaled) == class_ids[**row]
            })
            .count();
        correct as f64 / test.len() as f64
    });

    info!(
        seed = config.seed,
        samples = dataset.len(),
        labels = labels.len(),
        train = train.len(),
        test = test.len(),
        accuracy = holdout_accuracy.unwrap_or_default(),
        "fitted department classifier"
    );

    let artifacts = ModelArtifacts {
        classifier: FittedClassifier {
            feature_names: dataset.feature_names.clone(),
            fitted_at: Utc::now(),
            seed: config.seed,
            samples: dataset.len(),
            holdout_accuracy,
            forest,
        },
        scaler,
        labels,
    };

    Ok(FitReport {
        artifacts,
        train_samples: train.len(),
        test_samples: test.len(),
        holdout_accuracy,
        dataset,
    })
}

/// Shuffles each class independently and holds out `fraction` of it, rounded.
fn stratified_split(
    class_ids: &[usize],
    classes: usize,
    fraction: f64,
    rng: &mut StdRng,
) -> (Vec<usize>, Vec<usize>) {
    let fraction = fraction.clamp(0.0, 1.0);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in 0..classes {
        let mut members: Vec<usize> = class_ids
            .iter()
            .enumerate()
            .filter(|(_, id)| **id == class)
            .map(|(row, _)| row)
            .collect();
        members.shuffle(rng);

        let held_out = ((members.len() as f64) * fraction).round() as usize;
        let held_out = held_out.min(members.len().saturating_sub(1));
        test.extend_from_slice(&members[..held_out]);
        train.extend_from_slice(&members[held_out..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("at least {min} synthetic samples are required, got {0}", min = MIN_SAMPLES)]
    TooFewSamples(usize),
    #[error("forest needs at least one tree of depth one or more, got {trees} of depth {max_depth}")]
    InvalidForest { trees: usize, max_depth: usize },
    #[error("no synthetic distribution or rule for feature '{0}'")]
    UnknownFeature(String),
    #[error("invalid sampling distribution: {0}")]
    Distribution(#[from] statrs::StatsError),
    #[error("failed to export training data: {0}")]
    Csv(#[from] csv::Error),
    #[error("training i/o failed: {0}")]
    Io(#[from] std::io::Error),
}
