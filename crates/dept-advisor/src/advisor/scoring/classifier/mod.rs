//! Fitted-classifier scoring strategy and its persisted artifacts.
//!
//! Inference needs three files produced together by [`fit_department_model`]: the forest with
//! the feature order it was fit on, the scaler, and the label vocabulary. Any one of them missing
//! or disagreeing with the others makes the whole set unusable.

mod forest;
mod scaler;
mod training;

pub use forest::{ForestParams, RandomForest};
pub use scaler::StandardScaler;
pub use training::{
    fit_department_model, FitReport, SyntheticDataset, TrainingConfig, TrainingError,
};

use std::fs;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use super::DepartmentScore;
use crate::advisor::features::FeatureBuilder;
use crate::advisor::profile::StudentProfile;

pub const CLASSIFIER_FILE: &str = "department_classifier.json";
pub const SCALER_FILE: &str = "feature_scaler.json";
pub const LABELS_FILE: &str = "label_vocabulary.json";

/// Forest plus the metadata needed to check it against the running feature builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedClassifier {
    pub feature_names: Vec<String>,
    pub fitted_at: DateTime<Utc>,
    pub seed: u64,
    pub samples: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holdout_accuracy: Option<f64>,
    pub forest: RandomForest,
}

/// The three artifacts required together for inference.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifacts {
    pub classifier: FittedClassifier,
    pub scaler: StandardScaler,
    pub labels: Vec<String>,
}

impl ModelArtifacts {
    /// Loads and cross-checks the artifacts in `dir` against the expected feature order.
    pub fn load(dir: &Path, feature_names: &[String]) -> Result<Self, ModelArtifactError> {
        let artifacts = Self {
            classifier: read_artifact(&dir.join(CLASSIFIER_FILE))?,
            scaler: read_artifact(&dir.join(SCALER_FILE))?,
            labels: read_artifact(&dir.join(LABELS_FILE))?,
        };
        artifacts.validate(feature_names)?;
        Ok(artifacts)
    }

    /// Writes all three artifacts, each through a temporary file renamed into place.
    pub fn save(&self, dir: &Path) -> Result<(), ModelArtifactError> {
        fs::create_dir_all(dir).map_err(|source| ModelArtifactError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        write_artifact(&dir.join(CLASSIFIER_FILE), &self.classifier)?;
        write_artifact(&dir.join(SCALER_FILE), &self.scaler)?;
        write_artifact(&dir.join(LABELS_FILE), &self.labels)?;

        info!(
            dir = %dir.display(),
            labels = self.labels.len(),
            features = self.classifier.feature_names.len(),
            "persisted model artifacts"
        );
        Ok(())
    }

    pub fn validate(&self, feature_names: &[String]) -> Result<(), ModelArtifactError> {
        if self.classifier.feature_names != feature_names {
            return Err(ModelArtifactError::FeatureOrder {
                expected: feature_names.len(),
                found: self.classifier.feature_names.len(),
            });
        }

        let width = feature_names.len();
        let forest = &self.classifier.forest;
        if self.labels.is_empty() {
            return Err(ModelArtifactError::Shape(
                "label vocabulary is empty".to_string(),
            ));
        }
        if forest.classes() != self.labels.len() {
            return Err(ModelArtifactError::Shape(format!(
                "classifier has {} classes but {} labels were stored",
                forest.classes(),
                self.labels.len()
            )));
        }
        if forest.features() != width || self.scaler.width() != width {
            return Err(ModelArtifactError::Shape(format!(
                "expected {width} features, classifier has {} and scaler has {}",
                forest.features(),
                self.scaler.width()
            )));
        }
        if !forest.is_consistent() || !self.scaler.is_consistent() {
            return Err(ModelArtifactError::Shape(
                "classifier or scaler parameters are corrupt".to_string(),
            ));
        }
        Ok(())
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ModelArtifactError> {
    let file = fs::File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ModelArtifactError::Missing(path.to_path_buf()),
        _ => ModelArtifactError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ModelArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<(), ModelArtifactError> {
    let io_error = |source| ModelArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    let temp_file = NamedTempFile::new_in(parent).map_err(io_error)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer(&mut writer, value).map_err(|source| ModelArtifactError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(io_error)?;
    }
    temp_file
        .persist(path)
        .map_err(|error| io_error(error.error))?;
    Ok(())
}

/// Scores profiles with a fitted forest; probabilities are used as scores directly.
#[derive(Debug, Clone)]
pub struct ClassifierScorer {
    builder: FeatureBuilder,
    artifacts: ModelArtifacts,
}

impl ClassifierScorer {
    pub fn new(
        builder: FeatureBuilder,
        artifacts: ModelArtifacts,
    ) -> Result<Self, ModelArtifactError> {
        artifacts.validate(builder.feature_names())?;
        Ok(Self { builder, artifacts })
    }

    pub fn load(builder: FeatureBuilder, dir: &Path) -> Result<Self, ModelArtifactError> {
        let artifacts = ModelArtifacts::load(dir, builder.feature_names())?;
        Ok(Self { builder, artifacts })
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    /// One entry per label, in label-vocabulary order.
    pub fn score(&self, profile: &StudentProfile) -> Vec<DepartmentScore> {
        let features = self.builder.build(profile);
        let scaled = self.artifacts.scaler.transform(features.values());
        let probabilities = self.artifacts.classifier.forest.predict_proba(&scaled);

        self.artifacts
            .labels
            .iter()
            .zip(probabilities)
            .map(|(label, probability)| DepartmentScore {
                department: label.clone(),
                score: probability.clamp(0.0, 1.0),
                breakdown: None,
            })
            .collect()
    }
}

/// Reasons a set of model artifacts cannot be used for inference.
#[derive(Debug, thiserror::Error)]
pub enum ModelArtifactError {
    #[error("model artifact {} is missing", .0.display())]
    Missing(PathBuf),
    #[error("failed to access model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact {} could not be encoded or decoded: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("model was fit on a different feature order ({found} features, expected {expected})")]
    FeatureOrder { expected: usize, found: usize },
    #[error("model artifacts are inconsistent: {0}")]
    Shape(String),
}
