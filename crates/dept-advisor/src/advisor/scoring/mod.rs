//! Per-department match scoring behind one contract with two strategies.

pub mod classifier;
mod heuristic;

pub use classifier::{ClassifierScorer, ModelArtifactError, ModelArtifacts};
pub use heuristic::{breakdown, HeuristicScorer, CANDIDATE_THRESHOLD, NEUTRAL_ACADEMIC_SCORE};

pub(crate) use heuristic::career_path_matches;

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::catalog::DepartmentCatalog;
use super::features::FeatureBuilder;
use super::profile::StudentProfile;

/// Which strategy produced a score sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Heuristic,
    Classifier,
}

impl StrategyKind {
    pub fn label(self) -> &'static str {
        match self {
            StrategyKind::Heuristic => "heuristic",
            StrategyKind::Classifier => "classifier",
        }
    }

    /// Number of recommendations kept after ranking.
    pub fn top_k(self) -> usize {
        match self {
            StrategyKind::Heuristic => 5,
            StrategyKind::Classifier => 3,
        }
    }
}

/// How the engine is chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringMode {
    /// Classifier when its artifacts load, heuristic otherwise.
    #[default]
    Auto,
    Heuristic,
}

impl ScoringMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(ScoringMode::Auto),
            "heuristic" => Some(ScoringMode::Heuristic),
            _ => None,
        }
    }
}

/// The four normalised heuristic terms for one department.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub academic: f64,
    pub interest: f64,
    pub career: f64,
    pub achievement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentScore {
    pub department: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

/// Unranked scores from a single strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSheet {
    pub strategy: StrategyKind,
    pub scores: Vec<DepartmentScore>,
}

/// Scoring strategy fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub enum ScoringEngine {
    Heuristic(HeuristicScorer),
    Classifier(ClassifierScorer),
}

impl ScoringEngine {
    pub fn heuristic(catalog: Arc<DepartmentCatalog>) -> Self {
        Self::Heuristic(HeuristicScorer::new(catalog))
    }

    /// Picks the strategy once. `Heuristic` mode never touches the disk; `Auto` mode degrades to
    /// the heuristic strategy when the artifacts cannot be used.
    pub fn select(
        catalog: Arc<DepartmentCatalog>,
        builder: &FeatureBuilder,
        mode: ScoringMode,
        model_dir: &Path,
    ) -> Self {
        if mode == ScoringMode::Heuristic {
            info!(strategy = "heuristic", "scoring strategy selected by configuration");
            return Self::heuristic(catalog);
        }

        match ClassifierScorer::load(builder.clone(), model_dir) {
            Ok(scorer) => {
                info!(
                    strategy = "classifier",
                    model_dir = %model_dir.display(),
                    labels = scorer.artifacts().labels.len(),
                    "scoring strategy selected"
                );
                Self::Classifier(scorer)
            }
            Err(err) => {
                warn!(
                    model_dir = %model_dir.display(),
                    error = %err,
                    "fitted model unavailable; falling back to heuristic scoring"
                );
                Self::heuristic(catalog)
            }
        }
    }

    pub fn strategy(&self) -> StrategyKind {
        match self {
            ScoringEngine::Heuristic(_) => StrategyKind::Heuristic,
            ScoringEngine::Classifier(_) => StrategyKind::Classifier,
        }
    }

    pub fn score(&self, profile: &StudentProfile) -> ScoreSheet {
        let scores = match self {
            ScoringEngine::Heuristic(scorer) => scorer.score(profile),
            ScoringEngine::Classifier(scorer) => scorer.score(profile),
        };
        debug!(
            strategy = self.strategy().label(),
            candidates = scores.len(),
            "scored profile"
        );

        ScoreSheet {
            strategy: self.strategy(),
            scores,
        }
    }
}
