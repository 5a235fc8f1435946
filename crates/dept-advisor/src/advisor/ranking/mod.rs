//! Orders a score sheet into the final recommendation list.

mod choice;
mod explain;

pub use choice::{Chooser, FirstChooser, SeededChooser, SelectionMode, UniformChooser};
pub use explain::{match_factors, rationale, MatchFactor, STRONG_SUBJECT_THRESHOLD};

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::{DepartmentCatalog, DepartmentDefinition};
use super::profile::StudentProfile;
use super::scoring::{ScoreSheet, StrategyKind};

/// One ranked department suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub department: String,
    pub university: String,
    pub major: String,
    /// Rounded to three decimals.
    pub score: f64,
    pub reason: String,
    /// 1-based, dense.
    pub rank: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_factors: Vec<MatchFactor>,
}

/// Sorts, truncates and explains scored departments.
#[derive(Clone)]
pub struct Ranker {
    catalog: Arc<DepartmentCatalog>,
    chooser: Arc<dyn Chooser>,
}

impl std::fmt::Debug for Ranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ranker")
            .field("departments", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl Ranker {
    pub fn new(catalog: Arc<DepartmentCatalog>, chooser: Arc<dyn Chooser>) -> Self {
        Self { catalog, chooser }
    }

    pub fn rank(&self, sheet: &ScoreSheet, profile: &StudentProfile) -> Vec<Recommendation> {
        let mut seen = HashSet::new();
        let mut candidates: Vec<(usize, &DepartmentDefinition, f64)> = Vec::new();

        for entry in &sheet.scores {
            let Some(position) = self.catalog.position(&entry.department) else {
                debug!(department = %entry.department, "skipping department missing from catalog");
                continue;
            };
            if !seen.insert(position) {
                continue;
            }
            let department = &self.catalog.departments()[position];
            candidates.push((position, department, entry.score.clamp(0.0, 1.0)));
        }

        candidates.sort_by_key(|(position, _, _)| *position);
        candidates.sort_by(|left, right| right.2.total_cmp(&left.2));
        candidates.truncate(sheet.strategy.top_k());

        candidates
            .into_iter()
            .enumerate()
            .map(|(index, (_, department, score))| {
                self.recommendation(sheet.strategy, department, score, index + 1, profile)
            })
            .collect()
    }

    fn recommendation(
        &self,
        strategy: StrategyKind,
        department: &DepartmentDefinition,
        score: f64,
        rank: usize,
        profile: &StudentProfile,
    ) -> Recommendation {
        let pick = |options: &[String]| {
            self.chooser
                .choose(options)
                .map(str::to_string)
                .unwrap_or_default()
        };

        Recommendation {
            department: department.name.clone(),
            university: pick(&department.institutions),
            major: pick(&department.majors),
            score: round_score(score),
            reason: rationale(strategy, department, score, profile),
            rank,
            match_factors: match strategy {
                StrategyKind::Heuristic => match_factors(department, profile),
                StrategyKind::Classifier => Vec::new(),
            },
        }
    }
}

fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}
