use std::sync::Arc;

use super::{DepartmentScore, ScoreBreakdown};
use crate::advisor::catalog::{DepartmentCatalog, DepartmentDefinition};
use crate::advisor::profile::{StudentProfile, MAX_SCORE};

const ACADEMIC_WEIGHT: f64 = 0.4;
const INTEREST_WEIGHT: f64 = 0.3;
const CAREER_WEIGHT: f64 = 0.2;
const ACHIEVEMENT_WEIGHT: f64 = 0.1;

/// Academic term used for departments that declare no required subjects.
pub const NEUTRAL_ACADEMIC_SCORE: f64 = 0.5;
/// Departments must score strictly above this to become candidates.
pub const CANDIDATE_THRESHOLD: f64 = 0.3;

/// Deterministic weighted-sum scorer over the catalog.
#[derive(Debug, Clone)]
pub struct HeuristicScorer {
    catalog: Arc<DepartmentCatalog>,
}

impl HeuristicScorer {
    pub fn new(catalog: Arc<DepartmentCatalog>) -> Self {
        Self { catalog }
    }

    /// Candidates above the threshold, in catalog declaration order.
    pub fn score(&self, profile: &StudentProfile) -> Vec<DepartmentScore> {
        self.catalog
            .departments()
            .iter()
            .filter_map(|department| {
                let breakdown = breakdown(profile, department);
                let score = breakdown.combined();
                (score > CANDIDATE_THRESHOLD).then(|| DepartmentScore {
                    department: department.name.clone(),
                    score,
                    breakdown: Some(breakdown),
                })
            })
            .collect()
    }
}

pub fn breakdown(profile: &StudentProfile, department: &DepartmentDefinition) -> ScoreBreakdown {
    ScoreBreakdown {
        academic: academic_score(profile, department),
        interest: interest_score(profile, department),
        career: career_score(profile, department),
        achievement: achievement_score(profile, department),
    }
}

impl ScoreBreakdown {
    /// Weighted combination clamped into `[0, 1]`.
    pub fn combined(&self) -> f64 {
        let total = ACADEMIC_WEIGHT * self.academic
            + INTEREST_WEIGHT * self.interest
            + CAREER_WEIGHT * self.career
            + ACHIEVEMENT_WEIGHT * self.achievement;
        total.clamp(0.0, 1.0)
    }
}

/// Weighted mean of required-subject scores; a missing subject contributes zero.
pub(crate) fn academic_score(profile: &StudentProfile, department: &DepartmentDefinition) -> f64 {
    let total_weight: f64 = department
        .subject_weights
        .iter()
        .map(|(_, weight)| *weight)
        .sum();
    if department.subject_weights.is_empty() || total_weight <= 0.0 {
        return NEUTRAL_ACADEMIC_SCORE;
    }

    let weighted: f64 = department
        .subject_weights
        .iter()
        .map(|(subject, weight)| weight * profile.score(*subject).unwrap_or(0.0) / MAX_SCORE)
        .sum();
    weighted / total_weight
}

pub(crate) fn interest_score(profile: &StudentProfile, department: &DepartmentDefinition) -> f64 {
    let keywords = department.normalized_keywords();
    if profile.interests.is_empty() || keywords.is_empty() {
        return 0.0;
    }

    let total: f64 = profile
        .interests
        .iter()
        .map(|interest| {
            let interest = interest.to_lowercase();
            let hits = keywords
                .iter()
                .filter(|keyword| interest.contains(keyword.as_str()))
                .count();
            hits as f64 / keywords.len() as f64
        })
        .sum();
    total / profile.interests.len() as f64
}

pub(crate) fn career_score(profile: &StudentProfile, department: &DepartmentDefinition) -> f64 {
    if !profile.has_career_goal() || department.career_paths.is_empty() {
        return 0.0;
    }

    let matches = department
        .career_paths
        .iter()
        .filter(|path| career_path_matches(path, &profile.career_goals))
        .count();
    matches as f64 / department.career_paths.len() as f64
}

/// True when any word of the career path occurs in the stated goal, ignoring case.
pub(crate) fn career_path_matches(path: &str, goal: &str) -> bool {
    let goal = goal.to_lowercase();
    path.to_lowercase()
        .split_whitespace()
        .any(|word| goal.contains(word))
}

pub(crate) fn achievement_score(profile: &StudentProfile, department: &DepartmentDefinition) -> f64 {
    let keywords = department.normalized_keywords();
    if profile.achievements.is_empty() || keywords.is_empty() {
        return 0.0;
    }

    let matching = profile
        .achievements
        .iter()
        .filter(|achievement| {
            let achievement = achievement.to_lowercase();
            keywords
                .iter()
                .any(|keyword| achievement.contains(keyword.as_str()))
        })
        .count();
    matching as f64 / profile.achievements.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::profile::Subject;

    fn catalog() -> DepartmentCatalog {
        DepartmentCatalog::standard().expect("catalog")
    }

    #[test]
    fn accounting_achievement_scores_fully() {
        let catalog = catalog();
        let accounting = catalog.get("會計學系").expect("accounting");
        let profile = StudentProfile {
            achievements: vec!["擔任會計學社社長並取得會計師證照".to_string()],
            ..StudentProfile::default()
        };

        assert_eq!(achievement_score(&profile, accounting), 1.0);
    }

    #[test]
    fn career_words_match_as_substrings() {
        assert!(career_path_matches("軟體 工程師", "希望從事軟體開發"));
        assert!(career_path_matches("Software Engineer", "i want to be an ENGINEER"));
        assert!(!career_path_matches("資料 科學家", "希望從事軟體開發"));
    }

    #[test]
    fn missing_required_subject_counts_as_zero() {
        let catalog = catalog();
        let mathematics = catalog.get("數學系").expect("math dept");
        let mut profile = StudentProfile::default();
        profile.set_score(Subject::Math, 90.0);

        assert!((academic_score(&profile, mathematics) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn combined_score_is_weighted_and_clamped() {
        let full = ScoreBreakdown {
            academic: 1.0,
            interest: 1.0,
            career: 1.0,
            achievement: 1.0,
        };
        assert!((full.combined() - 1.0).abs() < 1e-12);

        let partial = ScoreBreakdown {
            academic: 0.5,
            interest: 0.0,
            career: 0.5,
            achievement: 1.0,
        };
        assert!((partial.combined() - 0.4).abs() < 1e-12);
    }
}
