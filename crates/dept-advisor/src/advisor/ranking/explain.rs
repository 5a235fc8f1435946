use serde::{Deserialize, Serialize};

use crate::advisor::catalog::DepartmentDefinition;
use crate::advisor::profile::{StudentProfile, Subject};
use crate::advisor::scoring::{career_path_matches, StrategyKind};

/// Required-subject score at or above which a subject counts as a strength.
pub const STRONG_SUBJECT_THRESHOLD: f64 = 85.0;

const MAX_FACTORS: usize = 2;
const GENERIC_REASON: &str = "根據您的整體表現，此領域適合您的發展潛力";

/// Tag summarising why a department matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchFactor {
    #[serde(rename = "學科優勢")]
    AcademicStrength,
    #[serde(rename = "興趣相符")]
    InterestAlignment,
    #[serde(rename = "職業目標一致")]
    CareerAlignment,
}

impl MatchFactor {
    pub fn label(self) -> &'static str {
        match self {
            MatchFactor::AcademicStrength => "學科優勢",
            MatchFactor::InterestAlignment => "興趣相符",
            MatchFactor::CareerAlignment => "職業目標一致",
        }
    }
}

pub fn rationale(
    strategy: StrategyKind,
    department: &DepartmentDefinition,
    score: f64,
    profile: &StudentProfile,
) -> String {
    let mut factors = match strategy {
        StrategyKind::Heuristic => heuristic_factors(department, profile),
        StrategyKind::Classifier => classifier_factors(department, score, profile),
    };
    if factors.is_empty() {
        factors.push(GENERIC_REASON.to_string());
    }
    factors.truncate(MAX_FACTORS);

    format!("推薦{}的原因：{}", department.name, factors.join("; "))
}

pub fn match_factors(
    department: &DepartmentDefinition,
    profile: &StudentProfile,
) -> Vec<MatchFactor> {
    let mut factors = Vec::new();
    if !strong_subjects(department, profile).is_empty() {
        factors.push(MatchFactor::AcademicStrength);
    }
    if !matching_interests(department, profile).is_empty() {
        factors.push(MatchFactor::InterestAlignment);
    }
    if career_aligned(department, profile) {
        factors.push(MatchFactor::CareerAlignment);
    }
    factors
}

fn heuristic_factors(department: &DepartmentDefinition, profile: &StudentProfile) -> Vec<String> {
    let mut factors = Vec::new();

    let strong: Vec<&str> = strong_subjects(department, profile)
        .into_iter()
        .map(Subject::label)
        .collect();
    if !strong.is_empty() {
        factors.push(format!("您在{}方面表現優異", strong.join(", ")));
    }

    let interests = matching_interests(department, profile);
    if !interests.is_empty() {
        factors.push(format!("您的興趣({})與此領域高度相關", interests.join(", ")));
    }

    if career_aligned(department, profile) {
        factors.push("此領域的職業發展路徑符合您的目標".to_string());
    }

    factors
}

fn classifier_factors(
    department: &DepartmentDefinition,
    score: f64,
    profile: &StudentProfile,
) -> Vec<String> {
    let band = if score > 0.8 {
        "AI 分析顯示您非常適合此領域"
    } else if score > 0.6 {
        "AI 分析顯示您適合此領域"
    } else {
        "AI 分析顯示此領域值得考慮"
    };

    let mut factors = vec![band.to_string()];
    factors.extend(
        strong_subjects(department, profile)
            .into_iter()
            .map(|subject| format!("您的{}成績優秀", subject.label())),
    );
    if !matching_interests(department, profile).is_empty() {
        factors.push("您的興趣與此領域高度相關".to_string());
    }
    factors
}

fn strong_subjects(department: &DepartmentDefinition, profile: &StudentProfile) -> Vec<Subject> {
    department
        .required_subjects()
        .filter(|subject| {
            profile
                .score(*subject)
                .is_some_and(|score| score >= STRONG_SUBJECT_THRESHOLD)
        })
        .collect()
}

/// Profile interests containing at least one department keyword, in profile order.
fn matching_interests<'a>(
    department: &DepartmentDefinition,
    profile: &'a StudentProfile,
) -> Vec<&'a str> {
    let keywords = department.normalized_keywords();
    profile
        .interests
        .iter()
        .filter(|interest| {
            let interest = interest.to_lowercase();
            keywords
                .iter()
                .any(|keyword| interest.contains(keyword.as_str()))
        })
        .map(String::as_str)
        .collect()
}

fn career_aligned(department: &DepartmentDefinition, profile: &StudentProfile) -> bool {
    profile.has_career_goal()
        && department
            .career_paths
            .iter()
            .any(|path| career_path_matches(path, &profile.career_goals))
}
