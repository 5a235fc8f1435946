//! Static department reference data and the keyword taxonomy shared by feature construction,
//! scoring and explanation.
//!
//! A catalog is validated once when it is built and is immutable afterwards; callers share it
//! behind an `Arc` for the lifetime of the process.

mod standard;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::profile::Subject;

/// Broad grouping used when presenting departments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentCategory {
    Technical,
    Science,
    Business,
    Humanities,
}

impl DepartmentCategory {
    pub const fn label(self) -> &'static str {
        match self {
            DepartmentCategory::Technical => "technical",
            DepartmentCategory::Science => "science",
            DepartmentCategory::Business => "business",
            DepartmentCategory::Humanities => "humanities",
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentDefinition {
    pub name: String,
    pub category: DepartmentCategory,
    pub description: String,
    pub keywords: Vec<String>,
    /// Required subjects with their relative weights. Empty means no academic preference.
    pub subject_weights: Vec<(Subject, f64)>,
    pub institutions: Vec<String>,
    pub majors: Vec<String>,
    pub career_paths: Vec<String>,
}

impl DepartmentDefinition {
    pub fn requires(&self, subject: Subject) -> bool {
        self.subject_weights
            .iter()
            .any(|(required, _)| *required == subject)
    }

    pub fn required_subjects(&self) -> impl Iterator<Item = Subject> + '_ {
        self.subject_weights.iter().map(|(subject, _)| *subject)
    }

    /// Lower-cased keywords, in declaration order.
    pub fn normalized_keywords(&self) -> Vec<String> {
        self.keywords
            .iter()
            .map(|keyword| keyword.to_lowercase())
            .collect()
    }
}

/// A named group of keywords backing one feature slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCategory {
    pub name: String,
    pub keywords: Vec<String>,
}

impl KeywordCategory {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
        }
    }

    /// Case-insensitive substring test against any keyword of the category.
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| text.contains(&keyword.to_lowercase()))
    }
}

/// Canonical interest, club and competition categories. Declaration order defines feature order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTaxonomy {
    pub interests: Vec<KeywordCategory>,
    pub clubs: Vec<KeywordCategory>,
    pub competitions: Vec<KeywordCategory>,
}

impl FeatureTaxonomy {
    fn categories(&self) -> impl Iterator<Item = &KeywordCategory> {
        self.interests
            .iter()
            .chain(self.clubs.iter())
            .chain(self.competitions.iter())
    }
}

/// Validated, read-only department catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentCatalog {
    departments: Vec<DepartmentDefinition>,
    taxonomy: FeatureTaxonomy,
}

impl DepartmentCatalog {
    pub fn new(
        departments: Vec<DepartmentDefinition>,
        taxonomy: FeatureTaxonomy,
    ) -> Result<Self, CatalogError> {
        if departments.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for department in &departments {
            validate_department(department)?;
            if !seen.insert(department.name.as_str()) {
                return Err(CatalogError::DuplicateDepartment(department.name.clone()));
            }
        }

        if let Some(category) = taxonomy
            .categories()
            .find(|category| category.keywords.is_empty())
        {
            return Err(CatalogError::EmptyTaxonomyCategory(category.name.clone()));
        }

        Ok(Self {
            departments,
            taxonomy,
        })
    }

    /// The built-in catalog of eight departments across four categories.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::new(standard::departments(), standard::taxonomy())
    }

    pub fn departments(&self) -> &[DepartmentDefinition] {
        &self.departments
    }

    pub fn get(&self, name: &str) -> Option<&DepartmentDefinition> {
        self.departments
            .iter()
            .find(|department| department.name == name)
    }

    /// Declaration index, used as the ranking tie-breaker.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.departments
            .iter()
            .position(|department| department.name == name)
    }

    pub fn taxonomy(&self) -> &FeatureTaxonomy {
        &self.taxonomy
    }

    pub fn len(&self) -> usize {
        self.departments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }
}

fn validate_department(department: &DepartmentDefinition) -> Result<(), CatalogError> {
    let name = || department.name.clone();

    if department
        .keywords
        .iter()
        .all(|keyword| keyword.trim().is_empty())
    {
        return Err(CatalogError::EmptyKeywords(name()));
    }

    if !department.subject_weights.is_empty() {
        let total: f64 = department
            .subject_weights
            .iter()
            .map(|(_, weight)| *weight)
            .sum();
        let all_positive = department
            .subject_weights
            .iter()
            .all(|(_, weight)| weight.is_finite() && *weight > 0.0);
        if !all_positive || total <= 0.0 {
            return Err(CatalogError::InvalidSubjectWeights {
                department: name(),
                total,
            });
        }
    }

    if department.institutions.is_empty() {
        return Err(CatalogError::NoInstitutions(name()));
    }
    if department.majors.is_empty() {
        return Err(CatalogError::NoMajors(name()));
    }

    Ok(())
}

/// Structural misconfiguration detected while building a catalog. Always fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog contains no departments")]
    Empty,
    #[error("department '{0}' is declared more than once")]
    DuplicateDepartment(String),
    #[error("department '{0}' has an empty keyword set")]
    EmptyKeywords(String),
    #[error("department '{department}' subject weights must be positive (total {total})")]
    InvalidSubjectWeights { department: String, total: f64 },
    #[error("department '{0}' lists no candidate institutions")]
    NoInstitutions(String),
    #[error("department '{0}' lists no candidate majors")]
    NoMajors(String),
    #[error("taxonomy category '{0}' has no keywords")]
    EmptyTaxonomyCategory(String),
}
