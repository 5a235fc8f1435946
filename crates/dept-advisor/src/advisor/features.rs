use serde::{Deserialize, Serialize};

use super::catalog::{DepartmentCatalog, FeatureTaxonomy, KeywordCategory};
use super::profile::{StudentProfile, Subject};

/// Slot counts per feature family, in vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureLayout {
    pub subjects: usize,
    pub interests: usize,
    pub clubs: usize,
    pub competitions: usize,
}

impl FeatureLayout {
    pub fn len(&self) -> usize {
        self.subjects + self.interests + self.clubs + self.competitions
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fixed-order numeric encoding of a profile. The order matches [`FeatureBuilder::feature_names`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// Maps profiles onto the feature space defined by a catalog taxonomy.
///
/// Feature order is part of the fitted classifier's contract: the names are derived once from
/// the taxonomy's declaration order and every build follows them.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    taxonomy: FeatureTaxonomy,
    names: Vec<String>,
}

impl FeatureBuilder {
    pub fn new(taxonomy: FeatureTaxonomy) -> Self {
        let names = Subject::CORE
            .iter()
            .map(|subject| format!("{}_score", subject.key()))
            .chain(prefixed("interest", &taxonomy.interests))
            .chain(prefixed("club", &taxonomy.clubs))
            .chain(prefixed("competition", &taxonomy.competitions))
            .collect();

        Self { taxonomy, names }
    }

    pub fn from_catalog(catalog: &DepartmentCatalog) -> Self {
        Self::new(catalog.taxonomy().clone())
    }

    pub fn feature_names(&self) -> &[String] {
        &self.names
    }

    pub fn layout(&self) -> FeatureLayout {
        FeatureLayout {
            subjects: Subject::CORE.len(),
            interests: self.taxonomy.interests.len(),
            clubs: self.taxonomy.clubs.len(),
            competitions: self.taxonomy.competitions.len(),
        }
    }

    pub fn build(&self, profile: &StudentProfile) -> FeatureVector {
        let mut values = Vec::with_capacity(self.names.len());

        values.extend(
            Subject::CORE
                .iter()
                .map(|subject| profile.score(*subject).unwrap_or(0.0)),
        );
        values.extend(
            self.taxonomy
                .interests
                .iter()
                .map(|category| interest_ratio(category, &profile.interests)),
        );
        values.extend(
            self.taxonomy
                .clubs
                .iter()
                .chain(self.taxonomy.competitions.iter())
                .map(|category| indicator(category, &profile.achievements)),
        );

        FeatureVector::new(values)
    }
}

fn prefixed<'a>(
    prefix: &'a str,
    categories: &'a [KeywordCategory],
) -> impl Iterator<Item = String> + 'a {
    categories
        .iter()
        .map(move |category| format!("{prefix}_{}", category.name))
}

/// Share of the category's keyword list covered by matching interests, capped at 1.
fn interest_ratio(category: &KeywordCategory, interests: &[String]) -> f64 {
    if category.keywords.is_empty() {
        return 0.0;
    }
    let matching = interests
        .iter()
        .filter(|interest| category.matches(interest))
        .count();
    (matching as f64 / category.keywords.len() as f64).clamp(0.0, 1.0)
}

fn indicator(category: &KeywordCategory, achievements: &[String]) -> f64 {
    if achievements
        .iter()
        .any(|achievement| category.matches(achievement))
    {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> FeatureBuilder {
        FeatureBuilder::from_catalog(&DepartmentCatalog::standard().expect("catalog"))
    }

    fn index(builder: &FeatureBuilder, name: &str) -> usize {
        builder
            .feature_names()
            .iter()
            .position(|candidate| candidate == name)
            .unwrap_or_else(|| panic!("feature {name} missing"))
    }

    #[test]
    fn feature_names_follow_taxonomy_order() {
        let builder = builder();
        let names = builder.feature_names();

        assert_eq!(names.len(), 30);
        assert_eq!(builder.layout().len(), 30);
        assert_eq!(names[0], "chinese_score");
        assert_eq!(names[4], "social_score");
        assert_eq!(names[5], "interest_programming");
        assert_eq!(names[19], "interest_analysis");
        assert_eq!(names[20], "club_leadership");
        assert_eq!(names[25], "competition_math");
        assert_eq!(names[29], "competition_art");
    }

    #[test]
    fn builds_scores_ratios_and_indicators() {
        let builder = builder();
        let mut profile = StudentProfile::default();
        profile.set_score(Subject::Math, 95.0);
        profile.set_score(Subject::Physics, 88.0);
        profile.interests = vec!["程式設計".to_string(), "寫程式".to_string()];
        profile.achievements = vec!["擔任資訊研究社社長".to_string()];

        let vector = builder.build(&profile);
        let values = vector.values();

        assert_eq!(vector.len(), 30);
        assert_eq!(values[index(&builder, "math_score")], 95.0);
        assert_eq!(values[index(&builder, "chinese_score")], 0.0);
        assert!((values[index(&builder, "interest_programming")] - 0.4).abs() < 1e-12);
        assert_eq!(values[index(&builder, "interest_music")], 0.0);
        assert_eq!(values[index(&builder, "club_leadership")], 1.0);
        assert_eq!(values[index(&builder, "club_tech")], 1.0);
        assert_eq!(values[index(&builder, "club_academic")], 1.0);
        assert_eq!(values[index(&builder, "club_sports")], 0.0);
        assert_eq!(values[index(&builder, "competition_programming")], 1.0);
        assert_eq!(values[index(&builder, "competition_art")], 0.0);
    }

    #[test]
    fn interest_ratio_is_capped() {
        let category = KeywordCategory::new("music", &["音樂"]);
        let interests = vec!["音樂".to_string(), "古典音樂".to_string()];
        assert_eq!(interest_ratio(&category, &interests), 1.0);
    }

    #[test]
    fn building_is_idempotent() {
        let builder = builder();
        let mut profile = StudentProfile::default();
        profile.set_score(Subject::English, 77.5);
        profile.interests = vec!["領導".to_string()];

        let first = builder.build(&profile);
        let second = builder.build(&profile);
        assert_eq!(first.len(), builder.feature_names().len());
        assert_eq!(
            first
                .values()
                .iter()
                .map(|value| value.to_bits())
                .collect::<Vec<_>>(),
            second
                .values()
                .iter()
                .map(|value| value.to_bits())
                .collect::<Vec<_>>()
        );
    }
}
