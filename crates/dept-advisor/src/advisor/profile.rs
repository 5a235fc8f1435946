use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Lowest and highest values an academic score may take once sanitised.
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Fixed subject vocabulary recognised in transcripts and structured uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Chinese,
    English,
    Math,
    Science,
    Social,
    Physics,
    Chemistry,
    Biology,
}

impl Subject {
    pub const ALL: [Subject; 8] = [
        Subject::Chinese,
        Subject::English,
        Subject::Math,
        Subject::Science,
        Subject::Social,
        Subject::Physics,
        Subject::Chemistry,
        Subject::Biology,
    ];

    /// Subjects that occupy a slot in the feature vector.
    pub const CORE: [Subject; 5] = [
        Subject::Chinese,
        Subject::English,
        Subject::Math,
        Subject::Science,
        Subject::Social,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Subject::Chinese => "chinese",
            Subject::English => "english",
            Subject::Math => "math",
            Subject::Science => "science",
            Subject::Social => "social",
            Subject::Physics => "physics",
            Subject::Chemistry => "chemistry",
            Subject::Biology => "biology",
        }
    }

    /// Label used on transcripts and in rationale text.
    pub const fn label(self) -> &'static str {
        match self {
            Subject::Chinese => "國文",
            Subject::English => "英文",
            Subject::Math => "數學",
            Subject::Science => "自然",
            Subject::Social => "社會",
            Subject::Physics => "物理",
            Subject::Chemistry => "化學",
            Subject::Biology => "生物",
        }
    }

    pub fn from_key(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|subject| subject.key() == normalized)
    }
}

/// Identity fields located in a free-text document. Never used for scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
}

impl PersonalInfo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.school.is_none()
    }
}

/// Canonical applicant representation shared by every pipeline stage.
///
/// Absent subjects are absent keys; absent collections are empty. Scores are clamped into
/// `[0, 100]` on the way in, so downstream code never re-validates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(default, skip_serializing_if = "PersonalInfo::is_empty")]
    pub personal_info: PersonalInfo,
    #[serde(default, deserialize_with = "lenient_scores")]
    pub academic_scores: BTreeMap<Subject, f64>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub career_goals: String,
    #[serde(default)]
    pub preferred_majors: BTreeSet<String>,
}

impl StudentProfile {
    pub fn score(&self, subject: Subject) -> Option<f64> {
        self.academic_scores.get(&subject).copied()
    }

    /// Records a score, clamping it into the valid range.
    pub fn set_score(&mut self, subject: Subject, score: f64) {
        if score.is_finite() {
            self.academic_scores
                .insert(subject, score.clamp(MIN_SCORE, MAX_SCORE));
        }
    }

    pub fn has_career_goal(&self) -> bool {
        !self.career_goals.trim().is_empty()
    }

    /// Builds a profile from an arbitrary JSON value. Fields with the wrong shape fall back
    /// to their empty defaults instead of failing the whole document.
    pub fn from_json_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let mut profile = Self::default();

        if let Some(Value::Object(scores)) = object.get("academic_scores") {
            for (key, raw) in scores {
                if let (Some(subject), Some(score)) = (Subject::from_key(key), raw.as_f64()) {
                    profile.set_score(subject, score);
                }
            }
        }

        profile.interests = string_list(object.get("interests"));
        profile.achievements = string_list(object.get("achievements"));
        profile.preferred_majors = string_list(object.get("preferred_majors"))
            .into_iter()
            .collect();
        profile.career_goals = object
            .get("career_goals")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if let Some(info) = object.get("personal_info") {
            profile.personal_info = serde_json::from_value(info.clone()).unwrap_or_default();
        }

        profile
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn lenient_scores<'de, D>(deserializer: D) -> Result<BTreeMap<Subject, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| {
            let subject = Subject::from_key(&key)?;
            let score = value.as_f64().filter(|score| score.is_finite())?;
            Some((subject, score.clamp(MIN_SCORE, MAX_SCORE)))
        })
        .collect())
}

/// Input accepted by the pipeline: raw document text or an already structured profile.
///
/// Deserialization is lenient: an object with a string `text` field is raw text, anything else
/// is read as a structured profile whose malformed fields fall back to empty values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProfileDocument {
    RawText { text: String },
    Structured(StudentProfile),
}

impl ProfileDocument {
    pub fn raw_text(text: impl Into<String>) -> Self {
        Self::RawText { text: text.into() }
    }

    pub fn structured(profile: StudentProfile) -> Self {
        Self::Structured(profile)
    }

    pub fn from_json_value(value: &Value) -> Self {
        match value.get("text").and_then(Value::as_str) {
            Some(text) => Self::raw_text(text),
            None => Self::structured(StudentProfile::from_json_value(value)),
        }
    }
}

impl<'de> Deserialize<'de> for ProfileDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json_value(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_profile_clamps_and_drops_unknown_subjects() {
        let profile: StudentProfile = serde_json::from_value(json!({
            "academic_scores": { "math": 120, "english": -4, "art": 90, "science": "high" },
            "interests": ["程式設計"],
        }))
        .expect("profile parses");

        assert_eq!(profile.score(Subject::Math), Some(100.0));
        assert_eq!(profile.score(Subject::English), Some(0.0));
        assert_eq!(profile.score(Subject::Science), None);
        assert_eq!(profile.academic_scores.len(), 2);
        assert!(profile.career_goals.is_empty());
    }

    #[test]
    fn empty_object_is_an_empty_profile() {
        let profile: StudentProfile = serde_json::from_value(json!({})).expect("parses");
        assert_eq!(profile, StudentProfile::default());
    }

    #[test]
    fn from_json_value_tolerates_wrong_shapes() {
        let profile = StudentProfile::from_json_value(&json!({
            "academic_scores": { "math": 88 },
            "interests": "not a list",
            "achievements": ["社長", 4, "  "],
            "career_goals": 12,
        }));

        assert_eq!(profile.score(Subject::Math), Some(88.0));
        assert!(profile.interests.is_empty());
        assert_eq!(profile.achievements, vec!["社長".to_string()]);
        assert!(profile.career_goals.is_empty());
        assert_eq!(StudentProfile::from_json_value(&json!([1, 2])), StudentProfile::default());
    }

    #[test]
    fn documents_deserialize_untagged() {
        let text: ProfileDocument =
            serde_json::from_value(json!({ "text": "數學：90" })).expect("text document");
        assert_eq!(text, ProfileDocument::raw_text("數學：90"));

        let structured: ProfileDocument =
            serde_json::from_value(json!({ "academic_scores": { "math": 90 } }))
                .expect("structured document");
        assert!(matches!(structured, ProfileDocument::Structured(_)));
    }

    #[test]
    fn structured_documents_recover_malformed_fields() {
        let document: ProfileDocument = serde_json::from_value(json!({
            "academic_scores": { "math": 95 },
            "interests": "程式設計",
            "career_goals": null,
        }))
        .expect("malformed fields do not fail the document");

        let ProfileDocument::Structured(profile) = document else {
            panic!("expected a structured document");
        };
        assert_eq!(profile.score(Subject::Math), Some(95.0));
        assert!(profile.interests.is_empty());
        assert!(profile.career_goals.is_empty());
    }
}
