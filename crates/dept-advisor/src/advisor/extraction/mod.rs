//! Turns plain document text into a [`StudentProfile`].
//!
//! Extraction never fails: anything that cannot be located stays at its empty default.

mod normalizer;
mod patterns;

pub use patterns::ExtractionVocabulary;

use regex::Regex;
use tracing::debug;

use super::profile::{PersonalInfo, StudentProfile, MAX_SCORE};
use normalizer::{clean_capture, normalize_document, normalize_keyword};
use patterns::{document_patterns, is_sentence_break};

/// Achievement sentences must be longer than this many characters...
const MIN_ACHIEVEMENT_CHARS: usize = 5;
/// ...and shorter than this many.
const MAX_ACHIEVEMENT_CHARS: usize = 100;
const MAX_SCORE_DIGITS: usize = 3;

/// Pattern-based field extractor. Stateless apart from its keyword vocabulary.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    interest_keywords: Vec<String>,
    achievement_keywords: Vec<String>,
    major_keywords: Vec<String>,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(ExtractionVocabulary::standard())
    }
}

impl FieldExtractor {
    pub fn new(vocabulary: ExtractionVocabulary) -> Self {
        Self {
            interest_keywords: vocabulary.interest_keywords,
            achievement_keywords: vocabulary.achievement_keywords,
            major_keywords: vocabulary.major_keywords,
        }
    }

    pub fn extract(&self, raw_text: &str) -> StudentProfile {
        let text = normalize_document(raw_text);
        let lowered = text.to_lowercase();
        let patterns = document_patterns();

        let mut profile = StudentProfile {
            personal_info: PersonalInfo {
                name: first_capture(&patterns.name, &text),
                school: first_capture(&patterns.school, &text),
            },
            ..StudentProfile::default()
        };

        for (subject, pattern) in &patterns.subjects {
            // The last occurrence is authoritative; an invalid last value leaves the subject absent.
            let Some(digits) = pattern
                .captures_iter(&text)
                .filter_map(|captures| captures.get(1))
                .last()
                .map(|capture| capture.as_str())
            else {
                continue;
            };

            if digits.chars().count() > MAX_SCORE_DIGITS {
                continue;
            }
            if let Ok(score) = digits.parse::<u16>() {
                if f64::from(score) <= MAX_SCORE {
                    profile.set_score(*subject, f64::from(score));
                }
            }
        }

        profile.interests = present_keywords(&self.interest_keywords, &lowered);
        profile.preferred_majors = present_keywords(&self.major_keywords, &lowered)
            .into_iter()
            .collect();
        profile.achievements = self.achievement_sentences(&text);
        profile.career_goals = patterns
            .career_goal
            .iter()
            .find_map(|pattern| pattern.find(&text))
            .map(|found| found.as_str().trim().to_string())
            .unwrap_or_default();

        debug!(
            scores = profile.academic_scores.len(),
            interests = profile.interests.len(),
            achievements = profile.achievements.len(),
            has_career_goal = profile.has_career_goal(),
            "extracted profile fields"
        );

        profile
    }

    fn achievement_sentences(&self, text: &str) -> Vec<String> {
        text.split(is_sentence_break)
            .map(str::trim)
            .filter(|sentence| {
                let lowered = sentence.to_lowercase();
                self.achievement_keywords
                    .iter()
                    .any(|keyword| lowered.contains(&normalize_keyword(keyword)))
            })
            .filter(|sentence| {
                let length = sentence.chars().count();
                length > MIN_ACHIEVEMENT_CHARS && length < MAX_ACHIEVEMENT_CHARS
            })
            .map(str::to_string)
            .collect()
    }
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|captures| captures.get(1))
        .map(|capture| clean_capture(capture.as_str()))
        .filter(|value| !value.is_empty())
}

fn present_keywords(keywords: &[String], lowered_text: &str) -> Vec<String> {
    keywords
        .iter()
        .filter(|keyword| lowered_text.contains(&normalize_keyword(keyword)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::profile::Subject;

    const SAMPLE: &str = "姓名：王小明\n\
就讀學校：台北市立建國高級中學\n\
國文：78 英文：82 數學：95 自然：92\n\
我熱愛程式設計，也對人工智慧很有興趣。\n\
曾獲得全國資訊競賽第一名。\n\
擔任資訊研究社社長，帶領社員完成專題。\n\
希望未來從事軟體開發相關工作。\n\
志願：資訊工程";

    #[test]
    fn extracts_every_field_family() {
        let profile = FieldExtractor::default().extract(SAMPLE);

        assert_eq!(profile.personal_info.name.as_deref(), Some("王小明"));
        assert_eq!(
            profile.personal_info.school.as_deref(),
            Some("台北市立建國高級中學")
        );
        assert_eq!(profile.score(Subject::Math), Some(95.0));
        assert_eq!(profile.score(Subject::Science), Some(92.0));
        assert_eq!(profile.score(Subject::Social), None);
        assert!(profile.interests.contains(&"程式設計".to_string()));
        assert!(profile.interests.contains(&"人工智慧".to_string()));
        assert!(profile
            .achievements
            .contains(&"曾獲得全國資訊競賽第一名".to_string()));
        assert!(profile
            .achievements
            .iter()
            .any(|achievement| achievement.contains("社長")));
        assert_eq!(profile.career_goals, "希望未來從事軟體開發相關工作");
        assert!(profile.preferred_majors.contains("資訊工程"));
    }

    #[test]
    fn last_subject_score_wins_and_out_of_range_is_dropped() {
        let extractor = FieldExtractor::default();

        let corrected = extractor.extract("數學：70\n更正後 數學：88");
        assert_eq!(corrected.score(Subject::Math), Some(88.0));

        let invalid = extractor.extract("數學：90\n數學：105\n英文 1000");
        assert_eq!(invalid.score(Subject::Math), None);
        assert_eq!(invalid.score(Subject::English), None);
    }

    #[test]
    fn full_width_scores_are_read_like_ascii_ones() {
        let extractor = FieldExtractor::default();

        let profile = extractor.extract("數學：９５\n英文：88");
        assert_eq!(profile.score(Subject::Math), Some(95.0));
        assert_eq!(profile.score(Subject::English), Some(88.0));

        let corrected = extractor.extract("數學：70\n數學：９０");
        assert_eq!(corrected.score(Subject::Math), Some(90.0));
    }

    #[test]
    fn english_labels_are_case_insensitive() {
        let profile = FieldExtractor::default()
            .extract("Name: Lin Mei\nMath: 91\nENGLISH 87\nI hope to pursue a career in coding.");
        assert_eq!(profile.personal_info.name.as_deref(), Some("Lin Mei"));
        assert_eq!(profile.score(Subject::Math), Some(91.0));
        assert_eq!(profile.score(Subject::English), Some(87.0));
        assert_eq!(profile.career_goals, "hope to pursue a career in coding");
        assert!(profile.interests.contains(&"coding".to_string()));
    }

    #[test]
    fn achievement_sentences_respect_length_bounds() {
        let long = format!("{}競賽", "很".repeat(120));
        let text = format!("競賽。獲得數學競賽銀牌。{long}");
        let profile = FieldExtractor::default().extract(&text);
        assert_eq!(profile.achievements, vec!["獲得數學競賽銀牌".to_string()]);
    }

    #[test]
    fn first_matching_career_template_wins() {
        let profile = FieldExtractor::default().extract("我的夢想是環遊世界。希望將來從事醫療工作。");
        assert_eq!(profile.career_goals, "希望將來從事醫療工作");
    }

    #[test]
    fn empty_document_yields_empty_profile() {
        assert_eq!(FieldExtractor::default().extract(""), StudentProfile::default());
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = FieldExtractor::default();
        assert_eq!(extractor.extract(SAMPLE), extractor.extract(SAMPLE));
    }
}
