use std::sync::OnceLock;

use regex::Regex;

use crate::advisor::profile::Subject;

static PATTERNS: OnceLock<DocumentPatterns> = OnceLock::new();

/// Compiled label and template patterns, tried in declaration order.
pub(crate) struct DocumentPatterns {
    pub(crate) name: Vec<Regex>,
    pub(crate) school: Vec<Regex>,
    pub(crate) subjects: Vec<(Subject, Regex)>,
    pub(crate) career_goal: Vec<Regex>,
}

pub(crate) fn document_patterns() -> &'static DocumentPatterns {
    PATTERNS.get_or_init(|| DocumentPatterns {
        name: compile_all(NAME_LABELS),
        school: compile_all(SCHOOL_LABELS),
        subjects: Subject::ALL
            .into_iter()
            .filter_map(|subject| {
                let aliases = subject_aliases(subject).join("|");
                Regex::new(&format!(r"(?i)(?:{aliases})[：:\s]*(\d+)"))
                    .ok()
                    .map(|pattern| (subject, pattern))
            })
            .collect(),
        career_goal: compile_all(CAREER_TEMPLATES),
    })
}

pub(crate) fn is_sentence_break(value: char) -> bool {
    matches!(value, '。' | '！' | '？' | '!' | '?' | '\n')
}

fn compile_all(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .filter_map(|source| Regex::new(source).ok())
        .collect()
}

const NAME_LABELS: &[&str] = &[
    r"姓名[：:]\s*([^\n\r]+)",
    r"姓名\s*([^\n\r]+)",
    r"學生姓名[：:]\s*([^\n\r]+)",
    r"(?i)\bname\s*[:：]\s*([^\n\r]+)",
];

const SCHOOL_LABELS: &[&str] = &[
    r"學校[：:]\s*([^\n\r]+)",
    r"就讀學校[：:]\s*([^\n\r]+)",
    r"高中[：:]\s*([^\n\r]+)",
    r"(?i)\bschool\s*[:：]\s*([^\n\r]+)",
];

const CAREER_TEMPLATES: &[&str] = &[
    r"希望[^。\n]*從事[^。\n]*",
    r"未來[^。\n]*目標[^。\n]*",
    r"志向[^。\n]*",
    r"夢想[^。\n]*",
    r"(?i)hope to (?:pursue|become|work)[^.\n]*",
    r"(?i)future goal[^.\n]*",
];

fn subject_aliases(subject: Subject) -> &'static [&'static str] {
    match subject {
        Subject::Chinese => &["國文", "chinese"],
        Subject::English => &["英文", "english"],
        Subject::Math => &["數學", "math"],
        Subject::Science => &["自然科", "自然", "science"],
        Subject::Social => &["社會科", "社會", "social"],
        Subject::Physics => &["物理", "physics"],
        Subject::Chemistry => &["化學", "chemistry"],
        Subject::Biology => &["生物", "biology"],
    }
}

/// Keyword lists for presence-based extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionVocabulary {
    pub interest_keywords: Vec<String>,
    pub achievement_keywords: Vec<String>,
    pub major_keywords: Vec<String>,
}

impl ExtractionVocabulary {
    pub fn standard() -> Self {
        Self {
            interest_keywords: unique(INTEREST_KEYWORDS),
            achievement_keywords: unique(ACHIEVEMENT_KEYWORDS),
            major_keywords: unique(MAJOR_KEYWORDS),
        }
    }
}

fn unique(values: &[&str]) -> Vec<String> {
    let mut seen = Vec::with_capacity(values.len());
    for value in values {
        if !seen.iter().any(|existing: &String| existing.as_str() == *value) {
            seen.push(value.to_string());
        }
    }
    seen
}

const INTEREST_KEYWORDS: &[&str] = &[
    "程式設計", "程式", "軟體", "資訊", "電腦", "人工智慧", "coding",
    "數學", "統計", "計算",
    "物理", "力學", "電學",
    "化學", "實驗",
    "生物", "生命科學",
    "文學", "語文", "寫作",
    "歷史", "社會",
    "藝術", "美術", "設計",
    "音樂", "樂器",
    "運動", "體育",
    "領導", "管理", "組織",
    "研究", "學術",
    "溝通", "表達", "演講",
    "創意", "創新", "創作",
    "分析", "邏輯", "思考",
];

const ACHIEVEMENT_KEYWORDS: &[&str] = &[
    "競賽", "比賽", "獲獎", "得獎", "優勝", "冠軍", "亞軍", "季軍",
    "奧林匹亞", "科展", "科奧", "數奧", "物奧", "化奧", "生奧",
    "社長", "會長", "幹部", "領導", "主編", "隊長",
    "證照", "檢定", "認證", "資格",
    "發表", "論文", "研究", "專題",
];

const MAJOR_KEYWORDS: &[&str] = &[
    "資訊工程", "電機工程", "機械工程", "土木工程",
    "商業管理", "企業管理", "經濟學", "會計學",
    "數學系", "物理系", "化學系", "生物系",
    "外國語文", "中文系", "歷史系", "社會系",
    "心理學", "教育學", "法律系", "醫學系",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_compiles() {
        let patterns = document_patterns();
        assert_eq!(patterns.name.len(), NAME_LABELS.len());
        assert_eq!(patterns.school.len(), SCHOOL_LABELS.len());
        assert_eq!(patterns.subjects.len(), Subject::ALL.len());
        assert_eq!(patterns.career_goal.len(), CAREER_TEMPLATES.len());
    }

    #[test]
    fn vocabulary_has_no_duplicates() {
        let vocabulary = ExtractionVocabulary::standard();
        let occurrences = vocabulary
            .interest_keywords
            .iter()
            .filter(|keyword| keyword.as_str() == "實驗")
            .count();
        assert_eq!(occurrences, 1);
        assert!(vocabulary.achievement_keywords.contains(&"證照".to_string()));
    }
}
