use super::{DepartmentCategory, DepartmentDefinition, FeatureTaxonomy, KeywordCategory};
use crate::advisor::profile::Subject;

const NTU: &str = "國立台灣大學";
const NTHU: &str = "國立清華大學";
const NYCU: &str = "國立交通大學";
const NCKU: &str = "國立成功大學";
const NCCU: &str = "國立政治大學";
const NCU: &str = "國立中央大學";

struct Entry {
    name: &'static str,
    category: DepartmentCategory,
    description: &'static str,
    keywords: &'static [&'static str],
    subjects: &'static [(Subject, f64)],
    institutions: &'static [&'static str],
    majors: &'static [&'static str],
    career_paths: &'static [&'static str],
}

// Career paths are space separated so that any single word can match a stated goal.
const ENTRIES: &[Entry] = &[
    Entry {
        name: "資訊工程學系",
        category: DepartmentCategory::Technical,
        description: "專注於電腦科學、軟體開發、人工智慧、資料科學等領域",
        keywords: &["程式", "軟體", "資訊", "人工智慧"],
        subjects: &[(Subject::Math, 1.0), (Subject::Science, 1.0)],
        institutions: &[NTU, NTHU, NYCU, NCKU],
        majors: &["軟體工程", "人工智慧", "資料科學", "網路工程"],
        career_paths: &["軟體 工程師", "系統 開發", "資料 科學家"],
    },
    Entry {
        name: "電機工程學系",
        category: DepartmentCategory::Technical,
        description: "涵蓋電力系統、電子電路、控制系統、通訊工程等領域",
        keywords: &["電路", "電子", "通訊", "電力", "控制"],
        subjects: &[(Subject::Math, 1.0), (Subject::Physics, 1.0)],
        institutions: &[NTU, NTHU, NYCU, NCKU],
        majors: &["電力工程", "控制工程", "通訊工程", "電子工程"],
        career_paths: &["硬體 工程師", "電力 工程師", "通訊 工程師", "控制 工程師"],
    },
    Entry {
        name: "機械工程學系",
        category: DepartmentCategory::Technical,
        description: "專精於機械設計、製造工程、熱流工程、材料科學等領域",
        keywords: &["機械", "製造", "材料", "cad"],
        subjects: &[(Subject::Math, 1.0), (Subject::Physics, 1.0)],
        institutions: &[NTU, NTHU, NCKU, NCU],
        majors: &["機械設計", "製造工程", "熱流工程", "材料工程"],
        career_paths: &["機械 工程師", "設計 工程師", "製造 工程師", "研發 工程師"],
    },
    Entry {
        name: "數學系",
        category: DepartmentCategory::Science,
        description: "探討純粹數學、應用數學與統計推論",
        keywords: &["數學", "統計", "計算", "邏輯"],
        subjects: &[(Subject::Math, 2.0), (Subject::Science, 1.0)],
        institutions: &[NTU, NTHU, NYCU, NCU],
        majors: &["應用數學", "統計學", "計算數學", "純數學"],
        career_paths: &["數學 研究員", "統計 分析師", "精算師"],
    },
    Entry {
        name: "商業管理學系",
        category: DepartmentCategory::Business,
        description: "培養企業管理、行銷、人力資源、營運管理等專業人才",
        keywords: &["管理", "行銷", "領導", "企業"],
        subjects: &[(Subject::Chinese, 1.0), (Subject::English, 1.0)],
        institutions: &[NCCU, NTU, NTHU, NCU],
        majors: &["企業管理", "行銷管理", "人力資源管理", "營運管理"],
        career_paths: &["管理 顧問", "行銷 經理", "人資 專員", "營運 經理"],
    },
    Entry {
        name: "經濟學系",
        category: DepartmentCategory::Business,
        description: "研究經濟理論、計量經濟、國際經濟、金融經濟等領域",
        keywords: &["經濟", "金融", "市場", "統計"],
        subjects: &[(Subject::Math, 1.0), (Subject::Chinese, 1.0)],
        institutions: &[NTU, NCCU, NTHU, NCU],
        majors: &["經濟理論", "計量經濟", "國際經濟", "金融經濟"],
        career_paths: &["經濟 分析師", "金融 分析師", "政策 研究員"],
    },
    Entry {
        name: "會計學系",
        category: DepartmentCategory::Business,
        description: "涵蓋財務會計、管理會計、審計與稅務實務",
        keywords: &["會計", "財務"],
        subjects: &[(Subject::Math, 1.0), (Subject::Chinese, 1.0)],
        institutions: &[NTU, NCCU, NCKU, NCU],
        majors: &["財務會計", "管理會計", "審計", "稅務"],
        career_paths: &["會計師", "財務 分析師", "稽核 人員"],
    },
    Entry {
        name: "外國語文學系",
        category: DepartmentCategory::Humanities,
        description: "培養外語能力、文學賞析、翻譯與跨文化溝通",
        keywords: &["英文", "語文", "翻譯", "文學"],
        subjects: &[(Subject::English, 2.0), (Subject::Chinese, 1.0)],
        institutions: &[NTU, NCCU, NTHU, NCU],
        majors: &["英語文學", "翻譯", "語言學", "比較文學"],
        career_paths: &["翻譯 人員", "外語 教師", "國際 事務"],
    },
];

pub(super) fn departments() -> Vec<DepartmentDefinition> {
    ENTRIES
        .iter()
        .map(|entry| DepartmentDefinition {
            name: entry.name.to_string(),
            category: entry.category,
            description: entry.description.to_string(),
            keywords: owned(entry.keywords),
            subject_weights: entry.subjects.to_vec(),
            institutions: owned(entry.institutions),
            majors: owned(entry.majors),
            career_paths: owned(entry.career_paths),
        })
        .collect()
}

pub(super) fn taxonomy() -> FeatureTaxonomy {
    FeatureTaxonomy {
        interests: vec![
            KeywordCategory::new("programming", &["程式設計", "程式", "coding", "軟體", "資訊"]),
            KeywordCategory::new("mathematics", &["數學", "統計", "計算"]),
            KeywordCategory::new("physics", &["物理", "力學", "電學"]),
            KeywordCategory::new("chemistry", &["化學", "實驗"]),
            KeywordCategory::new("biology", &["生物", "生命科學"]),
            KeywordCategory::new("literature", &["文學", "語文", "寫作"]),
            KeywordCategory::new("history", &["歷史", "社會"]),
            KeywordCategory::new("art", &["藝術", "美術", "設計"]),
            KeywordCategory::new("music", &["音樂", "樂器"]),
            KeywordCategory::new("sports", &["運動", "體育", "健身"]),
            KeywordCategory::new("leadership", &["領導", "管理", "組織"]),
            KeywordCategory::new("research", &["研究", "學術", "實驗"]),
            KeywordCategory::new("communication", &["溝通", "表達", "演講"]),
            KeywordCategory::new("creativity", &["創意", "創新", "創作"]),
            KeywordCategory::new("analysis", &["分析", "邏輯", "思考"]),
        ],
        clubs: vec![
            KeywordCategory::new("leadership", &["社長", "會長", "幹部", "領導"]),
            KeywordCategory::new("tech", &["資訊", "程式", "電腦", "科技"]),
            KeywordCategory::new("art", &["美術", "藝術", "設計", "創作"]),
            KeywordCategory::new("sports", &["運動", "體育", "球隊", "健身"]),
            KeywordCategory::new("academic", &["學術", "研究", "讀書", "競賽"]),
        ],
        competitions: vec![
            KeywordCategory::new("math", &["數學", "奧林匹亞", "競賽"]),
            KeywordCategory::new("science", &["科學", "物理", "化學", "生物"]),
            KeywordCategory::new("programming", &["程式", "資訊", "軟體"]),
            KeywordCategory::new("language", &["語文", "英文", "國文"]),
            KeywordCategory::new("art", &["美術", "藝術", "創作"]),
        ],
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
