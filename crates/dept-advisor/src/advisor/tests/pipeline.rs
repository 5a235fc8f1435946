use std::sync::Arc;

use super::common::*;
use crate::advisor::profile::{ProfileDocument, Subject};
use crate::advisor::ranking::{MatchFactor, SeededChooser};
use crate::advisor::Advisor;

const TRANSCRIPT: &str = "姓名：陳怡君\n\
學校：國立臺中第一高級中學\n\
國文：80 英文：85 數學：95 自然：92\n\
我熱愛程式設計，對人工智慧也很有興趣。\n\
曾獲得全國資訊競賽第一名。\n\
擔任資訊研究社社長。\n\
希望未來從事軟體開發工作。";

#[test]
fn raw_text_documents_flow_through_extraction() {
    let advisor = heuristic_advisor(standard_catalog());
    let result = advisor.recommend(&ProfileDocument::raw_text(TRANSCRIPT));

    assert_eq!(result.profile.personal_info.name.as_deref(), Some("陳怡君"));
    assert_eq!(result.profile.score(Subject::Math), Some(95.0));
    assert_eq!(result.profile.career_goals, "希望未來從事軟體開發工作");

    let top = result.recommendations.first().expect("candidates");
    assert_eq!(top.department, "資訊工程學系");
    assert!(top.match_factors.contains(&MatchFactor::AcademicStrength));
    assert!(top.match_factors.contains(&MatchFactor::CareerAlignment));
}

#[test]
fn structured_documents_skip_extraction() {
    let advisor = heuristic_advisor(standard_catalog());
    let document = ProfileDocument::structured(software_profile());
    let result = advisor.recommend(&document);

    assert_eq!(result.profile, software_profile());
    assert_eq!(result.recommendations.len(), 4);
}

#[test]
fn seeded_selection_replays_institutions() {
    let catalog = standard_catalog();
    let left = Advisor::heuristic(catalog.clone(), Arc::new(SeededChooser::new(7)));
    let right = Advisor::heuristic(catalog, Arc::new(SeededChooser::new(7)));

    let first = left.recommend_profile(software_profile()).recommendations;
    let second = right.recommend_profile(software_profile()).recommendations;
    assert_eq!(first, second);
}

#[test]
fn scores_are_deterministic_regardless_of_selection() {
    let catalog = standard_catalog();
    let seeded = Advisor::heuristic(catalog.clone(), Arc::new(SeededChooser::new(99)));
    let first = heuristic_advisor(catalog);

    let scored = |advisor: &Advisor| {
        advisor
            .recommend_profile(software_profile())
            .recommendations
            .into_iter()
            .map(|recommendation| (recommendation.department, recommendation.score))
            .collect::<Vec<_>>()
    };
    assert_eq!(scored(&seeded), scored(&first));
}
