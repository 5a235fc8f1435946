use super::common::*;
use crate::advisor::profile::{ProfileDocument, StudentProfile};
use crate::advisor::repository::{BatchId, RecommendationRepository, RepositoryError};
use crate::advisor::scoring::StrategyKind;
use crate::advisor::RecommendationServiceError;

#[test]
fn recommend_persists_every_ranked_record() {
    let (service, repository) = build_service();

    let batch = service
        .recommend(&ProfileDocument::structured(software_profile()))
        .expect("batch stored");

    assert!(batch.batch_id.0.starts_with("rec-"));
    assert_eq!(batch.strategy, StrategyKind::Heuristic);
    assert_eq!(batch.records.len(), 4);
    assert!(batch
        .records
        .iter()
        .all(|record| record.batch_id == batch.batch_id && record.created_at == batch.created_at));
    assert_eq!(
        batch.top().map(|top| top.department.as_str()),
        Some("資訊工程學系")
    );

    let stored = repository
        .fetch_batch(&batch.batch_id)
        .expect("fetch succeeds")
        .expect("batch present");
    assert_eq!(stored, batch);
}

#[test]
fn empty_results_are_still_recorded() {
    let (service, repository) = build_service();

    let batch = service
        .recommend(&ProfileDocument::structured(StudentProfile::default()))
        .expect("empty batch stored");

    assert!(batch.records.is_empty());
    assert!(batch.top().is_none());
    assert_eq!(repository.latest(10).expect("latest").len(), 1);
}

#[test]
fn batch_ids_are_unique() {
    let (service, _) = build_service();
    let document = ProfileDocument::structured(software_profile());

    let first = service.recommend(&document).expect("first batch");
    let second = service.recommend(&document).expect("second batch");
    assert_ne!(first.batch_id, second.batch_id);

    let recent = service.recent(1).expect("recent batches");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].batch_id, second.batch_id);
}

#[test]
fn get_propagates_not_found() {
    let (service, _) = build_service();

    match service.get(&BatchId("missing".to_string())) {
        Err(RecommendationServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found error, got {other:?}"),
    }
}

#[test]
fn recommend_propagates_repository_failures() {
    let service = service_with(UnavailableRepository);

    match service.recommend(&ProfileDocument::structured(software_profile())) {
        Err(RecommendationServiceError::Repository(RepositoryError::Unavailable(reason))) => {
            assert_eq!(reason, "database offline");
        }
        other => panic!("expected unavailable error, got {other:?}"),
    }
}
