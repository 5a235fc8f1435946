use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::advisor::catalog::{
    DepartmentCatalog, DepartmentCategory, DepartmentDefinition, FeatureTaxonomy,
};
use crate::advisor::profile::{StudentProfile, Subject};
use crate::advisor::ranking::FirstChooser;
use crate::advisor::repository::{
    BatchId, RecommendationBatch, RecommendationRepository, RepositoryError,
};
use crate::advisor::{recommendation_router, Advisor, RecommendationService};

pub(super) fn standard_catalog() -> Arc<DepartmentCatalog> {
    Arc::new(DepartmentCatalog::standard().expect("standard catalog"))
}

/// Two departments: one weighted on math, one with no academic preference.
pub(super) fn fixture_catalog() -> Arc<DepartmentCatalog> {
    let departments = vec![
        DepartmentDefinition {
            name: "軟體工程學系".to_string(),
            category: DepartmentCategory::Technical,
            description: "軟體系統設計與實作".to_string(),
            keywords: vec!["程式".to_string(), "軟體".to_string()],
            subject_weights: vec![(Subject::Math, 1.0)],
            institutions: vec!["測試大學".to_string()],
            majors: vec!["軟體工程".to_string()],
            career_paths: vec!["軟體 工程師".to_string()],
        },
        DepartmentDefinition {
            name: "通識教育學系".to_string(),
            category: DepartmentCategory::Humanities,
            description: "跨領域通識課程".to_string(),
            keywords: vec!["通識".to_string()],
            subject_weights: Vec::new(),
            institutions: vec!["測試大學".to_string()],
            majors: vec!["通識教育".to_string()],
            career_paths: vec!["教育 工作者".to_string()],
        },
    ];

    Arc::new(DepartmentCatalog::new(departments, standard_taxonomy()).expect("fixture catalog"))
}

pub(super) fn standard_taxonomy() -> FeatureTaxonomy {
    DepartmentCatalog::standard()
        .expect("standard catalog")
        .taxonomy()
        .clone()
}

pub(super) fn software_profile() -> StudentProfile {
    let mut profile = StudentProfile {
        interests: vec!["程式設計".to_string(), "人工智慧".to_string()],
        achievements: vec!["全國資訊競賽第一名".to_string()],
        career_goals: "希望從事軟體開發".to_string(),
        ..StudentProfile::default()
    };
    profile.set_score(Subject::Math, 95.0);
    profile.set_score(Subject::Science, 92.0);
    profile.set_score(Subject::Chinese, 60.0);
    profile.set_score(Subject::English, 65.0);
    profile.set_score(Subject::Social, 60.0);
    profile
}

pub(super) fn heuristic_advisor(catalog: Arc<DepartmentCatalog>) -> Advisor {
    Advisor::heuristic(catalog, Arc::new(FirstChooser))
}

pub(super) fn build_service() -> (
    RecommendationService<MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let advisor = Arc::new(heuristic_advisor(standard_catalog()));
    let service = RecommendationService::new(advisor, repository.clone());
    (service, repository)
}

pub(super) fn service_with<R>(repository: R) -> Arc<RecommendationService<R>>
where
    R: RecommendationRepository + 'static,
{
    let advisor = Arc::new(heuristic_advisor(standard_catalog()));
    Arc::new(RecommendationService::new(advisor, Arc::new(repository)))
}

pub(super) fn recommendation_router_with_service(
    service: RecommendationService<MemoryRepository>,
) -> axum::Router {
    recommendation_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) batches: Arc<Mutex<Vec<RecommendationBatch>>>,
}

impl RecommendationRepository for MemoryRepository {
    fn insert_batch(
        &self,
        batch: RecommendationBatch,
    ) -> Result<RecommendationBatch, RepositoryError> {
        let mut guard = self.batches.lock().expect("repository mutex poisoned");
        if guard.iter().any(|stored| stored.batch_id == batch.batch_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(batch.clone());
        Ok(batch)
    }

    fn fetch_batch(&self, id: &BatchId) -> Result<Option<RecommendationBatch>, RepositoryError> {
        let guard = self.batches.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|batch| &batch.batch_id == id).cloned())
    }

    fn latest(&self, limit: usize) -> Result<Vec<RecommendationBatch>, RepositoryError> {
        let guard = self.batches.lock().expect("repository mutex poisoned");
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}

pub(super) struct ConflictRepository;

impl RecommendationRepository for ConflictRepository {
    fn insert_batch(
        &self,
        _batch: RecommendationBatch,
    ) -> Result<RecommendationBatch, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch_batch(&self, _id: &BatchId) -> Result<Option<RecommendationBatch>, RepositoryError> {
        Ok(None)
    }

    fn latest(&self, _limit: usize) -> Result<Vec<RecommendationBatch>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl RecommendationRepository for UnavailableRepository {
    fn insert_batch(
        &self,
        _batch: RecommendationBatch,
    ) -> Result<RecommendationBatch, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_batch(&self, _id: &BatchId) -> Result<Option<RecommendationBatch>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn latest(&self, _limit: usize) -> Result<Vec<RecommendationBatch>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn assert_conflict_response(response: Response) {
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
