use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::profile::ProfileDocument;
use super::repository::{BatchId, RecommendationRepository, RepositoryError};
use super::service::{RecommendationService, RecommendationServiceError};

const RECENT_LIMIT: usize = 10;

/// Router builder exposing the recommendation endpoints.
pub fn recommendation_router<R>(service: Arc<RecommendationService<R>>) -> Router
where
    R: RecommendationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/recommendations",
            post(recommend_handler::<R>).get(recent_handler::<R>),
        )
        .route(
            "/api/v1/recommendations/:batch_id",
            get(batch_handler::<R>),
        )
        .route("/api/v1/departments", get(departments_handler::<R>))
        .with_state(service)
}

pub(crate) async fn recommend_handler<R>(
    State(service): State<Arc<RecommendationService<R>>>,
    axum::Json(document): axum::Json<ProfileDocument>,
) -> Response
where
    R: RecommendationRepository + 'static,
{
    match service.recommend(&document) {
        Ok(batch) => (StatusCode::CREATED, axum::Json(batch)).into_response(),
        Err(RecommendationServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "recommendation batch already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn batch_handler<R>(
    State(service): State<Arc<RecommendationService<R>>>,
    Path(batch_id): Path<String>,
) -> Response
where
    R: RecommendationRepository + 'static,
{
    let id = BatchId(batch_id);
    match service.get(&id) {
        Ok(batch) => (StatusCode::OK, axum::Json(batch)).into_response(),
        Err(RecommendationServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "batch_id": id.0,
                "error": "recommendation batch not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn recent_handler<R>(
    State(service): State<Arc<RecommendationService<R>>>,
) -> Response
where
    R: RecommendationRepository + 'static,
{
    match service.recent(RECENT_LIMIT) {
        Ok(batches) => (StatusCode::OK, axum::Json(batches)).into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn departments_handler<R>(
    State(service): State<Arc<RecommendationService<R>>>,
) -> Response
where
    R: RecommendationRepository + 'static,
{
    let catalog = service.advisor().catalog();
    let payload = json!({
        "strategy": service.advisor().strategy(),
        "departments": catalog.departments(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn internal_error(error: RecommendationServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
