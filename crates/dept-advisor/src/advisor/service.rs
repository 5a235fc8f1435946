use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::profile::ProfileDocument;
use super::repository::{
    BatchId, RecommendationBatch, RecommendationRecord, RecommendationRepository, RepositoryError,
};
use super::Advisor;

/// Service running the advisor and handing each result batch to the repository.
pub struct RecommendationService<R> {
    advisor: Arc<Advisor>,
    repository: Arc<R>,
}

static BATCH_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_batch_id() -> BatchId {
    let id = BATCH_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    BatchId(format!("rec-{id:06}"))
}

impl<R> RecommendationService<R>
where
    R: RecommendationRepository + 'static,
{
    pub fn new(advisor: Arc<Advisor>, repository: Arc<R>) -> Self {
        Self {
            advisor,
            repository,
        }
    }

    pub fn advisor(&self) -> &Advisor {
        &self.advisor
    }

    /// Score a document and persist the ranked batch. An empty list is a valid outcome.
    pub fn recommend(
        &self,
        document: &ProfileDocument,
    ) -> Result<RecommendationBatch, RecommendationServiceError> {
        let result = self.advisor.recommend(document);
        let batch_id = next_batch_id();
        let created_at = Utc::now();

        let records = result
            .recommendations
            .into_iter()
            .map(|recommendation| RecommendationRecord {
                batch_id: batch_id.clone(),
                created_at,
                recommendation,
            })
            .collect();

        let batch = RecommendationBatch {
            batch_id,
            created_at,
            strategy: result.strategy,
            profile: result.profile,
            records,
        };

        let stored = self.repository.insert_batch(batch)?;
        info!(
            batch_id = %stored.batch_id.0,
            strategy = stored.strategy.label(),
            recommendations = stored.records.len(),
            top = stored.top().map(|top| top.department.as_str()).unwrap_or("none"),
            "stored recommendation batch"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &BatchId) -> Result<RecommendationBatch, RecommendationServiceError> {
        let batch = self
            .repository
            .fetch_batch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(batch)
    }

    pub fn recent(
        &self,
        limit: usize,
    ) -> Result<Vec<RecommendationBatch>, RecommendationServiceError> {
        Ok(self.repository.latest(limit)?)
    }
}

/// Error raised by the recommendation service.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
