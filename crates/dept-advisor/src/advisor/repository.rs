use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::profile::StudentProfile;
use super::ranking::Recommendation;
use super::scoring::StrategyKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchId(pub String);

/// One persisted recommendation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub batch_id: BatchId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub recommendation: Recommendation,
}

/// Every record produced by one pipeline run, with the profile it was scored from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationBatch {
    pub batch_id: BatchId,
    pub created_at: DateTime<Utc>,
    pub strategy: StrategyKind,
    pub profile: StudentProfile,
    pub records: Vec<RecommendationRecord>,
}

impl RecommendationBatch {
    pub fn top(&self) -> Option<&Recommendation> {
        self.records.first().map(|record| &record.recommendation)
    }
}

/// Caller-owned persistence seam for recommendation batches.
pub trait RecommendationRepository: Send + Sync {
    fn insert_batch(
        &self,
        batch: RecommendationBatch,
    ) -> Result<RecommendationBatch, RepositoryError>;
    fn fetch_batch(&self, id: &BatchId) -> Result<Option<RecommendationBatch>, RepositoryError>;
    /// Most recent batches first.
    fn latest(&self, limit: usize) -> Result<Vec<RecommendationBatch>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
