use crate::cli::ScoringArgs;
use dept_advisor::advisor::{
    BatchId, RecommendationBatch, RecommendationRepository, RepositoryError, ScoringMode,
};
use dept_advisor::config::AdvisorConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct BatchStore {
    batches: HashMap<BatchId, RecommendationBatch>,
    order: Vec<BatchId>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRecommendationRepository {
    store: Arc<Mutex<BatchStore>>,
}

impl RecommendationRepository for InMemoryRecommendationRepository {
    fn insert_batch(
        &self,
        batch: RecommendationBatch,
    ) -> Result<RecommendationBatch, RepositoryError> {
        let mut guard = self.store.lock().expect("repository mutex poisoned");
        if guard.batches.contains_key(&batch.batch_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.order.push(batch.batch_id.clone());
        guard.batches.insert(batch.batch_id.clone(), batch.clone());
        Ok(batch)
    }

    fn fetch_batch(&self, id: &BatchId) -> Result<Option<RecommendationBatch>, RepositoryError> {
        let guard = self.store.lock().expect("repository mutex poisoned");
        Ok(guard.batches.get(id).cloned())
    }

    fn latest(&self, limit: usize) -> Result<Vec<RecommendationBatch>, RepositoryError> {
        let guard = self.store.lock().expect("repository mutex poisoned");
        Ok(guard
            .order
            .iter()
            .rev()
            .take(limit)
            .filter_map(|id| guard.batches.get(id).cloned())
            .collect())
    }
}

/// Applies `--model-dir` and `--heuristic-only` on top of the loaded configuration.
pub(crate) fn apply_scoring_overrides(config: &mut AdvisorConfig, args: ScoringArgs) {
    if let Some(model_dir) = args.model_dir {
        config.model_dir = model_dir;
    }
    if args.heuristic_only {
        config.scoring = ScoringMode::Heuristic;
    }
}
