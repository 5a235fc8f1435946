//! Student profile → department recommendation pipeline.
//!
//! Raw text goes through the [`FieldExtractor`]; structured uploads are used as given. The
//! resulting [`StudentProfile`] is scored by the [`ScoringEngine`] chosen at startup and the
//! [`Ranker`] turns the scores into an ordered, explained [`Recommendation`] list.

pub mod catalog;
pub mod extraction;
pub mod features;
pub mod profile;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{
    CatalogError, DepartmentCatalog, DepartmentCategory, DepartmentDefinition, FeatureTaxonomy,
    KeywordCategory,
};
pub use extraction::{ExtractionVocabulary, FieldExtractor};
pub use features::{FeatureBuilder, FeatureLayout, FeatureVector};
pub use profile::{PersonalInfo, ProfileDocument, StudentProfile, Subject};
pub use ranking::{
    Chooser, FirstChooser, MatchFactor, Ranker, Recommendation, SeededChooser, SelectionMode,
    UniformChooser,
};
pub use repository::{
    BatchId, RecommendationBatch, RecommendationRecord, RecommendationRepository, RepositoryError,
};
pub use router::recommendation_router;
pub use scoring::classifier::{
    fit_department_model, FitReport, SyntheticDataset, TrainingConfig, TrainingError,
};
pub use scoring::{
    ClassifierScorer, DepartmentScore, ModelArtifactError, ModelArtifacts, ScoreBreakdown,
    ScoreSheet, ScoringEngine, ScoringMode, StrategyKind,
};
pub use service::{RecommendationService, RecommendationServiceError};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AdvisorConfig;

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub profile: StudentProfile,
    pub strategy: StrategyKind,
    pub recommendations: Vec<Recommendation>,
}

/// Immutable pipeline shared across requests.
#[derive(Debug, Clone)]
pub struct Advisor {
    catalog: Arc<DepartmentCatalog>,
    extractor: FieldExtractor,
    engine: ScoringEngine,
    ranker: Ranker,
}

impl Advisor {
    pub fn new(
        catalog: Arc<DepartmentCatalog>,
        engine: ScoringEngine,
        chooser: Arc<dyn Chooser>,
    ) -> Self {
        Self {
            ranker: Ranker::new(catalog.clone(), chooser),
            extractor: FieldExtractor::default(),
            catalog,
            engine,
        }
    }

    /// Heuristic-only pipeline; never reads model artifacts.
    pub fn heuristic(catalog: Arc<DepartmentCatalog>, chooser: Arc<dyn Chooser>) -> Self {
        let engine = ScoringEngine::heuristic(catalog.clone());
        Self::new(catalog, engine, chooser)
    }

    /// Standard catalog with the strategy and selection described by `config`.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self, CatalogError> {
        let catalog = Arc::new(DepartmentCatalog::standard()?);
        let builder = FeatureBuilder::from_catalog(&catalog);
        let engine =
            ScoringEngine::select(catalog.clone(), &builder, config.scoring, &config.model_dir);
        Ok(Self::new(catalog, engine, config.selection.chooser()))
    }

    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn catalog(&self) -> &DepartmentCatalog {
        &self.catalog
    }

    pub fn strategy(&self) -> StrategyKind {
        self.engine.strategy()
    }

    pub fn profile_from(&self, document: &ProfileDocument) -> StudentProfile {
        match document {
            ProfileDocument::RawText { text } => self.extractor.extract(text),
            ProfileDocument::Structured(profile) => profile.clone(),
        }
    }

    pub fn recommend(&self, document: &ProfileDocument) -> Recommendations {
        self.recommend_profile(self.profile_from(document))
    }

    pub fn recommend_profile(&self, profile: StudentProfile) -> Recommendations {
        let sheet = self.engine.score(&profile);
        let recommendations = self.ranker.rank(&sheet, &profile);
        debug!(
            strategy = sheet.strategy.label(),
            recommendations = recommendations.len(),
            "ranked recommendations"
        );

        Recommendations {
            strategy: sheet.strategy,
            profile,
            recommendations,
        }
    }
}
