// =====================================================================================
// RECOMMENDATION SERVICE - ENGINE ENTRY POINT
// =====================================================================================

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::error::RecommendationError;
use crate::models::{
    CategorySummary, MedicalRecommendation, PackageCatalogEntry, RecommendationResponse,
    SymptomAnalysis,
};
use crate::services::analyzer::SymptomAnalyzer;
use crate::services::catalog::{ClinicApiCatalog, PackageCatalog};
use crate::services::fallback::{FallbackMatcher, FALLBACK_CONFIDENCE, FALLBACK_URGENCY};
use crate::services::knowledge::fallback_catalog;
use crate::services::ranking::Ranker;
use crate::services::scoring::RelevanceScorer;

/// Context object owning every collaborator of the engine. Build once and
/// share behind `Arc`; nothing in here is mutated after construction.
pub struct RecommendationService {
    analyzer: SymptomAnalyzer,
    scorer: RelevanceScorer,
    ranker: Ranker,
    fallback: FallbackMatcher,
    catalog: Arc<dyn PackageCatalog>,
}

impl RecommendationService {
    pub fn new(config: &AppConfig) -> Result<Self, RecommendationError> {
        Self::with_catalog(config, Arc::new(ClinicApiCatalog::new(config)))
    }

    pub fn with_catalog(config: &AppConfig, catalog: Arc<dyn PackageCatalog>) -> Result<Self, RecommendationError> {
        let ranker = Ranker::from_config(config);
        Ok(Self {
            analyzer: SymptomAnalyzer::new()?,
            scorer: RelevanceScorer::new(),
            ranker,
            fallback: FallbackMatcher::new(ranker.max_results()),
            catalog,
        })
    }

    pub fn analyzer(&self) -> &SymptomAnalyzer {
        &self.analyzer
    }

    pub fn analyze(&self, symptoms: &str) -> SymptomAnalysis {
        self.analyzer.analyze(symptoms)
    }

    /// Scores and ranks `packages` against an existing analysis.
    pub fn recommend_packages(
        &self,
        analysis: &SymptomAnalysis,
        packages: &[PackageCatalogEntry],
    ) -> Vec<MedicalRecommendation> {
        let scored = packages.iter()
            .map(|package| self.scorer.score(package, analysis))
            .collect();

        self.ranker.rank(scored)
    }

    /// Fetches the live catalog and runs the full pipeline. A catalog failure
    /// degrades to the keyword fallback over the built-in package list.
    #[instrument(skip(self, symptoms))]
    pub async fn recommend(&self, symptoms: &str) -> RecommendationResponse {
        match self.catalog.fetch_packages().await {
            Ok(packages) => self.recommend_for_catalog(symptoms, &packages),
            Err(e) => {
                warn!("Primary recommendation path failed, using keyword fallback: {}", e);
                self.fallback_response(symptoms, &fallback_catalog())
            }
        }
    }

    /// Full pipeline against a caller-supplied catalog.
    pub fn recommend_for_catalog(&self, symptoms: &str, packages: &[PackageCatalogEntry]) -> RecommendationResponse {
        let analysis = self.analyzer.analyze(symptoms);
        let recommendations = self.recommend_packages(&analysis, packages);

        info!("Recommended {} of {} packages (category: {}, urgency: {})",
              recommendations.len(), packages.len(), analysis.primary_category, analysis.urgency_level);

        RecommendationResponse {
            request_id: Uuid::new_v4(),
            symptoms: symptoms.to_string(),
            urgency_level: analysis.urgency_level,
            confidence_score: analysis.confidence_score,
            analysis: Some(analysis),
            recommendations,
            fallback: false,
            generated_at: Utc::now(),
        }
    }

    /// Degraded keyword-only response. Never fails.
    pub fn fallback_response(&self, symptoms: &str, packages: &[PackageCatalogEntry]) -> RecommendationResponse {
        let recommendations = self.fallback.recommend(symptoms, packages);
        debug!("Fallback produced {} recommendation(s)", recommendations.len());

        RecommendationResponse {
            request_id: Uuid::new_v4(),
            symptoms: symptoms.to_string(),
            analysis: None,
            recommendations,
            urgency_level: FALLBACK_URGENCY,
            confidence_score: FALLBACK_CONFIDENCE,
            fallback: true,
            generated_at: Utc::now(),
        }
    }

    pub fn category_summaries(&self) -> Vec<CategorySummary> {
        self.analyzer.knowledge().categories().iter()
            .map(|profile| profile.summary())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::models::UrgencyLevel;
    use crate::services::catalog::StaticCatalog;

    struct UnreachableCatalog;

    #[async_trait]
    impl PackageCatalog for UnreachableCatalog {
        async fn fetch_packages(&self) -> Result<Vec<PackageCatalogEntry>, RecommendationError> {
            Err(RecommendationError::CatalogUnavailable("connection refused".to_string()))
        }
    }

    fn service_with(catalog: Arc<dyn PackageCatalog>) -> RecommendationService {
        RecommendationService::with_catalog(&AppConfig::default(), catalog).unwrap()
    }

    fn clinic_packages() -> Vec<PackageCatalogEntry> {
        vec![
            PackageCatalogEntry::new("general", "Khám tổng quát cơ bản", "Kiểm tra sức khỏe tổng thể", 300_000.0),
            PackageCatalogEntry::new("cardio", "Khám tim mạch", "Điện tâm đồ, siêu âm tim, đo huyết áp", 900_000.0),
            PackageCatalogEntry::new("dental", "Khám răng miệng", "Nha khoa tổng quát", 200_000.0),
        ]
    }

    #[tokio::test]
    async fn test_recommend_uses_catalog() {
        let service = service_with(Arc::new(StaticCatalog::new(clinic_packages())));

        let response = service.recommend("đau ngực trái, khó thở, mồ hôi lạnh").await;

        assert!(!response.fallback);
        assert_eq!(response.urgency_level, UrgencyLevel::High);
        assert_eq!(response.recommendations[0].package_id, "cardio");
        assert!(response.recommendations.iter().all(|r| !r.fallback));
    }

    #[tokio::test]
    async fn test_catalog_failure_falls_back() {
        let service = service_with(Arc::new(UnreachableCatalog));

        let response = service.recommend("đau răng, sưng lợi").await;

        assert!(response.fallback);
        assert!(response.analysis.is_none());
        assert_eq!(response.urgency_level, UrgencyLevel::Medium);
        assert_eq!(response.confidence_score, 0.5);
        assert!(!response.recommendations.is_empty());
        assert!(response.recommendations.iter().all(|r| r.fallback));
    }

    #[tokio::test]
    async fn test_empty_catalog_is_not_an_error() {
        let service = service_with(Arc::new(StaticCatalog::new(Vec::new())));

        let response = service.recommend("đau ngực trái").await;

        assert!(!response.fallback);
        assert!(response.recommendations.is_empty());
        assert!(response.analysis.is_some());
    }

    #[test]
    fn test_category_summaries_cover_table() {
        let service = service_with(Arc::new(StaticCatalog::new(Vec::new())));
        let summaries = service.category_summaries();

        assert_eq!(summaries.len(), service.analyzer().knowledge().categories().len());
        assert!(summaries.iter().all(|s| s.pattern_count > 0));
    }
}
