use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_config::AppConfig;

use crate::error::RecommendationError;
use crate::handlers;
use crate::services::RecommendationService;

/// Builds the engine once from configuration and mounts it.
pub fn recommendation_routes(config: Arc<AppConfig>) -> Result<Router, RecommendationError> {
    let service = RecommendationService::new(&config)?;
    Ok(recommendation_routes_with_service(Arc::new(service)))
}

pub fn recommendation_routes_with_service(service: Arc<RecommendationService>) -> Router {
    Router::new()
        .route("/analyze", post(handlers::analyze_symptoms))
        .route("/packages", post(handlers::recommend_packages))
        .route("/packages/evaluate", post(handlers::evaluate_packages))
        .route("/categories", get(handlers::list_categories))
        .with_state(service)
}
