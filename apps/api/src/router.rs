use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use recommendation_cell::router::recommendation_routes;
use recommendation_cell::RecommendationError;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Result<Router, RecommendationError> {
    Ok(Router::new()
        .route("/", get(|| async { "Amae Clinic recommendation service is running!" }))
        .nest("/recommendations", recommendation_routes(state)?))
}
