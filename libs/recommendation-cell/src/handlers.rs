use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::{debug, info};

use shared_models::error::AppError;

use crate::error::RecommendationError;
use crate::models::{
    CategorySummary, EvaluatePackagesRequest, RecommendationResponse, SymptomAnalysis, SymptomRequest,
};
use crate::services::RecommendationService;

fn validate_symptoms(symptoms: &str) -> Result<(), RecommendationError> {
    if symptoms.trim().is_empty() {
        return Err(RecommendationError::ValidationError("symptoms must not be empty".to_string()));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn analyze_symptoms(
    State(service): State<Arc<RecommendationService>>,
    Json(request): Json<SymptomRequest>,
) -> Result<Json<SymptomAnalysis>, AppError> {
    validate_symptoms(&request.symptoms)?;

    Ok(Json(service.analyze(&request.symptoms)))
}

#[axum::debug_handler]
pub async fn recommend_packages(
    State(service): State<Arc<RecommendationService>>,
    Json(request): Json<SymptomRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    validate_symptoms(&request.symptoms)?;

    let response = service.recommend(&request.symptoms).await;
    if !response.has_recommendations() {
        info!("No confident package match for request {}", response.request_id);
    }
    debug!("Request {} answered with {} recommendation(s), fallback: {}",
           response.request_id, response.recommendations.len(), response.fallback);

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn evaluate_packages(
    State(service): State<Arc<RecommendationService>>,
    Json(request): Json<EvaluatePackagesRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    validate_symptoms(&request.symptoms)?;

    Ok(Json(service.recommend_for_catalog(&request.symptoms, &request.packages)))
}

#[axum::debug_handler]
pub async fn list_categories(
    State(service): State<Arc<RecommendationService>>,
) -> Json<Vec<CategorySummary>> {
    Json(service.category_summaries())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_blank_symptoms_rejected() {
        assert_matches!(validate_symptoms("   \n"), Err(RecommendationError::ValidationError(_)));
        assert_matches!(validate_symptoms(""), Err(RecommendationError::ValidationError(_)));
        assert!(validate_symptoms("đau răng").is_ok());
    }
}
