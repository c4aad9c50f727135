use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum RecommendationError {
    #[error("Package catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Package catalog payload invalid: {0}")]
    InvalidCatalog(String),

    #[error("Knowledge base pattern failed to compile: {0}")]
    KnowledgeBase(#[from] regex::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<RecommendationError> for AppError {
    fn from(error: RecommendationError) -> Self {
        match error {
            RecommendationError::CatalogUnavailable(msg) => AppError::ExternalService(msg),
            RecommendationError::InvalidCatalog(msg) => AppError::ExternalService(msg),
            RecommendationError::KnowledgeBase(e) => AppError::Internal(e.to_string()),
            RecommendationError::ValidationError(msg) => AppError::ValidationError(msg),
        }
    }
}
