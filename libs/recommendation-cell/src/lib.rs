pub mod error;
pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use error::RecommendationError;
pub use models::*;
pub use services::*;
