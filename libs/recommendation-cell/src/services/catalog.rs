use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

use shared_clinic_api::ClinicApiClient;
use shared_config::AppConfig;

use crate::error::RecommendationError;
use crate::models::PackageCatalogEntry;

/// Source of the service packages offered by the clinic.
#[async_trait]
pub trait PackageCatalog: Send + Sync {
    async fn fetch_packages(&self) -> Result<Vec<PackageCatalogEntry>, RecommendationError>;
}

/// Reads the package catalog from the clinic API gateway.
pub struct ClinicApiCatalog {
    client: ClinicApiClient,
}

impl ClinicApiCatalog {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: ClinicApiClient::new(config),
        }
    }
}

#[async_trait]
impl PackageCatalog for ClinicApiCatalog {
    async fn fetch_packages(&self) -> Result<Vec<PackageCatalogEntry>, RecommendationError> {
        let response = self.client
            .get_json("/api/medical-package", &[("page", "1".to_string())])
            .await
            .map_err(|e| {
                error!("Failed to fetch medical packages: {}", e);
                RecommendationError::CatalogUnavailable(e.to_string())
            })?;

        let packages = parse_catalog_payload(response)?;
        debug!("Fetched {} medical packages from clinic API", packages.len());
        Ok(packages)
    }
}

/// Accepts `{content: [...]}` and the wrapped `{data: {content: [...]}}` shape.
pub fn parse_catalog_payload(mut payload: Value) -> Result<Vec<PackageCatalogEntry>, RecommendationError> {
    let content = match payload.get_mut("content") {
        Some(content) => content.take(),
        None => payload.get_mut("data")
            .and_then(|data| data.get_mut("content"))
            .map(Value::take)
            .unwrap_or(Value::Array(Vec::new())),
    };

    if content.is_null() {
        return Ok(Vec::new());
    }

    let entries: Vec<Value> = serde_json::from_value(content)
        .map_err(|e| RecommendationError::InvalidCatalog(e.to_string()))?;

    Ok(entries.into_iter().map(PackageCatalogEntry::from).collect())
}

/// Fixed in-memory catalog.
pub struct StaticCatalog {
    packages: Vec<PackageCatalogEntry>,
}

impl StaticCatalog {
    pub fn new(packages: Vec<PackageCatalogEntry>) -> Self {
        Self { packages }
    }
}

#[async_trait]
impl PackageCatalog for StaticCatalog {
    async fn fetch_packages(&self) -> Result<Vec<PackageCatalogEntry>, RecommendationError> {
        Ok(self.packages.clone())
    }
}
