use std::sync::Arc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub clinic_api_base_url: String,
    pub max_results: usize,
    pub min_relevance: f64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            clinic_api_base_url: "http://localhost:8080".to_string(),
            max_results: 5,
            min_relevance: 0.1,
        }
    }
}

impl TestConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            clinic_api_base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            clinic_api_base_url: self.clinic_api_base_url.clone(),
            clinic_api_timeout_secs: 2,
            recommendation_max_results: self.max_results,
            recommendation_min_relevance: self.min_relevance,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Payloads shaped like the clinic gateway's package listing.
pub struct MockClinicApiResponses;

impl MockClinicApiResponses {
    pub fn package(name: &str, description: &str, price: f64) -> Value {
        json!({
            "medicalPackageId": Uuid::new_v4().to_string(),
            "name": name,
            "description": description,
            "price": price
        })
    }

    pub fn standard_packages() -> Vec<Value> {
        vec![
            json!({
                "medicalPackageId": "pkg-general",
                "name": "Khám tổng quát cơ bản",
                "description": "Kiểm tra sức khỏe tổng thể, xét nghiệm máu",
                "price": 500000
            }),
            json!({
                "medicalPackageId": "pkg-cardio",
                "name": "Khám tim mạch chuyên sâu",
                "description": "Điện tâm đồ, siêu âm tim, đo huyết áp",
                "price": 1200000
            }),
            json!({
                "medicalPackageId": "pkg-dental",
                "name": "Khám răng miệng",
                "description": "Nha khoa tổng quát, cạo vôi răng",
                "price": 300000
            }),
            json!({
                "medicalPackageId": "pkg-eye",
                "name": "Khám mắt",
                "description": "Đo thị lực, soi đáy mắt",
                "price": 250000
            }),
            json!({
                "medicalPackageId": "pkg-neuro",
                "name": "Khám thần kinh",
                "description": "Đánh giá đau đầu, chóng mặt, chụp não",
                "price": 900000
            }),
        ]
    }

    pub fn package_page(packages: Vec<Value>) -> Value {
        let total = packages.len();
        json!({
            "content": packages,
            "page": 1,
            "total": total
        })
    }

    pub fn wrapped_package_page(packages: Vec<Value>) -> Value {
        json!({
            "success": true,
            "data": Self::package_page(packages)
        })
    }

    pub fn error_response(message: &str) -> Value {
        json!({
            "error": message
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_points_at_mock_server() {
        let config = TestConfig::with_base_url("http://127.0.0.1:9999").to_app_config();
        assert_eq!(config.clinic_api_base_url, "http://127.0.0.1:9999");
        assert_eq!(config.recommendation_max_results, 5);
    }

    #[test]
    fn test_package_page_counts_entries() {
        let page = MockClinicApiResponses::package_page(MockClinicApiResponses::standard_packages());
        assert_eq!(page["total"], 5);
        assert!(page["content"].is_array());
    }
}
