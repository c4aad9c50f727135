use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub clinic_api_base_url: String,
    pub clinic_api_timeout_secs: u64,
    pub recommendation_max_results: usize,
    pub recommendation_min_relevance: f64,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clinic_api_base_url: "http://api-gateway:8080".to_string(),
            clinic_api_timeout_secs: 10,
            recommendation_max_results: 5,
            recommendation_min_relevance: 0.1,
            server_port: 8000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            clinic_api_base_url: env::var("CLINIC_API_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_API_BASE_URL not set, using default");
                    defaults.clinic_api_base_url.clone()
                }),
            clinic_api_timeout_secs: parse_env("CLINIC_API_TIMEOUT_SECS", defaults.clinic_api_timeout_secs),
            recommendation_max_results: parse_env("RECOMMENDATION_MAX_RESULTS", defaults.recommendation_max_results),
            recommendation_min_relevance: parse_env("RECOMMENDATION_MIN_RELEVANCE", defaults.recommendation_min_relevance),
            server_port: parse_env("AI_SERVICE_PORT", defaults.server_port),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - clinic API base URL is empty");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.clinic_api_base_url.trim().is_empty()
    }
}

fn parse_env<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_configured() {
        let config = AppConfig::default();
        assert!(config.is_configured());
        assert_eq!(config.recommendation_max_results, 5);
        assert_eq!(config.recommendation_min_relevance, 0.1);
    }

    #[test]
    fn test_blank_base_url_is_not_configured() {
        let config = AppConfig {
            clinic_api_base_url: "   ".to_string(),
            ..AppConfig::default()
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn test_parse_env_falls_back_on_garbage() {
        env::set_var("SHARED_CONFIG_TEST_PORT", "not-a-port");
        assert_eq!(parse_env::<u16>("SHARED_CONFIG_TEST_PORT", 8000), 8000);
        env::set_var("SHARED_CONFIG_TEST_PORT", " 9100 ");
        assert_eq!(parse_env::<u16>("SHARED_CONFIG_TEST_PORT", 8000), 9100);
        env::remove_var("SHARED_CONFIG_TEST_PORT");
    }
}
