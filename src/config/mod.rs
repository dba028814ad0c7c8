use crate::dispatch::DispatchType;
use crate::error::{FaultlineError, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::Arc;

pub const ERROR_PATH_KEY: &str = "FAULTLINE_ERROR_PATH";
pub const API_BASE_PATH_KEY: &str = "FAULTLINE_API_BASE_PATH";
pub const INTERCEPTOR_INCLUDE_KEY: &str = "FAULTLINE_INTERCEPTOR_INCLUDE";
pub const INTERCEPTOR_EXCLUDE_KEY: &str = "FAULTLINE_INTERCEPTOR_EXCLUDE";
pub const FILTER_DISPATCH_TYPES_KEY: &str = "FAULTLINE_FILTER_DISPATCH_TYPES";
pub const INCLUDE_DETAILS_KEY: &str = "FAULTLINE_ERROR_INCLUDE_DETAILS";

/// Configuration service
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeded from the process environment
    pub fn from_env() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }
}

/// Typed configuration for the error-handling stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Where unresolved errors are re-dispatched
    pub error_path: String,
    /// Paths under this prefix get the exception advice
    pub api_base_path: String,
    pub interceptor_include: Vec<String>,
    pub interceptor_exclude: Vec<String>,
    pub filter_dispatch_types: Vec<DispatchType>,
    /// Show exception type and message on the default error page
    pub include_details: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            error_path: "/error".to_string(),
            api_base_path: "/api".to_string(),
            interceptor_include: vec!["/**".to_string()],
            interceptor_exclude: ["/css/**", "*.ico", "/error", "/error-page/**"]
                .into_iter()
                .map(String::from)
                .collect(),
            filter_dispatch_types: vec![DispatchType::Request, DispatchType::Error],
            include_details: false,
        }
    }
}

impl WebConfig {
    /// Overlay values found in `service` on the defaults
    pub fn from_service(service: &ConfigService) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = service.get(ERROR_PATH_KEY) {
            config.error_path = absolute_path(ERROR_PATH_KEY, &path)?;
        }
        if let Some(path) = service.get(API_BASE_PATH_KEY) {
            config.api_base_path = absolute_path(API_BASE_PATH_KEY, &path)?;
        }
        if let Some(patterns) = service.get(INTERCEPTOR_INCLUDE_KEY) {
            config.interceptor_include = split_list(&patterns);
        }
        if let Some(patterns) = service.get(INTERCEPTOR_EXCLUDE_KEY) {
            config.interceptor_exclude = split_list(&patterns);
        }
        if let Some(types) = service.get(FILTER_DISPATCH_TYPES_KEY) {
            config.filter_dispatch_types = split_list(&types)
                .iter()
                .map(|value| {
                    DispatchType::from_str(value).map_err(|_| {
                        FaultlineError::invalid_config(
                            FILTER_DISPATCH_TYPES_KEY,
                            format!("unknown dispatch type '{value}'"),
                        )
                    })
                })
                .collect::<Result<_>>()?;
        }
        if let Some(flag) = service.get(INCLUDE_DETAILS_KEY) {
            config.include_details = flag.trim().parse().map_err(|_| {
                FaultlineError::invalid_config(INCLUDE_DETAILS_KEY, format!("expected a bool, got '{flag}'"))
            })?;
        }

        tracing::debug!(?config, "Loaded web config");
        Ok(config)
    }
}

fn absolute_path(key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if !value.starts_with('/') {
        return Err(FaultlineError::invalid_config(key, "must start with '/'"));
    }
    Ok(value.to_string())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_overrides() {
        let config = WebConfig::from_service(&ConfigService::new()).unwrap();
        assert_eq!(config, WebConfig::default());
        assert_eq!(config.error_path, "/error");
        assert_eq!(config.interceptor_exclude.len(), 4);
    }

    #[test]
    fn test_overrides() {
        let service = ConfigService::new();
        service.set(ERROR_PATH_KEY, "/oops");
        service.set(API_BASE_PATH_KEY, " /v1 ");
        service.set(INTERCEPTOR_EXCLUDE_KEY, "/oops, /static/** ,");
        service.set(FILTER_DISPATCH_TYPES_KEY, "request");
        service.set(INCLUDE_DETAILS_KEY, "true");

        let config = WebConfig::from_service(&service).unwrap();
        assert_eq!(config.error_path, "/oops");
        assert_eq!(config.api_base_path, "/v1");
        assert_eq!(config.interceptor_exclude, ["/oops", "/static/**"]);
        assert_eq!(config.filter_dispatch_types, [DispatchType::Request]);
        assert!(config.include_details);
    }

    #[test]
    fn test_rejects_unknown_dispatch_type() {
        let service = ConfigService::new();
        service.set(FILTER_DISPATCH_TYPES_KEY, "REQUEST,ASYNC");

        let err = WebConfig::from_service(&service).unwrap_err();
        assert!(matches!(err, FaultlineError::InvalidConfig { ref key, .. } if key == FILTER_DISPATCH_TYPES_KEY));
    }

    #[test]
    fn test_rejects_relative_error_path() {
        let service = ConfigService::new();
        service.set(ERROR_PATH_KEY, "error");
        assert!(WebConfig::from_service(&service).is_err());
    }

    #[test]
    fn test_deserializes_partial_config() {
        let config: WebConfig =
            serde_json::from_str(r#"{"api_base_path":"/v2","filter_dispatch_types":["ERROR"]}"#)
                .unwrap();
        assert_eq!(config.api_base_path, "/v2");
        assert_eq!(config.filter_dispatch_types, [DispatchType::Error]);
        assert_eq!(config.error_path, "/error");
    }
}
