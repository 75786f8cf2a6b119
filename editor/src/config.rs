//! Endpoint configuration.
//!
//! Defaults point at a local dev server. Environment variables (a `.env` file
//! is honoured by the binary) override the defaults, and explicit values
//! passed by the CLI override both.

use reqwest::Url;
use std::env;

use crate::error::ConfigError;

/// Base URL of the export backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Path of the form snapshot collection.
pub const FORM_DATA_PATH: &str = "/api/forms";

/// Path of the export definition collection.
pub const EXPORT_DEFINITION_PATH: &str = "/api/export-definitions";

pub const ENV_BASE_URL: &str = "FORMEXPORT_BASE_URL";
pub const ENV_FORM_DATA_ENDPOINT: &str = "FORMEXPORT_FORM_DATA_ENDPOINT";
pub const ENV_EXPORT_DEFINITION_ENDPOINT: &str = "FORMEXPORT_EXPORT_DEFINITION_ENDPOINT";

/// Resolved REST endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub form_data_endpoint: String,
    pub export_definition_endpoint: String,
}

impl EditorConfig {
    /// Both endpoints under `base_url`.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let base = base_url.trim_end_matches('/');
        let config = Self {
            form_data_endpoint: format!("{}{}", base, FORM_DATA_PATH),
            export_definition_endpoint: format!("{}{}", base, EXPORT_DEFINITION_PATH),
        };
        config.validate()?;
        Ok(config)
    }

    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve from the process environment, with `base_url` taking precedence
    /// over `FORMEXPORT_BASE_URL`.
    pub fn from_env_with_base(base_url: Option<&str>) -> Result<Self, ConfigError> {
        match base_url {
            Some(base) => Self::from_lookup(|name| {
                if name == ENV_BASE_URL {
                    Some(base.to_string())
                } else {
                    env::var(name).ok()
                }
            }),
            None => Self::from_env(),
        }
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base = lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::with_base_url(&base)?;

        if let Some(endpoint) = lookup(ENV_FORM_DATA_ENDPOINT) {
            config.form_data_endpoint = endpoint;
        }
        if let Some(endpoint) = lookup(ENV_EXPORT_DEFINITION_ENDPOINT) {
            config.export_definition_endpoint = endpoint;
        }
        config.validate()?;
        Ok(config)
    }

    /// `{export_definition_endpoint}/{id}`
    pub fn definition_url(&self, id: &str) -> String {
        format!("{}/{}", self.export_definition_endpoint.trim_end_matches('/'), id)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_url("form data endpoint", &self.form_data_endpoint)?;
        check_url("export definition endpoint", &self.export_definition_endpoint)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            form_data_endpoint: format!("{}{}", DEFAULT_BASE_URL, FORM_DATA_PATH),
            export_definition_endpoint: format!("{}{}", DEFAULT_BASE_URL, EXPORT_DEFINITION_PATH),
        }
    }
}

fn check_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value).map(|_| ()).map_err(|_| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EditorConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.form_data_endpoint, "http://localhost:3000/api/forms");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = EditorConfig::with_base_url("https://example.org/").unwrap();
        assert_eq!(
            config.definition_url("abc"),
            "https://example.org/api/export-definitions/abc"
        );
    }

    #[test]
    fn test_explicit_endpoint_overrides_base() {
        let config = EditorConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "http://backend:8080"),
            (ENV_FORM_DATA_ENDPOINT, "http://forms:9000/data"),
        ]))
        .unwrap();

        assert_eq!(config.form_data_endpoint, "http://forms:9000/data");
        assert_eq!(
            config.export_definition_endpoint,
            "http://backend:8080/api/export-definitions"
        );
    }

    #[test]
    fn test_invalid_url() {
        let err = EditorConfig::with_base_url("not a url").unwrap_err();
        assert!(err.to_string().contains("not a url"));
    }
}
