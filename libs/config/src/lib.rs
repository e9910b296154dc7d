//! # EIS Gateway Configuration
//!
//! Centralized configuration for the gateway services: endpoint locations,
//! per-endpoint call timeouts, and the PROD/TEST mode flag carried in
//! every index header.
//!
//! Configuration is loaded from TOML with `${VAR}` environment expansion,
//! so deployment-specific endpoints stay out of the repository. Missing
//! sections fall back to the constants in [`defaults`].

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default configuration values per endpoint family.
pub mod defaults {
    /// EIS document-storage endpoint defaults
    pub mod eis {
        /// Document-storage SOAP endpoint
        pub const ENDPOINT: &str = "http://192.168.5.243:8080/eis-integration/services/getDocsLE";
        /// Per-call timeout (milliseconds)
        pub const CALL_TIMEOUT_MS: u64 = 30_000;
    }

    /// Supplier personal-cabinet endpoint defaults
    pub mod elact {
        /// Per-call timeout (milliseconds)
        pub const CALL_TIMEOUT_MS: u64 = 30_000;
    }

    /// Upload-channel endpoint defaults
    pub mod upload {
        /// Packet upload SOAP endpoint
        pub const ENDPOINT: &str =
            "https://int44.zakupki.gov.ru/eis-integration/elact/supplier-upload";
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Environment expansion referenced an unset variable
    #[error("environment expansion failed: {0}")]
    Env(String),

    /// TOML content did not match the expected schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One endpoint family: location plus call timeout.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EndpointConfig {
    /// SOAP endpoint URL
    pub endpoint: String,
    /// Per-call timeout in milliseconds; `None` disables the timeout,
    /// used for slow bulk extractions
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl EndpointConfig {
    /// Per-call timeout as a duration.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Full gateway configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GatewayConfig {
    /// When set, index headers carry mode TEST instead of PROD
    #[serde(default)]
    pub test_mode: bool,
    /// EIS document-storage endpoint
    #[serde(default = "default_eis")]
    pub eis: EndpointConfig,
    /// Supplier personal-cabinet endpoint
    pub elact: EndpointConfig,
    /// Packet upload endpoint
    #[serde(default = "default_upload")]
    pub upload: EndpointConfig,
}

fn default_eis() -> EndpointConfig {
    EndpointConfig {
        endpoint: defaults::eis::ENDPOINT.to_string(),
        timeout_ms: Some(defaults::eis::CALL_TIMEOUT_MS),
    }
}

fn default_upload() -> EndpointConfig {
    EndpointConfig {
        endpoint: defaults::upload::ENDPOINT.to_string(),
        timeout_ms: None,
    }
}

/// Load configuration from a TOML file, expanding `${VAR}` references
/// from the environment first.
pub fn load_config(path: impl AsRef<Path>) -> Result<GatewayConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let expanded = shellexpand::env(&raw).map_err(|err| ConfigError::Env(err.to_string()))?;
    Ok(toml::from_str(&expanded)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_with_defaults_for_missing_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[elact]\nendpoint = \"https://lkp.example/docs\"\ntimeout_ms = 5000"
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(!config.test_mode);
        assert_eq!(config.elact.endpoint, "https://lkp.example/docs");
        assert_eq!(config.elact.timeout(), Some(Duration::from_millis(5000)));
        assert_eq!(config.eis, default_eis());
        assert_eq!(config.upload.timeout_ms, None);
    }

    #[test]
    fn expands_environment_references() {
        std::env::set_var("GATEWAY_TEST_ELACT", "https://env.example/docs");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "test_mode = true\n[elact]\nendpoint = \"${{GATEWAY_TEST_ELACT}}\""
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(config.test_mode);
        assert_eq!(config.elact.endpoint, "https://env.example/docs");
    }

    #[test]
    fn unset_variable_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[elact]\nendpoint = \"${{GATEWAY_SURELY_UNSET_VAR}}\""
        )
        .unwrap();
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Env(_))
        ));
    }
}
