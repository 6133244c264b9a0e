use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Failures while loading or validating the startup configuration.
///
/// Any of these is fatal: the service refuses to start without a complete,
/// valid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid public endpoint {endpoint:?}: {source}")]
    PublicEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}

/// Connection settings for the backing bucket.
#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    /// Storage API endpoint the service lists and reads through.
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
}

/// Immutable service configuration, loaded once at startup and passed to
/// constructors explicitly.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    /// Public endpoint that file download redirects point at; the bucket
    /// name is appended to form the base URL.
    pub public_endpoint: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// File name recognized as folder meta content.
    #[serde(default = "default_meta_filename")]
    pub meta_filename: String,
    /// Wall-clock seconds between full index rebuilds.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Config {
    /// Loads the configuration from a JSON file and validates the public
    /// endpoint.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] when the file is missing, malformed, or the
    /// public endpoint is not a valid URL.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        config.public_base_url()?;

        Ok(config)
    }

    /// Base URL file downloads redirect to: public endpoint plus bucket.
    ///
    /// # Errors
    /// Returns [`ConfigError::PublicEndpoint`] when the endpoint does not
    /// parse as a URL.
    pub fn public_base_url(&self) -> Result<Url, ConfigError> {
        let joined = format!(
            "{}/{}",
            self.public_endpoint.trim_end_matches('/'),
            self.storage.bucket
        );
        Url::parse(&joined).map_err(|source| ConfigError::PublicEndpoint {
            endpoint: self.public_endpoint.clone(),
            source,
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_meta_filename() -> String {
    "meta.html".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    60
}
