//! Configuration for the aircast radio daemon
//!
//! Bootstrap configuration is loaded from a TOML file; individual values
//! can be overridden by environment variables, and the HTTP port also by a
//! command-line flag. All fields have built-in defaults so the daemon
//! starts against a local MinIO with no config file at all.
//!
//! Priority: command-line arguments > environment variables > TOML file >
//! built-in defaults.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level daemon configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the SQLite track metadata database
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Object storage (S3 / MinIO) settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Transport stream settings
    #[serde(default)]
    pub stream: StreamConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Object storage settings
///
/// Defaults target a local MinIO instance, matching the development setup
/// the service is normally deployed against.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Custom S3 endpoint (MinIO); `None` uses the AWS default resolver
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: Option<String>,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_access_key")]
    pub access_key_id: String,

    #[serde(default = "default_secret_key")]
    pub secret_access_key: String,

    /// Bucket holding the playable audio objects
    #[serde(default = "default_media_bucket")]
    pub media_bucket: String,

    /// Bucket holding cover images (publicly readable)
    #[serde(default = "default_cover_bucket")]
    pub cover_bucket: String,

    /// Base URL prepended to cover names that are not absolute URLs
    #[serde(default = "default_cover_public_url")]
    pub cover_public_url: String,
}

/// Transport stream settings
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Destination host for the RTP stream
    #[serde(default = "default_stream_host")]
    pub host: String,

    /// Destination UDP port for the RTP stream
    #[serde(default = "default_stream_port")]
    pub port: u16,

    /// Bytes pushed into the pipeline per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Seconds to wait between catalog retries while the bucket is empty
    #[serde(default = "default_idle_poll_secs")]
    pub idle_poll_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_port() -> u16 {
    8090
}

fn default_database_path() -> PathBuf {
    PathBuf::from("aircast.db")
}

fn default_endpoint_url() -> Option<String> {
    Some("http://localhost:9000".to_string())
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_access_key() -> String {
    "minioadmin".to_string()
}

fn default_secret_key() -> String {
    "minioadmin".to_string()
}

fn default_media_bucket() -> String {
    "media".to_string()
}

fn default_cover_bucket() -> String {
    "image".to_string()
}

fn default_cover_public_url() -> String {
    "http://localhost:9000/image".to_string()
}

fn default_stream_host() -> String {
    "127.0.0.1".to_string()
}

fn default_stream_port() -> u16 {
    5004
}

fn default_chunk_size() -> usize {
    4096
}

fn default_idle_poll_secs() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        // An empty TOML document deserializes to all defaults
        toml::from_str("").expect("default config must deserialize")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        toml::from_str("").expect("default storage config must deserialize")
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        toml::from_str("").expect("default stream config must deserialize")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        toml::from_str("").expect("default logging config must deserialize")
    }
}

impl Config {
    /// Load configuration from an optional TOML file, then apply
    /// environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                toml::from_str(&raw)
                    .map_err(|e| Error::Config(format!("invalid {}: {}", path.display(), e)))?
            }
            None => Config::default(),
        };
        config.apply_env_overrides();
        config.storage.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("AIRCAST_S3_ENDPOINT") {
            self.storage.endpoint_url = Some(endpoint);
        }
        if let Ok(key) = std::env::var("AIRCAST_S3_ACCESS_KEY") {
            self.storage.access_key_id = key;
        }
        if let Ok(secret) = std::env::var("AIRCAST_S3_SECRET_KEY") {
            self.storage.secret_access_key = secret;
        }
        if let Ok(bucket) = std::env::var("AIRCAST_MEDIA_BUCKET") {
            self.storage.media_bucket = bucket;
        }
    }
}

impl StorageConfig {
    /// Reject configurations that cannot possibly reach a bucket
    pub fn validate(&self) -> Result<()> {
        if self.media_bucket.trim().is_empty() {
            return Err(Error::Config("media bucket cannot be empty".to_string()));
        }
        if self.region.trim().is_empty() {
            return Err(Error::Config("region cannot be empty".to_string()));
        }
        if self.access_key_id.trim().is_empty() {
            return Err(Error::Config("access key ID cannot be empty".to_string()));
        }
        if self.secret_access_key.trim().is_empty() {
            return Err(Error::Config("secret access key cannot be empty".to_string()));
        }
        Ok(())
    }
}
