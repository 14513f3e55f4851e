//! Configuration management for the Imgbed server

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default request body limit for uploads: 20MB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set for an S3-compatible provider")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Body limit applied to the upload route
    pub max_upload_bytes: usize,
    /// Directory holding the built browser UI, if it should be served
    pub ui_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Minio,
    R2,
    S3,
    B2,
    /// Process-local store, nothing is persisted
    Memory,
}

impl StorageProvider {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "minio" => StorageProvider::Minio,
            "s3" => StorageProvider::S3,
            "b2" => StorageProvider::B2,
            "memory" => StorageProvider::Memory,
            _ => StorageProvider::R2,
        }
    }

    /// Region used when none is configured
    pub fn default_region(&self) -> &'static str {
        match self {
            StorageProvider::R2 => "auto",
            _ => "us-east-1",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared secret compared against the `Authorization` header.
    /// `None` means the deployment forgot to set one.
    pub token: Option<String>,
    /// Propagate delete failures instead of logging and reporting success
    pub strict_delete: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Public base URL used to build copy-friendly links
    pub copy_url: String,
}

impl SiteConfig {
    /// Absolute URL for a stored key
    pub fn copy_url_for(&self, key: &str) -> String {
        format!("{}/{}", self.copy_url.trim_end_matches('/'), key)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
                ui_dir: None,
            },
            storage: StorageConfig {
                provider: StorageProvider::Memory,
                endpoint: String::new(),
                bucket: "imgbed".to_string(),
                access_key: String::new(),
                secret_key: String::new(),
                region: None,
            },
            auth: AuthConfig {
                token: None,
                strict_delete: false,
            },
            site: SiteConfig {
                copy_url: String::new(),
            },
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value.
    ///
    /// The store connection variables are required unless the provider is
    /// `memory`; everything else has a default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let provider =
            StorageProvider::parse(&var("S3_PROVIDER").unwrap_or_else(|| "r2".to_string()));

        let storage = if provider == StorageProvider::Memory {
            StorageConfig {
                provider,
                endpoint: String::new(),
                bucket: var("S3_BUCKET").unwrap_or_else(|| "imgbed".to_string()),
                access_key: String::new(),
                secret_key: String::new(),
                region: None,
            }
        } else {
            StorageConfig {
                provider,
                endpoint: required("S3_ENDPOINT")?,
                bucket: required("S3_BUCKET")?,
                access_key: required("S3_ACCESS_KEY")?,
                secret_key: required("S3_SECRET_KEY")?,
                region: var("S3_REGION"),
            }
        };

        Ok(Config {
            server: ServerConfig {
                host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: var("SERVER_PORT")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3000),
                max_upload_bytes: var("MAX_UPLOAD_BYTES")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
                ui_dir: var("UI_DIR").map(PathBuf::from),
            },
            storage,
            auth: AuthConfig {
                token: var("AUTH_TOKEN"),
                strict_delete: var("STRICT_DELETE")
                    .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                    .unwrap_or(false),
            },
            site: SiteConfig {
                copy_url: var("COPY_URL").unwrap_or_default(),
            },
        })
    }

    /// Same as `default()` but with an auth token, handy for tests and local runs
    pub fn with_token(token: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.auth.token = Some(token.into());
        config
    }
}
