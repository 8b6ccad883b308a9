use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BUCKET: &str = "photos-bucket-1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STATIC_DIR: &str = "static";

/// Settings for one album session. Built once at startup.
#[derive(Clone, Debug)]
pub struct AlbumConfig {
    pub api_base_url: Url,
    pub api_key: String,
    pub bucket: String,
    pub storage_base_url: String,
    pub request_timeout: Duration,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl AlbumConfig {
    /// Config with defaults for everything but the API location and key.
    pub fn new(api_base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            api_base_url,
            api_key: api_key.into(),
            bucket: DEFAULT_BUCKET.to_string(),
            storage_base_url: default_storage_base_url(DEFAULT_BUCKET),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = required_var("PHOTO_API_BASE_URL")?;
        let api_base_url = parse_http_url("PHOTO_API_BASE_URL", &api_base_url)?;
        let api_key = required_var("PHOTO_API_KEY")?;

        let bucket = optional_var("PHOTO_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string());
        let storage_base_url = match optional_var("PHOTO_STORAGE_URL") {
            Some(value) => {
                parse_http_url("PHOTO_STORAGE_URL", &value)?;
                value.trim().trim_end_matches('/').to_string()
            }
            None => default_storage_base_url(&bucket),
        };

        let timeout_secs = match optional_var("PHOTO_API_TIMEOUT_SECS") {
            Some(value) => parse_number("PHOTO_API_TIMEOUT_SECS", &value)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let port = match optional_var("ALBUM_PORT") {
            Some(value) => parse_number("ALBUM_PORT", &value)?,
            None => DEFAULT_PORT,
        };
        let static_dir = optional_var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        Ok(Self {
            api_base_url,
            api_key,
            bucket,
            storage_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            port,
            static_dir,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

pub fn default_storage_base_url(bucket: &str) -> String {
    format!("https://{bucket}.s3.amazonaws.com")
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    optional_var(name).ok_or(ConfigError::Missing(name))
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: raw.to_string(),
    })
}

pub fn parse_http_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let parsed = Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidUrl {
        name,
        reason: err.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(ConfigError::InvalidUrl {
            name,
            reason: format!("unsupported scheme {scheme}"),
        }),
    }
}
