use crate::processing::IngestLimits;
use std::{env, path::PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit log file.
pub const LOG_FILE_ENV: &str = "LEXINGEST_LOG_FILE";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the ingestion server.
///
/// Loaded once at startup and handed to the components that need it; nothing reads it from a
/// global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Maximum accepted upload size in bytes.
    pub max_file_size: usize,
    /// Maximum extracted text length in characters.
    pub max_text_length: usize,
    /// Character budget per chunk.
    pub chunk_size: usize,
    /// Log file override; the default location is used when unset.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let limits = IngestLimits::default();
        Self {
            server_port: None,
            max_file_size: limits.max_file_size,
            max_text_length: limits.max_text_length,
            chunk_size: limits.chunk_size,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let chunk_size = parse_optional(&optional, "INGEST_CHUNK_SIZE")?
            .unwrap_or(defaults.chunk_size);
        if chunk_size == 0 {
            return Err(ConfigError::InvalidValue("INGEST_CHUNK_SIZE".into()));
        }

        Ok(Self {
            server_port: parse_optional(&optional, "SERVER_PORT")?,
            max_file_size: parse_optional(&optional, "INGEST_MAX_FILE_SIZE")?
                .unwrap_or(defaults.max_file_size),
            max_text_length: parse_optional(&optional, "INGEST_MAX_TEXT_LENGTH")?
                .unwrap_or(defaults.max_text_length),
            chunk_size,
            log_file: optional(LOG_FILE_ENV).map(PathBuf::from),
        })
    }

    /// Pipeline limits derived from this configuration.
    pub fn limits(&self) -> IngestLimits {
        IngestLimits {
            max_file_size: self.max_file_size,
            max_text_length: self.max_text_length,
            chunk_size: self.chunk_size,
        }
    }
}

fn parse_optional<T, F>(optional: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Load `.env` (if present) and the environment into a [`Config`].
///
/// Call this before installing a tracing subscriber: `RUST_LOG` and the log file location may
/// come from `.env`.
pub fn load() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    Config::from_env()
}
