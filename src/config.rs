use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

use crate::processing::PipelineSettings;

const DEFAULT_SUMMARIZATION_MODEL: &str = "llama3.2";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Docdigest server and CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Backend used to summarize each chunk.
    pub summarization_provider: SummarizationProvider,
    /// Optional Ollama base URL (defaults to the local runtime).
    pub ollama_url: Option<String>,
    /// Model identifier passed to the summarization provider.
    pub summarization_model: String,
    /// Lower word bound requested for every part summary.
    pub summary_min_words: usize,
    /// Upper word bound requested for every part summary.
    pub summary_max_words: usize,
    /// Approximate word budget of a single chunk.
    pub chunk_max_tokens: usize,
    /// Timeout applied to each summarization call.
    pub summarization_timeout_secs: u64,
    /// Maximum number of summarization calls in flight per request.
    pub summarization_concurrency: usize,
    /// Directory receiving uploaded source files.
    pub upload_dir: PathBuf,
    /// Directory receiving rendered summary documents.
    pub output_dir: PathBuf,
    /// Browser origin allowed to call the HTTP API.
    pub cors_allowed_origin: String,
    /// Upper bound on the size of an uploaded request body.
    pub max_upload_bytes: usize,
}

/// Supported summarization backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizationProvider {
    /// Local Ollama runtime.
    Ollama,
    /// Deterministic leading-sentence summaries; no model required.
    Extractive,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            server_port: parse_optional("SERVER_PORT")?,
            summarization_provider: load_env_optional("SUMMARIZATION_PROVIDER")
                .map(|value| {
                    value.parse().map_err(|()| {
                        ConfigError::InvalidValue("SUMMARIZATION_PROVIDER".to_string())
                    })
                })
                .transpose()?
                .unwrap_or(SummarizationProvider::Ollama),
            ollama_url: load_env_optional("OLLAMA_URL"),
            summarization_model: load_env_optional("SUMMARIZATION_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARIZATION_MODEL.to_string()),
            summary_min_words: parse_optional("SUMMARY_MIN_WORDS")?.unwrap_or(100),
            summary_max_words: parse_optional("SUMMARY_MAX_WORDS")?.unwrap_or(512),
            chunk_max_tokens: parse_optional("CHUNK_MAX_TOKENS")?
                .unwrap_or(crate::processing::chunking::DEFAULT_MAX_TOKENS),
            summarization_timeout_secs: parse_optional("SUMMARIZATION_TIMEOUT_SECS")?
                .unwrap_or(120),
            summarization_concurrency: parse_optional("SUMMARIZATION_CONCURRENCY")?.unwrap_or(4),
            upload_dir: load_env_optional("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            output_dir: load_env_optional("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("outputs")),
            cors_allowed_origin: load_env_optional("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            max_upload_bytes: parse_optional("MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_max_tokens == 0 {
            return Err(ConfigError::InvalidValue("CHUNK_MAX_TOKENS".into()));
        }
        if self.summarization_concurrency == 0 {
            return Err(ConfigError::InvalidValue("SUMMARIZATION_CONCURRENCY".into()));
        }
        if self.summary_min_words > self.summary_max_words {
            return Err(ConfigError::InvalidValue("SUMMARY_MIN_WORDS".into()));
        }
        Ok(())
    }

    /// Derive the settings injected into the summary pipeline.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            chunk_max_tokens: self.chunk_max_tokens,
            summary_min_words: self.summary_min_words,
            summary_max_words: self.summary_max_words,
            summarization_model: self.summarization_model.clone(),
            summarization_timeout: Duration::from_secs(self.summarization_timeout_secs),
            summarization_concurrency: self.summarization_concurrency,
        }
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for SummarizationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "extractive" => Ok(Self::Extractive),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        server_port = ?config.server_port,
        provider = ?config.summarization_provider,
        model = %config.summarization_model,
        chunk_max_tokens = config.chunk_max_tokens,
        upload_dir = %config.upload_dir.display(),
        output_dir = %config.output_dir.display(),
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!(
            "Ollama".parse::<SummarizationProvider>(),
            Ok(SummarizationProvider::Ollama)
        );
        assert_eq!(
            " extractive ".parse::<SummarizationProvider>(),
            Ok(SummarizationProvider::Extractive)
        );
        assert!("bart".parse::<SummarizationProvider>().is_err());
    }

    #[test]
    fn validate_rejects_inverted_word_bounds() {
        let config = Config {
            server_port: None,
            summarization_provider: SummarizationProvider::Extractive,
            ollama_url: None,
            summarization_model: "m".into(),
            summary_min_words: 600,
            summary_max_words: 512,
            chunk_max_tokens: 900,
            summarization_timeout_secs: 1,
            summarization_concurrency: 1,
            upload_dir: "uploads".into(),
            output_dir: "outputs".into(),
            cors_allowed_origin: DEFAULT_CORS_ORIGIN.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(key)) if key == "SUMMARY_MIN_WORDS"
        ));
    }
}
