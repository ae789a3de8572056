//! Client configuration parsed from environment variables.

use crate::gateway::{GatewayError, RetrievalStrategy, AUTO_LANGUAGE};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LANGUAGE: &str = AUTO_LANGUAGE;
pub const DEFAULT_NO_ANSWER_MESSAGE: &str =
    "Sorry, no answer was found in the available documents.";
pub const DEFAULT_FAILURE_PREFIX: &str = "Sorry, something went wrong:";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidDuration { var: &'static str, value: String },
    #[error("{var} must be true or false, got {value:?}")]
    InvalidBool { var: &'static str, value: String },
    #[error("{var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

/// User-visible strings the core puts into the transcript.
///
/// Kept out of the code so they can be localised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    /// Shown when the service answers without an `answer` field
    pub no_answer: String,
    /// Prepended to the diagnostic of a failed request
    pub failure_prefix: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            no_answer: DEFAULT_NO_ANSWER_MESSAGE.to_string(),
            failure_prefix: DEFAULT_FAILURE_PREFIX.to_string(),
        }
    }
}

impl Messages {
    pub fn failure_text(&self, error: &GatewayError) -> String {
        format!("{} {}", self.failure_prefix, error.diagnostic())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub query_timeout: Duration,
    pub health_timeout: Duration,
    pub connect_timeout: Duration,
    pub retrieval_strategy: RetrievalStrategy,
    pub use_conversation: bool,
    pub language: String,
    pub messages: Messages,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
            health_timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            retrieval_strategy: RetrievalStrategy::default(),
            use_conversation: true,
            language: DEFAULT_LANGUAGE.to_string(),
            messages: Messages::default(),
        }
    }
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `RAGCHAT_BASE_URL`: default `http://localhost:8000`
    /// - `RAGCHAT_QUERY_TIMEOUT_SECS`: default 60
    /// - `RAGCHAT_HEALTH_TIMEOUT_SECS`: default 5
    /// - `RAGCHAT_CONNECT_TIMEOUT_SECS`: default 10
    /// - `RAGCHAT_RETRIEVAL_STRATEGY`: `semantic`, `keyword`, `hybrid` (default) or `mmr`
    /// - `RAGCHAT_USE_CONVERSATION`: default true
    /// - `RAGCHAT_LANGUAGE`: default `auto`
    /// - `RAGCHAT_NO_ANSWER_MESSAGE`, `RAGCHAT_FAILURE_PREFIX`: transcript strings
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("RAGCHAT_BASE_URL")
            .map_or(defaults.base_url, |v| v.trim().trim_end_matches('/').to_string());
        if base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "RAGCHAT_BASE_URL",
                reason: "must not be empty".to_string(),
            });
        }

        let retrieval_strategy = match lookup("RAGCHAT_RETRIEVAL_STRATEGY") {
            Some(raw) => {
                raw.parse::<RetrievalStrategy>()
                    .map_err(|reason| ConfigError::InvalidValue {
                        var: "RAGCHAT_RETRIEVAL_STRATEGY",
                        reason,
                    })?
            }
            None => defaults.retrieval_strategy,
        };

        Ok(Self {
            base_url,
            query_timeout: parse_secs(
                &lookup,
                "RAGCHAT_QUERY_TIMEOUT_SECS",
                defaults.query_timeout,
            )?,
            health_timeout: parse_secs(
                &lookup,
                "RAGCHAT_HEALTH_TIMEOUT_SECS",
                defaults.health_timeout,
            )?,
            connect_timeout: parse_secs(
                &lookup,
                "RAGCHAT_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout,
            )?,
            retrieval_strategy,
            use_conversation: parse_bool(
                &lookup,
                "RAGCHAT_USE_CONVERSATION",
                defaults.use_conversation,
            )?,
            language: lookup("RAGCHAT_LANGUAGE").unwrap_or(defaults.language),
            messages: Messages {
                no_answer: lookup("RAGCHAT_NO_ANSWER_MESSAGE")
                    .unwrap_or(defaults.messages.no_answer),
                failure_prefix: lookup("RAGCHAT_FAILURE_PREFIX")
                    .unwrap_or(defaults.messages.failure_prefix),
            },
        })
    }
}

fn parse_secs<F>(lookup: &F, var: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::InvalidDuration { var, value: raw }),
        },
    }
}

fn parse_bool<F>(lookup: &F, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBool { var, value: raw }),
        },
    }
}
