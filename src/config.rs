//! Environment-driven configuration for the language model client.

use std::env;
use std::fmt;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

/// Environment variable holding the bearer credential.
pub const CREDENTIAL_ENV_VAR: &str = "GROQ_API_KEY";

/// Environment variable to override the default request timeout.
pub const TIMEOUT_ENV_VAR: &str = "GAUTHOR_TIMEOUT";

/// Default timeout for a single completion request (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// A bearer token. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Settings for the chat-completions client.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub credential: Credential,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ModelConfig {
    /// Build a config with defaults around an explicit credential.
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            max_tokens: 2000,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load the credential and timeout from the process environment.
    ///
    /// Fails with [`ConfigError::MissingCredential`] when `GROQ_API_KEY` is
    /// unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let credential = match env::var(CREDENTIAL_ENV_VAR) {
            Ok(v) if !v.trim().is_empty() => Credential::new(v.trim()),
            _ => return Err(ConfigError::MissingCredential(CREDENTIAL_ENV_VAR)),
        };

        let mut config = Self::new(credential);
        config.timeout = get_timeout();
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Get the configured request timeout.
///
/// Reads from GAUTHOR_TIMEOUT if set, otherwise uses the default of 120
/// seconds. Logs a warning if the variable is set but invalid.
fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}
