//! Error types for gauthor modules using thiserror.

use thiserror::Error;

/// Errors raised while loading configuration, before any work starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set. Export your Groq API key, e.g. `export {0}=gsk_...`")]
    MissingCredential(&'static str),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Errors from reading commits out of the repository.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Repository has no commits (HEAD is unborn)")]
    NoHead,

    #[error("Failed to walk commit history: {0}")]
    Walk(#[source] git2::Error),

    #[error("Failed to read commit {hash}: {source}")]
    ReadCommit {
        hash: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to diff commit {hash}: {source}")]
    Diff {
        hash: String,
        #[source]
        source: git2::Error,
    },

    #[error("No commits found for author '{0}'")]
    UnknownAuthor(String),
}

/// Errors from a single language model call.
///
/// These are per-batch failures: the pipeline records them and moves on.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Request to language model failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Language model request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Language model rejected the credential (HTTP {0})")]
    Authentication(u16),

    #[error("Language model returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Language model returned an empty response")]
    EmptyResponse,

    #[error("Could not parse language model reply: {0}")]
    UnparseableReply(String),

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<ModelError>),
}

impl ModelError {
    /// Short, single-line description for report metadata.
    pub fn summary(&self) -> String {
        match self {
            ModelError::Request(_) => "network request failed".to_string(),
            ModelError::Timeout(secs) => format!("timed out after {}s", secs),
            ModelError::Authentication(code) => format!("authentication failed (HTTP {})", code),
            ModelError::Provider { status, .. } => format!("provider error (HTTP {})", status),
            ModelError::EmptyResponse => "empty response".to_string(),
            ModelError::UnparseableReply(_) => "unparseable reply".to_string(),
            ModelError::RetriesExhausted(inner) => {
                format!("{} (after retries)", inner.summary())
            }
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelError::Authentication(_) | ModelError::UnparseableReply(_) => false,
            ModelError::Provider { status, .. } => *status == 429 || *status >= 500,
            ModelError::RetriesExhausted(_) => false,
            ModelError::Request(_) | ModelError::Timeout(_) | ModelError::EmptyResponse => true,
        }
    }
}
