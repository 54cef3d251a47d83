//! Opt-in exponential backoff around a language model.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::warn;

use crate::error::ModelError;

use super::client::LanguageModel;

const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// Retry an async operation with exponential backoff (base 1s, max 30s).
///
/// `attempt` is called up to `max_attempts` times, stopping early when
/// `should_retry` rejects an error. If more than one attempt was made, the
/// last error is passed through `wrap_exhausted`.
pub async fn retry_with_backoff<T, E, Fut, F, R, W>(
    max_attempts: u32,
    mut attempt: F,
    should_retry: R,
    wrap_exhausted: W,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    W: FnOnce(E) -> E,
{
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    };

    let max_attempts = max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;

        let err = match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if attempts >= max_attempts || !should_retry(&err) {
            return Err(if attempts > 1 { wrap_exhausted(err) } else { err });
        }

        if let Some(wait_duration) = backoff.next_backoff() {
            tokio::time::sleep(wait_duration).await;
        }
    }
}

/// Wraps a model so each completion is attempted up to `max_attempts` times.
pub struct RetryingModel<M> {
    inner: M,
    max_attempts: u32,
}

impl<M: LanguageModel> RetryingModel<M> {
    pub fn new(inner: M, max_attempts: u32) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
        }
    }
}

#[async_trait]
impl<M: LanguageModel> LanguageModel for RetryingModel<M> {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        retry_with_backoff(
            self.max_attempts,
            || async {
                self.inner.complete(prompt).await.inspect_err(|e| {
                    warn!("Language model call failed: {}", e.summary());
                })
            },
            ModelError::is_retryable,
            |e| ModelError::RetriesExhausted(Box::new(e)),
        )
        .await
    }
}
