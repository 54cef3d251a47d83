//! End-to-end analysis: fetch, batch, classify, aggregate.

use std::num::NonZeroUsize;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::git::CommitSource;
use crate::llm::LanguageModel;
use crate::report::Report;

use super::aggregator::{BatchOutcome, aggregate_outcomes};
use super::batcher::{Batch, BatchLimits, batch_commits};
use super::classifier::Classifier;

/// Default pause between consecutive calls when running sequentially.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(1);

/// Which commits to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Author pattern matched against `Name <email>`.
    pub author: String,
    pub max_commits: Option<usize>,
}

impl AnalysisRequest {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            max_commits: None,
        }
    }

    pub fn with_max_commits(mut self, max_commits: usize) -> Self {
        self.max_commits = Some(max_commits);
        self
    }
}

/// How batches are formed and scheduled.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub limits: BatchLimits,
    /// Maximum batches in flight. `1` runs sequentially.
    pub jobs: NonZeroUsize,
    /// Pause before each batch after the first, sequential mode only.
    pub batch_delay: Duration,
    /// Wall-clock budget for all model calls.
    pub deadline: Option<Duration>,
    /// Print per-batch progress lines to stderr.
    pub progress: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            limits: BatchLimits::default(),
            jobs: NonZeroUsize::MIN,
            batch_delay: DEFAULT_BATCH_DELAY,
            deadline: None,
            progress: false,
        }
    }
}

/// Analyze an author's commits and build the report.
///
/// Source errors are fatal. Model errors are recorded per batch and never
/// abort the run; check [`Report::is_total_failure`] for the all-failed case.
pub async fn analyze_author<M>(
    source: &dyn CommitSource,
    model: &M,
    request: &AnalysisRequest,
    settings: &PipelineSettings,
) -> Result<Report, SourceError>
where
    M: LanguageModel + ?Sized,
{
    let commits = source.commits(&request.author, request.max_commits)?;
    info!("Fetched {} commits for '{}'", commits.len(), request.author);

    let batches = batch_commits(&commits, &settings.limits);
    if settings.progress && !batches.is_empty() {
        eprintln!(
            "Analyzing {} commits in {} batch(es)...",
            commits.len(),
            batches.len()
        );
    }

    let outcomes = classify_batches(model, &batches, settings).await;
    Ok(aggregate_outcomes(
        &request.author,
        commits.len(),
        &batches,
        outcomes,
    ))
}

/// Classify batches with at most `settings.jobs` in flight.
///
/// Outcomes come back in batch order. Once the deadline passes, unstarted
/// batches are not sent and in-flight calls are dropped; both are
/// reported as [`BatchOutcome::Cancelled`].
pub async fn classify_batches<M>(
    model: &M,
    batches: &[Batch<'_>],
    settings: &PipelineSettings,
) -> Vec<BatchOutcome>
where
    M: LanguageModel + ?Sized,
{
    let classifier = Classifier::new(model);
    let classifier = &classifier;
    let deadline = settings.deadline.and_then(|budget| {
        let at = Instant::now().checked_add(budget);
        if at.is_none() {
            debug!("Deadline of {:?} is out of range; running without one", budget);
        }
        at
    });
    let sequential = settings.jobs.get() == 1;
    let total = batches.len();

    stream::iter(batches.iter().enumerate())
        .map(|(position, batch)| async move {
            if deadline.is_some_and(|at| Instant::now() >= at) {
                debug!("Deadline passed before batch {} started", batch.index);
                return BatchOutcome::Cancelled;
            }

            let work = async {
                if sequential && position > 0 && !settings.batch_delay.is_zero() {
                    sleep(settings.batch_delay).await;
                }
                if settings.progress {
                    eprintln!(
                        "  batch {}/{} ({} commits)",
                        batch.index,
                        total,
                        batch.len()
                    );
                }
                classifier.classify(batch).await
            };

            let outcome = match deadline {
                Some(at) => match timeout_at(at, work).await {
                    Ok(result) => BatchOutcome::from(result),
                    Err(_) => {
                        debug!("Deadline passed while batch {} was in flight", batch.index);
                        BatchOutcome::Cancelled
                    }
                },
                None => BatchOutcome::from(work.await),
            };

            if let BatchOutcome::Failed(err) = &outcome {
                warn!("Batch {}/{} failed: {}", batch.index, total, err);
            }
            outcome
        })
        .buffered(settings.jobs.get())
        .collect()
        .await
}
