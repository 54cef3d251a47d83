//! Merging per-batch results into a single report.

use crate::error::ModelError;
use crate::report::{BatchFailure, CategoryMap, Report, RunMetadata};

use super::batcher::Batch;

/// What happened to one batch.
#[derive(Debug)]
pub enum BatchOutcome {
    Classified(CategoryMap),
    Failed(ModelError),
    /// Dropped because the run deadline passed.
    Cancelled,
}

impl From<Result<CategoryMap, ModelError>> for BatchOutcome {
    fn from(result: Result<CategoryMap, ModelError>) -> Self {
        match result {
            Ok(map) => BatchOutcome::Classified(map),
            Err(e) => BatchOutcome::Failed(e),
        }
    }
}

/// Concatenate bullets category by category, in map order.
///
/// No sorting and no de-duplication. An empty slice yields an empty map.
pub fn aggregate(maps: &[CategoryMap]) -> CategoryMap {
    maps.iter().fold(CategoryMap::new(), |mut merged, map| {
        merged.extend_from(map);
        merged
    })
}

/// Build the final report from batch outcomes.
///
/// `outcomes` must be in the same order as `batches`.
pub fn aggregate_outcomes(
    author: &str,
    total_commits: usize,
    batches: &[Batch<'_>],
    outcomes: Vec<BatchOutcome>,
) -> Report {
    let mut classified = Vec::new();
    let mut metadata = RunMetadata {
        total_commits,
        batch_count: batches.len(),
        ..Default::default()
    };

    for (batch, outcome) in batches.iter().zip(outcomes) {
        match outcome {
            BatchOutcome::Classified(map) => classified.push(map),
            BatchOutcome::Failed(err) => metadata.failed_batches.push(BatchFailure {
                batch: batch.index,
                commits: batch.len(),
                reason: err.summary(),
            }),
            BatchOutcome::Cancelled => metadata.cancelled_batches.push(batch.index),
        }
    }
    metadata.classified_batches = classified.len();

    Report {
        author: author.to_string(),
        categories: aggregate(&classified),
        metadata,
    }
}
