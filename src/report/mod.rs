//! The aggregated contribution report and its rendering.

pub mod category;
pub mod render;

use serde::Serialize;

pub use category::{Category, CategoryMap};
pub use render::{render, render_json};

/// A batch whose classification failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    /// 1-based batch index.
    pub batch: usize,
    /// Number of commits the batch carried.
    pub commits: usize,
    pub reason: String,
}

/// What happened during a run, alongside the categorized content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunMetadata {
    pub total_commits: usize,
    pub batch_count: usize,
    pub classified_batches: usize,
    pub failed_batches: Vec<BatchFailure>,
    /// 1-based indices of batches dropped by the deadline.
    pub cancelled_batches: Vec<usize>,
}

/// Final output of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub author: String,
    pub categories: CategoryMap,
    pub metadata: RunMetadata,
}

impl Report {
    /// True when batches existed but none was classified.
    pub fn is_total_failure(&self) -> bool {
        self.metadata.batch_count > 0 && self.metadata.classified_batches == 0
    }

    /// True when some, but not all, batches failed or were cancelled.
    pub fn is_partial(&self) -> bool {
        self.metadata.classified_batches > 0
            && self.metadata.classified_batches < self.metadata.batch_count
    }
}
