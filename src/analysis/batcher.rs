//! Token-bounded partitioning of commit records.

use std::num::NonZeroUsize;

use tracing::debug;

use crate::git::CommitRecord;

/// Default token budget per batch.
pub const DEFAULT_MAX_BATCH_TOKENS: NonZeroUsize = NonZeroUsize::new(8_000).unwrap();

/// Default cap on commits per batch.
pub const DEFAULT_MAX_BATCH_COMMITS: NonZeroUsize = NonZeroUsize::new(50).unwrap();

/// Size limits applied when forming batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub max_tokens: NonZeroUsize,
    pub max_commits: Option<NonZeroUsize>,
}

impl BatchLimits {
    /// Token budget only, no commit cap.
    pub fn tokens(max_tokens: NonZeroUsize) -> Self {
        Self {
            max_tokens,
            max_commits: None,
        }
    }

    pub fn with_max_commits(mut self, max_commits: NonZeroUsize) -> Self {
        self.max_commits = Some(max_commits);
        self
    }
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_BATCH_TOKENS,
            max_commits: Some(DEFAULT_MAX_BATCH_COMMITS),
        }
    }
}

/// A contiguous run of commits sent to the model in one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<'a> {
    /// 1-based position in the batch sequence.
    pub index: usize,
    pub commits: &'a [CommitRecord],
    pub estimated_tokens: usize,
}

impl Batch<'_> {
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// Partition `commits` into batches that respect `limits`, preserving order.
///
/// A commit is added to the current batch while the running token estimate
/// stays within `max_tokens` and the commit cap is not reached; otherwise
/// the batch is closed and a new one starts with that commit. A commit that
/// alone exceeds `max_tokens` ends up by itself in an oversized batch.
pub fn batch_commits<'a>(commits: &'a [CommitRecord], limits: &BatchLimits) -> Vec<Batch<'a>> {
    let max_tokens = limits.max_tokens.get();
    let max_commits = limits.max_commits.map_or(usize::MAX, NonZeroUsize::get);

    let mut batches = Vec::new();
    let mut start = 0;
    let mut current_tokens = 0;

    for (idx, commit) in commits.iter().enumerate() {
        let size = commit.estimated_tokens();
        let current_len = idx - start;

        if current_len > 0
            && (current_tokens + size > max_tokens || current_len >= max_commits)
        {
            batches.push(Batch {
                index: batches.len() + 1,
                commits: &commits[start..idx],
                estimated_tokens: current_tokens,
            });
            start = idx;
            current_tokens = 0;
        }

        if size > max_tokens {
            debug!(
                "Commit {} (~{} tokens) exceeds the {} token budget; placing it alone",
                commit.short_hash(),
                size,
                max_tokens
            );
        }

        current_tokens += size;
    }

    if start < commits.len() {
        batches.push(Batch {
            index: batches.len() + 1,
            commits: &commits[start..],
            estimated_tokens: current_tokens,
        });
    }

    batches
}
