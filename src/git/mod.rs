//! Git operations using git2-rs.

pub mod commits;
pub mod diff;
pub mod source;

pub use commits::{CommitRecord, estimate_tokens};
pub use diff::summarize_commit_diff;
pub use source::{CommitSource, GitCommitSource};
