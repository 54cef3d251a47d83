//! Commit records extracted from history.

use chrono::{DateTime, TimeZone, Utc};
use git2::{Commit, Repository};
use serde::Serialize;

use crate::error::SourceError;
use crate::llm::prompt::{sanitize_diff, sanitize_for_prompt};

use super::diff::summarize_commit_diff;

/// Rough characters-per-token ratio used for budget estimates.
pub const CHARS_PER_TOKEN: usize = 4;

/// Upper bound on diff text embedded per commit, whatever the source provides.
pub const MAX_PROMPT_DIFF_CHARS: usize = 4_000;

/// One commit's metadata and change summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRecord {
    pub hash: String,
    pub author: String,
    pub date: DateTime<Utc>,
    pub message: String,
    pub diff_summary: String,
}

impl CommitRecord {
    /// Create a CommitRecord from a git2 Commit, summarizing its diff.
    pub fn from_git2_commit(
        repo: &Repository,
        commit: &Commit,
        max_diff_chars: usize,
    ) -> Result<Self, SourceError> {
        let hash = commit.id().to_string();
        let signature = commit.author();
        let author = format!(
            "{} <{}>",
            signature.name().unwrap_or(""),
            signature.email().unwrap_or("")
        );
        let date = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_else(Utc::now);
        let message = commit.message().unwrap_or("").trim_end().to_string();

        let diff_summary = summarize_commit_diff(repo, commit, max_diff_chars)
            .map_err(|source| SourceError::Diff {
                hash: hash.clone(),
                source,
            })?;

        Ok(Self {
            hash,
            author,
            date,
            message,
            diff_summary,
        })
    }

    /// Abbreviated hash for display.
    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }

    /// First line of the message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// The text block this record contributes to a classification prompt.
    pub fn serialized(&self) -> String {
        let message = sanitize_for_prompt(self.message.trim());
        let diff = sanitize_diff(&self.diff_summary, MAX_PROMPT_DIFF_CHARS);

        format!(
            "### commit {} ({})\n{}\n\nChanges:\n{}\n",
            self.short_hash(),
            self.date.format("%Y-%m-%d"),
            message,
            if diff.trim().is_empty() { "(no diff)" } else { diff.trim_end() }
        )
    }

    /// Estimated token cost of [`CommitRecord::serialized`].
    pub fn estimated_tokens(&self) -> usize {
        estimate_tokens(&self.serialized())
    }
}

/// Estimate tokens for a piece of text (1 token ~ 4 characters, rounded up).
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}
