//! The commit source boundary and its git2 implementation.

use std::path::Path;

use git2::{ErrorCode, Repository, Sort};
use tracing::debug;

use crate::error::SourceError;

use super::commits::CommitRecord;
use super::diff::DEFAULT_MAX_DIFF_CHARS;

/// Yields an author's commits, newest first.
pub trait CommitSource {
    /// Return up to `max_commits` commits whose author matches `author`.
    fn commits(
        &self,
        author: &str,
        max_commits: Option<usize>,
    ) -> Result<Vec<CommitRecord>, SourceError>;
}

/// Reads commits from a local git repository.
pub struct GitCommitSource {
    repo: Repository,
    max_diff_chars: usize,
}

impl GitCommitSource {
    /// Open the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let repo = Repository::discover(path).map_err(SourceError::OpenRepository)?;
        Ok(Self::from_repository(repo))
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self {
            repo,
            max_diff_chars: DEFAULT_MAX_DIFF_CHARS,
        }
    }

    pub fn with_max_diff_chars(mut self, max_diff_chars: usize) -> Self {
        self.max_diff_chars = max_diff_chars;
        self
    }
}

impl CommitSource for GitCommitSource {
    /// Walk history from HEAD in time order, keeping commits whose
    /// `Name <email>` contains `author` (case-insensitive), like
    /// `git log --author`.
    fn commits(
        &self,
        author: &str,
        max_commits: Option<usize>,
    ) -> Result<Vec<CommitRecord>, SourceError> {
        if let Err(e) = self.repo.head() {
            return Err(match e.code() {
                ErrorCode::UnbornBranch | ErrorCode::NotFound => SourceError::NoHead,
                _ => SourceError::Walk(e),
            });
        }

        let mut revwalk = self.repo.revwalk().map_err(SourceError::Walk)?;
        revwalk.set_sorting(Sort::TIME).map_err(SourceError::Walk)?;
        revwalk.push_head().map_err(SourceError::Walk)?;

        let needle = author.to_lowercase();
        let mut records = Vec::new();
        let mut scanned = 0usize;

        for oid_result in revwalk {
            if max_commits.is_some_and(|limit| records.len() >= limit) {
                break;
            }

            let oid = oid_result.map_err(SourceError::Walk)?;
            let commit = self
                .repo
                .find_commit(oid)
                .map_err(|source| SourceError::ReadCommit {
                    hash: oid.to_string(),
                    source,
                })?;
            scanned += 1;

            let signature = commit.author();
            let identity = format!(
                "{} <{}>",
                signature.name().unwrap_or(""),
                signature.email().unwrap_or("")
            );
            if !identity.to_lowercase().contains(&needle) {
                continue;
            }

            records.push(CommitRecord::from_git2_commit(
                &self.repo,
                &commit,
                self.max_diff_chars,
            )?);
        }

        debug!(
            "Matched {} of {} scanned commits for author '{}'",
            records.len(),
            scanned,
            author
        );

        if records.is_empty() && max_commits != Some(0) {
            return Err(SourceError::UnknownAuthor(author.to_string()));
        }

        Ok(records)
    }
}
