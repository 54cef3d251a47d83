//! Per-commit diff summaries using git2.

use std::fmt;

use git2::{Commit, Delta, Diff, DiffFindOptions, DiffFormat, DiffOptions, Repository};
use tracing::warn;

/// Default character budget for a commit's patch text.
pub const DEFAULT_MAX_DIFF_CHARS: usize = 4_000;

/// Status of a file touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl FileStatus {
    fn code(&self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
            FileStatus::Renamed => 'R',
        }
    }
}

/// A file touched by a commit.
#[derive(Debug, Clone)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
    /// Old path for renamed files (None for non-rename changes).
    pub old_path: Option<String>,
    pub binary: bool,
}

impl fmt::Display for ChangedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.old_path {
            Some(old) => write!(f, "{} {} -> {}", self.status.code(), old, self.path)?,
            None => write!(f, "{} {}", self.status.code(), self.path)?,
        }
        if self.binary {
            f.write_str(" (binary)")?;
        }
        Ok(())
    }
}

/// Summarize what a commit changed: a stat line, the file list, and the
/// patch text for regular files.
///
/// Renamed and binary files appear only in the file list; their content is
/// left out of the patch. Merge commits are summarized as such without a
/// patch. The patch is cut at `max_chars` bytes.
pub fn summarize_commit_diff(
    repo: &Repository,
    commit: &Commit,
    max_chars: usize,
) -> Result<String, git2::Error> {
    if commit.parent_count() > 1 {
        return Ok(format!("merge commit ({} parents)", commit.parent_count()));
    }

    let tree = commit.tree()?;
    let parent_tree = match commit.parent(0) {
        Ok(parent) => Some(parent.tree()?),
        Err(_) => None,
    };

    let mut opts = DiffOptions::new();
    opts.context_lines(1);
    let mut diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

    let mut find = DiffFindOptions::new();
    find.renames(true);
    diff.find_similar(Some(&mut find))?;

    let stats = diff.stats()?;
    let files = collect_files(&diff);

    let mut summary = format!(
        "{} file(s) changed, {} insertion(s)(+), {} deletion(s)(-)\n",
        stats.files_changed(),
        stats.insertions(),
        stats.deletions()
    );
    for file in &files {
        summary.push_str(&file.to_string());
        summary.push('\n');
    }

    let (patch, truncated) = patch_text(&diff, max_chars);
    if !patch.is_empty() {
        summary.push('\n');
        summary.push_str(&patch);
    }
    if truncated {
        summary.push_str("\n[diff truncated]\n");
    }

    Ok(summary)
}

/// Collect changed file entries from a diff.
fn collect_files(diff: &Diff<'_>) -> Vec<ChangedFile> {
    let mut files = Vec::new();

    for delta in diff.deltas() {
        let status = match delta.status() {
            Delta::Added | Delta::Untracked | Delta::Copied => FileStatus::Added,
            Delta::Deleted => FileStatus::Deleted,
            Delta::Renamed => FileStatus::Renamed,
            _ => FileStatus::Modified,
        };

        let new_path = delta
            .new_file()
            .path()
            .map(|p| p.to_string_lossy().to_string());
        let old_path = delta
            .old_file()
            .path()
            .map(|p| p.to_string_lossy().to_string());

        let (path, old_path) = match status {
            FileStatus::Renamed => (new_path.clone().or_else(|| old_path.clone()).unwrap_or_default(), old_path),
            _ => (new_path.or(old_path).unwrap_or_default(), None),
        };

        if !path.is_empty() {
            files.push(ChangedFile {
                path,
                status,
                old_path,
                binary: delta.flags().is_binary(),
            });
        }
    }

    files
}

/// Render the patch for non-renamed, non-binary files, respecting the limit.
fn patch_text(diff: &Diff<'_>, max_chars: usize) -> (String, bool) {
    let mut text = String::new();
    let mut truncated = false;

    let result = diff.print(DiffFormat::Patch, |delta, _hunk, line| {
        if truncated {
            return true;
        }
        if delta.status() == Delta::Renamed || delta.flags().is_binary() || line.origin() == 'B' {
            return true;
        }

        let content = std::str::from_utf8(line.content()).unwrap_or("");
        if text.len() + content.len() + 1 > max_chars {
            truncated = true;
            return true;
        }

        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(content);

        true
    });

    if let Err(e) = result {
        warn!("Failed to collect diff text: {e}");
        truncated = true;
    }

    (text, truncated)
}
