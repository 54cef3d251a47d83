//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use git2::{Oid, Repository, Signature, Time};

use gauthor::error::{ModelError, SourceError};
use gauthor::git::{CommitRecord, CommitSource};
use gauthor::llm::LanguageModel;

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to a model reply fixture.
pub fn reply_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("replies").join(name)
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// A canonical five-section reply with one bullet in `section`.
pub fn reply_with(section: &str, bullet: &str) -> String {
    ["features", "bugfixes", "docs", "refactor", "infra"]
        .iter()
        .map(|name| {
            if *name == section {
                format!("## {name}\n- {bullet}")
            } else {
                format!("## {name}\n- none")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
    clock: Cell<i64>,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self {
            dir,
            repo,
            clock: Cell::new(1_700_000_000),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a commit as the default test author. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        self.commit_as("Test User", "test@example.com", message)
    }

    /// Create a commit by the given author, touching a file named after the
    /// message so every commit has a diff. Commit times strictly increase.
    pub fn commit_as(&self, name: &str, email: &str, message: &str) -> Oid {
        let file_name = format!(
            "{}.txt",
            message
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect::<String>()
        );
        self.commit_file_as(name, email, message, &file_name, &format!("{message}\n"))
    }

    /// Create a commit writing `content` to `file_name`.
    pub fn commit_file_as(
        &self,
        name: &str,
        email: &str,
        message: &str,
        file_name: &str,
        content: &str,
    ) -> Oid {
        std::fs::write(self.dir.path().join(file_name), content)
            .expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_path(Path::new(file_name))
            .expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let seconds = self.clock.get() + 60;
        self.clock.set(seconds);
        let sig = Signature::new(name, email, &Time::new(seconds, 0))
            .expect("Failed to create signature");

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }
}

/// Build an in-memory commit record.
pub fn record(i: usize, message: &str) -> CommitRecord {
    CommitRecord {
        hash: format!("{:040x}", i),
        author: "Ada Lovelace <ada@example.com>".to_string(),
        date: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + chrono::Duration::hours(i as i64),
        message: message.to_string(),
        diff_summary: format!("1 file changed, 1 insertion(+), 0 deletions(-)\nM src/file_{i}.rs"),
    }
}

/// A commit source serving a fixed list, newest first.
pub struct FakeSource {
    pub records: Vec<CommitRecord>,
}

impl CommitSource for FakeSource {
    fn commits(
        &self,
        _author: &str,
        max_commits: Option<usize>,
    ) -> Result<Vec<CommitRecord>, SourceError> {
        let limit = max_commits.unwrap_or(usize::MAX);
        Ok(self.records.iter().take(limit).cloned().collect())
    }
}

/// How a scripted model answers a prompt.
#[derive(Clone)]
pub enum Scripted {
    Reply(String),
    Fail(u16),
    /// Reply after sleeping.
    Slow(Duration, String),
}

/// A fake model answering by the first matching prompt substring.
///
/// Prompts matching no rule get `default`. Calls are counted and prompts
/// recorded in call order.
pub struct ScriptedModel {
    rules: Vec<(String, Scripted)>,
    default: Scripted,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(default: Scripted) -> Self {
        Self {
            rules: Vec::new(),
            default,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(reply: impl Into<String>) -> Self {
        Self::new(Scripted::Reply(reply.into()))
    }

    pub fn on(mut self, needle: &str, answer: Scripted) -> Self {
        self.rules.push((needle.to_string(), answer));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let answer = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, answer)| answer.clone())
            .unwrap_or_else(|| self.default.clone());

        match answer {
            Scripted::Reply(text) => Ok(text),
            Scripted::Fail(status) => Err(ModelError::Provider {
                status,
                body: "scripted failure".to_string(),
            }),
            Scripted::Slow(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
        }
    }
}

/// Count commits per author label, for assertions on filtering.
pub fn authors(records: &[CommitRecord]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for record in records {
        *counts.entry(record.author.clone()).or_insert(0) += 1;
    }
    counts
}
