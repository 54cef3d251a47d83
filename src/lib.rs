//! gauthor - A CLI tool that summarizes an author's git contributions.
//!
//! # Overview
//!
//! gauthor walks a repository's history for one author, splits the matching
//! commits into token-bounded batches, asks a language model to classify each
//! batch into fixed categories (features, bug fixes, docs, refactoring,
//! infrastructure), and merges the results into a single report.

pub mod analysis;
pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod report;

// Re-export commonly used types
pub use analysis::{AnalysisRequest, BatchLimits, PipelineSettings, analyze_author};
pub use config::ModelConfig;
pub use error::{ConfigError, ModelError, SourceError};
pub use git::{CommitRecord, CommitSource, GitCommitSource};
pub use llm::{GroqClient, LanguageModel, RetryingModel};
pub use report::{Category, CategoryMap, Report};
