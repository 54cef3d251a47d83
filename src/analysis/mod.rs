//! Batching, classification, and aggregation of an author's commits.

pub mod aggregator;
pub mod batcher;
pub mod classifier;
pub mod parser;
pub mod pipeline;

pub use aggregator::{BatchOutcome, aggregate, aggregate_outcomes};
pub use batcher::{Batch, BatchLimits, batch_commits};
pub use classifier::{Classifier, build_classification_prompt};
pub use parser::parse_classification;
pub use pipeline::{AnalysisRequest, PipelineSettings, analyze_author, classify_batches};
