//! gauthor - CLI entry point.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use gauthor::analysis::batcher::{DEFAULT_MAX_BATCH_COMMITS, DEFAULT_MAX_BATCH_TOKENS};
use gauthor::analysis::{AnalysisRequest, BatchLimits, PipelineSettings, analyze_author};
use gauthor::config::ModelConfig;
use gauthor::git::GitCommitSource;
use gauthor::git::diff::DEFAULT_MAX_DIFF_CHARS;
use gauthor::llm::{GroqClient, LanguageModel, RetryingModel};
use gauthor::report::{render, render_json};

/// Exit code when every batch failed or was cancelled.
const EXIT_TOTAL_FAILURE: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Summarize an author's git contributions using an LLM.
#[derive(Parser, Debug)]
#[command(name = "gauthor")]
#[command(about = "Summarize an author's git contributions into categorized reports using an LLM")]
#[command(version)]
struct Cli {
    /// Author name or email (case-insensitive substring, like `git log --author`)
    author: String,

    /// Maximum number of commits to analyze
    #[arg(long)]
    max_commits: Option<usize>,

    /// Path to the repository (or any directory inside it)
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Estimated token budget per batch
    #[arg(long, default_value_t = DEFAULT_MAX_BATCH_TOKENS)]
    batch_tokens: NonZeroUsize,

    /// Maximum commits per batch
    #[arg(long, default_value_t = DEFAULT_MAX_BATCH_COMMITS)]
    batch_commits: NonZeroUsize,

    /// Number of batches classified concurrently
    #[arg(short = 'j', long, default_value_t = NonZeroUsize::MIN)]
    jobs: NonZeroUsize,

    /// Overall time budget in seconds; unfinished batches are cancelled
    #[arg(long, value_name = "SECS")]
    deadline: Option<u64>,

    /// Extra attempts per batch on transient model errors
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Pause between batches when running sequentially
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    delay_ms: u64,

    /// Maximum diff characters captured per commit
    #[arg(long, default_value_t = DEFAULT_MAX_DIFF_CHARS)]
    diff_chars: usize,

    /// Model name (defaults to the provider's recommended model)
    #[arg(long)]
    model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "warn,gauthor=debug" } else { "warn" })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // Step 1: Credential and client, before touching the repository
    let mut config = ModelConfig::from_env().context("Language model is not configured")?;
    if let Some(model) = cli.model {
        config = config.with_model(model);
    }
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }

    let client = GroqClient::new(config).context("Failed to initialize language model client")?;
    let model: Box<dyn LanguageModel> = if cli.retries > 0 {
        Box::new(RetryingModel::new(client, cli.retries.saturating_add(1)))
    } else {
        Box::new(client)
    };

    // Step 2: Open git repository
    let source = GitCommitSource::open(&cli.repo)
        .with_context(|| format!("Failed to open repository at {}", cli.repo.display()))?
        .with_max_diff_chars(cli.diff_chars);

    // Step 3: Batch, classify, aggregate
    let request = AnalysisRequest {
        author: cli.author,
        max_commits: cli.max_commits,
    };
    let settings = PipelineSettings {
        limits: BatchLimits::tokens(cli.batch_tokens).with_max_commits(cli.batch_commits),
        jobs: cli.jobs,
        batch_delay: Duration::from_millis(cli.delay_ms),
        deadline: cli.deadline.map(Duration::from_secs),
        progress: true,
    };

    let report = analyze_author(&source, &*model, &request, &settings)
        .await
        .context("Failed to collect commits")?;

    // Step 4: Render
    match cli.format {
        OutputFormat::Text => print!("{}", render(&report)),
        OutputFormat::Json => {
            let json = render_json(&report).context("Failed to serialize report")?;
            println!("{}", json);
        }
    }

    if report.is_total_failure() {
        eprintln!(
            "Error: all {} batch(es) failed or were cancelled",
            report.metadata.batch_count
        );
        return Ok(ExitCode::from(EXIT_TOTAL_FAILURE));
    }
    if report.is_partial() {
        eprintln!(
            "Warning: {} of {} batch(es) were not classified; the report is partial",
            report.metadata.batch_count - report.metadata.classified_batches,
            report.metadata.batch_count
        );
    }

    Ok(ExitCode::SUCCESS)
}
