//! # Research Assist
//!
//! Turns a research request into a reviewed report:
//! plan → search → draft → critique → revise, until an editor model accepts
//! the draft or the revision cap is reached. The report can be published to
//! a Google Drive folder.
//!
//! ## Quick Start
//! ```bash
//! cargo run -- "Summarize the state of WebAssembly component tooling"
//! ```

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================
/// Configuration management
mod config;

/// Research agent implementation
mod agent;

// =============================================================================
// IMPORTS
// =============================================================================
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::agent::ResearchAgent;
use crate::config::{Config, Provider};

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
#[derive(Parser, Debug)]
#[command(
    name = "research-assist",
    version,
    about = "Plans, researches, drafts and revises a report with an LLM",
    long_about = r#"
Research Assist - iterative report writing with an editor in the loop.

For a task it will:
  1. Plan the report
  2. Search the web (Tavily) for each planned query
  3. Draft the report
  4. Critique it, research the critique, and revise
  5. Stop when the editor accepts the draft or the revision cap is reached

ENVIRONMENT:
  TAVILY_API_KEY              required
  OPENAI_API_KEY              required for the openai provider
  LLM_PROVIDER, LLM_MODEL     model selection (default: openai / gpt-4.1)
  DRIVE_FOLDER                publish the report into this Drive folder
  GOOGLE_DRIVE_ACCESS_TOKEN   OAuth token for Drive

EXAMPLES:
  research-assist "Summarize recent work on memory-safe systems languages"

  research-assist --provider ollama --model llama3.2 "Rust in embedded devices"

  research-assist --drive-folder reports --share-with ana@example.com "Quantum error correction"
"#
)]
struct Args {
    /// The research request
    #[arg(help = "The task to research", value_name = "TASK")]
    task: String,

    /// Model name (overrides LLM_MODEL)
    #[arg(short = 'm', long = "model", help = "Model to use")]
    model: Option<String>,

    /// LLM backend (overrides LLM_PROVIDER)
    #[arg(short = 'p', long = "provider", help = "LLM provider: openai or ollama")]
    provider: Option<Provider>,

    /// Revision cap (overrides MAX_REVISIONS)
    #[arg(short = 'r', long = "max-revisions", help = "Maximum revisions before rejecting")]
    max_revisions: Option<usize>,

    /// Drive folder to publish into (overrides DRIVE_FOLDER)
    #[arg(long = "drive-folder", help = "Top-level Drive folder for the report")]
    drive_folder: Option<String>,

    /// Share the published report with this address as reader
    #[arg(long = "share-with", value_name = "EMAIL")]
    share_with: Option<String>,

    /// Where to write the report
    #[arg(short = 'o', long = "output", default_value = "report.md")]
    output: PathBuf,

    /// Verbose output (debug logging)
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Enable verbose/debug logging",
        default_value = "false"
    )]
    verbose: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply_to(&self, config: &mut Config) {
        if let Some(provider) = self.provider {
            info!(provider = %provider, "Using provider from command line");
            config.provider = provider;
        }
        if let Some(model) = &self.model {
            info!(model = %model, "Using model from command line");
            config.model = Some(model.clone());
        }
        if let Some(max_revisions) = self.max_revisions {
            config.max_revisions = max_revisions;
        }
        if let Some(folder) = &self.drive_folder {
            config.drive_folder = Some(folder.clone());
        }
    }
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    info!("Research Assist starting up...");

    let mut config = Config::from_env()?;
    args.apply_to(&mut config);
    config.validate()?;

    info!(
        provider = %config.provider,
        model = %config.effective_model(),
        max_revisions = config.max_revisions,
        "Configuration loaded"
    );

    let agent = ResearchAgent::new(config);

    let outcome = match agent.research(&args.task).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Research failed");
            eprintln!("\nResearch failed: {:#}", e);

            let message = e.to_string();
            if message.contains("connection refused") || message.contains("Connection") {
                eprintln!("\nTip: check that the model server is reachable");
                eprintln!("   ollama serve   (for --provider ollama)");
            } else if message.contains("TAVILY_API_KEY") || message.contains("OPENAI_API_KEY") {
                eprintln!("\nTip: set the key in your environment or a .env file");
            }

            return Err(e);
        }
    };

    println!("\n{}", "=".repeat(60));
    println!(
        "RESEARCH REPORT ({} after {} revisions)",
        outcome.decision,
        outcome.state.revision_number.saturating_sub(1)
    );
    println!("{}\n", "=".repeat(60));
    println!("{}", outcome.state.draft);
    println!("\n{}", "=".repeat(60));

    tokio::fs::write(&args.output, &outcome.state.draft)
        .await
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;
    info!(path = %args.output.display(), "Report written");

    if args.share_with.is_some() && agent.config().drive_folder.is_none() {
        warn!("--share-with ignored: no Drive folder configured");
    }

    if let Some(publication) = agent
        .publish(&args.output, args.share_with.as_deref())
        .await?
    {
        println!("Published: {}", publication.web_view_link);
        println!("Download:  {}", publication.export_link);
    }

    Ok(())
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// Initialize the tracing subscriber.
///
/// RUST_LOG, when set, takes precedence over `--verbose`.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
