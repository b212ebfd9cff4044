// ./src/main.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use proofpack::pipeline::PipelineEvent;
use proofpack::{logging, Constraints, Pipeline, PipelineConfig};

/// Benchmark compression methods over a transaction batch, commit to it and
/// simulate a proof over the commitment.
#[derive(Parser, Debug)]
#[command(name = "proofpack", version, about)]
struct Cli {
    /// JSON file with transactions. The built-in sample set is used when omitted.
    file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, default_value = "proofpack.toml")]
    config: PathBuf,

    /// Upper bound on a single transaction value
    #[arg(long, default_value = "2.0")]
    max_value: String,

    /// Upper bound on gas per transaction
    #[arg(long, default_value = "100000")]
    gas_limit: String,

    #[arg(long)]
    no_balance_check: bool,

    #[arg(long)]
    allow_double_spend: bool,

    /// Overrides the configured log level
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = PipelineConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    logging::init(cli.log_level.as_deref().unwrap_or(&config.log_level));

    let mut pipeline = Pipeline::new(config);
    let mut events = pipeline.subscribe();
    let listener = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(PipelineEvent::Progress { stage, percent, message }) => {
                    info!(stage = stage.as_str(), percent, "{message}");
                }
                Ok(PipelineEvent::Completed { stage }) => {
                    info!(stage = stage.as_str(), "stage completed");
                }
                Ok(PipelineEvent::Failed { stage, error }) => {
                    error!(stage = stage.as_str(), %error, "stage failed");
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "progress events dropped"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    match &cli.file {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("reading transactions from {}", path.display()))?;
            let file_name = path.file_name().and_then(|n| n.to_str());
            pipeline
                .ingest_json(&bytes, file_name)
                .with_context(|| format!("parsing transactions from {}", path.display()))?;
        }
        None => pipeline.ingest_sample(),
    }

    let constraints = Constraints {
        max_value: cli.max_value,
        gas_limit: cli.gas_limit,
        balance_check: !cli.no_balance_check,
        no_double_spend: !cli.allow_double_spend,
    };
    let summary = pipeline.run_to_report(constraints).await.context("running pipeline")?;

    drop(pipeline);
    let _ = listener.await;

    let rendered = serde_json::to_string_pretty(&summary).context("serializing summary")?;
    println!("{rendered}");
    Ok(())
}
