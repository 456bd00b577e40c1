//! AdCopy Surge: scores ad copy with concurrent analysis tools and
//! suggests alternatives.
//!
//! Results are written to stdout as JSON; logs go to stderr.

use adcopy_core::config::AppConfig;
use adcopy_core::types::{AdCopy, CompetitorAd, ToolCategory};
use adcopy_engine::AnalysisEngine;
use adcopy_tools::tool::Tool;
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "adcopy-surge")]
#[command(about = "Ad copy scoring engine with concurrent analysis tools")]
#[command(version)]
struct Cli {
    /// Config file (TOML); defaults to ./adcopy-surge.toml when present
    #[arg(long, global = true, env = "ADCOPY_SURGE_CONFIG")]
    config: Option<String>,

    /// Log filter, e.g. "debug" or "adcopy_engine=debug" (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score ad copy and print the analysis result
    Analyze {
        /// Ad copy JSON file, or "-" for stdin
        #[arg(long)]
        input: String,

        /// JSON array of competitor ads to benchmark against
        #[arg(long)]
        competitors: Option<String>,

        /// Only run these tools (comma separated)
        #[arg(long, value_delimiter = ',')]
        tools: Option<Vec<String>>,
    },
    /// Generate alternative versions of ad copy
    Alternatives {
        /// Ad copy JSON file, or "-" for stdin
        #[arg(long)]
        input: String,
    },
    /// List registered tools in registration order
    Tools {
        #[arg(long)]
        category: Option<ToolCategory>,
    },
}

#[derive(Serialize)]
struct ToolSummary<'a> {
    name: &'a str,
    category: ToolCategory,
    timeout_ms: u64,
    scores: &'a [&'a str],
}

fn read_source(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
    }
}

fn read_ad(path: &str) -> anyhow::Result<AdCopy> {
    serde_json::from_str(&read_source(path)?).with_context(|| format!("invalid ad copy JSON in {path}"))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Cancel in-flight work on Ctrl-C.
fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling analysis");
            trigger.cancel();
        }
    });
    token
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match &cli.log_level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "adcopy_surge=info,adcopy_engine=info,adcopy_tools=info".into()
        }),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    info!(
        tools = ?config.tools.enabled,
        emotion_strategy = ?config.tools.emotion_strategy,
        "Configuration loaded"
    );

    let engine = AnalysisEngine::from_config(&config)?;

    match cli.command {
        Command::Analyze {
            input,
            competitors,
            tools,
        } => {
            let ad = read_ad(&input)?;
            let competitors: Vec<CompetitorAd> = match competitors {
                Some(path) => serde_json::from_str(&read_source(&path)?)
                    .with_context(|| format!("invalid competitor JSON in {path}"))?,
                None => Vec::new(),
            };

            let cancel = cancel_on_interrupt();
            match engine
                .run_analysis_with_cancel(&ad, &competitors, tools.as_deref(), &cancel)
                .await
            {
                Ok(result) => print_json(&result)?,
                Err(failure) => {
                    print_json(&failure)?;
                    std::process::exit(2);
                }
            }
        }
        Command::Alternatives { input } => {
            let ad = read_ad(&input)?;
            match engine.generate_alternatives(&ad).await {
                Ok(variants) => print_json(&variants)?,
                Err(failure) => {
                    print_json(&failure)?;
                    std::process::exit(2);
                }
            }
        }
        Command::Tools { category } => {
            let tools: Vec<ToolSummary<'_>> = engine
                .registry()
                .list(category)
                .into_iter()
                .map(|entry| ToolSummary {
                    name: &entry.config.name,
                    category: entry.config.category,
                    timeout_ms: entry.config.timeout_ms,
                    scores: entry.tool.output_score_names(),
                })
                .collect();
            print_json(&tools)?;
        }
    }

    Ok(())
}
