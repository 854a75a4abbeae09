mod batch;
mod compress;
mod config;
mod decompress;
mod errors;
mod evaluation;
mod llm_client;
mod models;
mod state;
mod store;

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::state::AppState;
use crate::store::airtable::AirtableStore;

#[derive(Parser, Debug)]
#[command(
    name = "applicant-sync",
    about = "Compress, evaluate and decompress applicant records",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the canonical document, apply the shortlist rules and run the optional LLM review
    Compress(ApplicantArgs),
    /// Write the stored canonical document back into the normalized tables
    Decompress(ApplicantArgs),
    /// Compress then decompress every applicant
    Backfill,
}

#[derive(Args, Debug)]
struct ApplicantArgs {
    /// Value of the applicant's external ID column (e.g. TEST-001)
    #[arg(long)]
    applicant_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting applicant-sync v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(AirtableStore::new(&config)?);
    let llm = LlmClient::from_config(&config.llm)?;
    if llm.is_none() {
        info!("No LLM configured; enrichment disabled");
    }

    let state = AppState {
        store,
        llm,
        config,
    };

    match cli.command {
        Command::Compress(args) => {
            let outcome = compress::run(&state, &args.applicant_id).await?;
            println!(
                "{}: {} (document {}; lead {}; llm {})",
                args.applicant_id,
                if outcome.passed { "Shortlisted" } else { "Rejected" },
                if outcome.document_changed { "updated" } else { "unchanged" },
                if outcome.lead_created { "created" } else { "not created" },
                if outcome.llm_applied { "applied" } else { "skipped" },
            );
            println!("{}", outcome.reason);
        }
        Command::Decompress(args) => {
            let summary = decompress::run(&state, &args.applicant_id).await?;
            println!(
                "{}: decompression complete (dates preserved). personal {}/{}, salary {}/{}, experience {}/{} (created/updated)",
                args.applicant_id,
                summary.personal.created,
                summary.personal.updated,
                summary.salary.created,
                summary.salary.updated,
                summary.experience.created,
                summary.experience.updated,
            );
        }
        Command::Backfill => {
            let report = batch::run(&state).await?;
            println!(
                "Processed {} applicants: {} succeeded, {} failed",
                report.total(),
                report.succeeded.len(),
                report.failed.len()
            );
            for failure in &report.failed {
                println!("  {}: {}", failure.applicant_id, failure.error);
            }
            if !report.failed.is_empty() {
                bail!("{} applicant(s) failed during backfill", report.failed.len());
            }
        }
    }

    Ok(())
}
