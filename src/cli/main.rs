mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::Args;
use ledger_engine::{LedgerEngine, MemoryStore};

fn main() -> Result<()> {
    // Parse the CLI arguments
    let args = Args::parse();

    // Initialize logger with default level of info (can be overridden with RUST_LOG)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. Initialize the LedgerEngine over the in-memory store
    let engine = LedgerEngine::new(MemoryStore::new());

    // 2. Open and run the command script
    log::info!("Running commands from {}", args.input_file.display());
    let file = std::fs::File::open(&args.input_file)
        .with_context(|| format!("Failed to open input file: {}", args.input_file.display()))?;

    let outcome = engine
        .run_commands(file)
        .context("Failed to run command batch")?;

    log::info!(
        "Batch complete ({} processed, {} skipped), exporting accounts",
        outcome.processed,
        outcome.skipped
    );

    // 3. Export the account summaries to stdout
    engine
        .export_accounts(std::io::stdout())
        .context("Failed to export accounts to stdout")?;

    log::info!("Export complete");

    Ok(())
}
