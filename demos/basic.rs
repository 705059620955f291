//! Basic example of using the `LedgerEngine`.
//!
//! Run with: `cargo run --example basic`

use ledger_engine::{LedgerEngine, MemoryStore};
use std::io::Cursor;

fn main() {
    // Initialize logger (optional, but shows what's happening)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Sample command script as CSV
    let commands = r"op,account,counterparty,kind,amount,description
open,alice,,individual,,
open,kiosk,,merchant,,
deposit,alice,,,500,salary
withdraw,alice,,,30,
transfer,alice,kiosk,,200,groceries
fund,alice,,Betting Funding,50,Funded Bet9ja account (u-42)
fund,alice,,Data Purchase,25,Bought 2GB for 08012345678
withdraw,kiosk,,,5000,too much
";

    // Create engine and run the script
    let engine = LedgerEngine::new(MemoryStore::new());
    engine
        .run_commands(Cursor::new(commands))
        .expect("Failed to run commands");

    // Export account summaries to stdout
    println!("\n=== Final Account State ===");
    engine
        .export_accounts(std::io::stdout())
        .expect("Failed to export accounts");
}
