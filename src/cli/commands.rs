pub(crate) use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ledger-engine",
    author,
    version,
    about = "A minimal retail-banking ledger driven by CSV command scripts",
    long_about = None,
    after_help = "OUTPUT:\n    Account summaries are printed to stdout in CSV format.\n    Use shell redirection to save to a file:\n\n    ledger-engine commands.csv > accounts.csv"
)]
pub struct Args {
    /// Path to the input command CSV file
    #[arg(
        index = 1,
        value_name = "FILE",
        help = "Input CSV file with columns: op, account, counterparty, kind, amount, description"
    )]
    pub input_file: PathBuf,
}
