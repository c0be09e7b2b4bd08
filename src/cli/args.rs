use crate::config::{LedgerConfig, DEFAULT_AMOUNT_SCALE};
use crate::replay::OutputKind;
use crate::types::AccountId;
use clap::Parser;
use std::path::PathBuf;

/// Replay custodial ledger operations from a CSV file
#[derive(Parser, Debug)]
#[command(name = "custodial-ledger")]
#[command(about = "Replay custodial ledger operations from a CSV file", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operation records
    #[arg(value_name = "INPUT", help = "Path to the operations CSV file")]
    pub input_file: PathBuf,

    /// Identities allowed to run administrative operations
    #[arg(
        long = "admin",
        value_name = "ID",
        help = "Administrator identity (repeat for several)"
    )]
    pub admins: Vec<AccountId>,

    /// Maximum number of fractional digits accepted in amounts
    #[arg(
        long = "amount-scale",
        value_name = "N",
        default_value_t = DEFAULT_AMOUNT_SCALE,
        help = "Decimal places accepted in amounts and printed in output"
    )]
    pub amount_scale: u32,

    /// Ledger view written to stdout once the replay finishes
    #[arg(
        long = "output",
        value_name = "VIEW",
        value_enum,
        default_value_t = OutputKind::Accounts,
        help = "What to print: accounts, transactions or requests"
    )]
    pub output: OutputKind,

    /// Log filter used when RUST_LOG is not set
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "info",
        help = "Log level written to stderr (overridden by RUST_LOG)"
    )]
    pub log_level: String,
}

impl CliArgs {
    /// Build the ledger configuration from the parsed arguments
    ///
    /// An out-of-range scale falls back to the default with a warning.
    pub fn to_ledger_config(&self) -> LedgerConfig {
        LedgerConfig::new(self.admins.iter().copied(), self.amount_scale)
    }
}
