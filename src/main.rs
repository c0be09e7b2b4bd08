//! Custodial Ledger CLI
//!
//! Replays an operations CSV against a fresh in-memory ledger and prints the
//! resulting state as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --admin 100 operations.csv > accounts.csv
//! cargo run -- --admin 100 --output transactions operations.csv > entries.csv
//! cargo run -- --admin 100 --output requests --amount-scale 4 operations.csv
//! RUST_LOG=debug cargo run -- --admin 100 operations.csv
//! ```
//!
//! Logs go to stderr; stdout carries only the CSV output. Lifecycle events are
//! pushed onto a channel and delivered by a background task, so a slow or
//! failing delivery never holds up the ledger.
//!
//! # Exit Codes
//!
//! - 0: Success (refused operations and malformed rows are logged, not fatal)
//! - 1: Error (missing arguments, file not found, output not writable, etc.)

use custodial_ledger::cli;
use custodial_ledger::notify::{spawn_dispatcher, ChannelSink, LogSink};
use custodial_ledger::replay::replay_file;
use custodial_ledger::Ledger;
use std::process;
use std::sync::Arc;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = cli::parse_args();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = args.to_ledger_config();
    let (sink, receiver) = ChannelSink::new();
    let dispatcher = spawn_dispatcher(receiver, LogSink);
    let ledger = Arc::new(Ledger::from_config(&config, Arc::new(sink)));

    let scale = config.amounts.scale;
    let replay = {
        let ledger = Arc::clone(&ledger);
        tokio::task::spawn_blocking(move || {
            let mut output = std::io::stdout().lock();
            replay_file(&ledger, &args.input_file, args.output, scale, &mut output)
        })
    };

    let result = replay.await;

    // Dropping the last ledger handle closes the channel and lets the
    // dispatcher drain and finish.
    drop(ledger);
    match dispatcher.await {
        Ok(delivered) => debug!(delivered, "notifications delivered"),
        Err(e) => error!(error = %e, "notification dispatcher failed"),
    }

    match result {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: replay task failed: {}", e);
            process::exit(1);
        }
    }
}
