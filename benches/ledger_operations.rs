//! Benchmark suite for ledger operations
//!
//! Measures the replay pipeline and the hot paths under contention using the
//! divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//! ```
//!
//! # Workloads
//!
//! Operations are generated in memory:
//! - `replay_generated` - registrations, deposits with approvals and transfers
//! - `approve_pending` - draining a queue of pending deposits
//! - `contended_transfers` - transfers back and forth between two accounts
//!   from several threads at once

use custodial_ledger::io::LedgerCommand;
use custodial_ledger::notify::NoopSink;
use custodial_ledger::replay::replay;
use custodial_ledger::{Ledger, LedgerConfig, RequestKind};
use divan::Bencher;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const ADMIN: u64 = 1_000_000;
const ACCOUNTS: u64 = 50;

fn main() {
    divan::main();
}

fn ledger() -> Ledger {
    Ledger::from_config(&LedgerConfig::new([ADMIN], 2), Arc::new(NoopSink))
}

/// Registrations for every account, then rounds of deposit + approve + transfer
fn generate(operations: usize) -> Vec<LedgerCommand> {
    let mut commands: Vec<LedgerCommand> = (1..=ACCOUNTS)
        .map(|identity| LedgerCommand::Register {
            identity,
            name: format!("user-{identity}"),
        })
        .collect();

    let mut request = 0;
    for i in 0..operations as u64 {
        let identity = i % ACCOUNTS + 1;
        match i % 3 {
            0 => commands.push(LedgerCommand::Submit {
                identity,
                kind: RequestKind::Deposit,
                amount: Decimal::new(10_000, 2),
            }),
            1 => {
                request += 1;
                commands.push(LedgerCommand::Approve {
                    actor: ADMIN,
                    request,
                });
            }
            _ => commands.push(LedgerCommand::Transfer {
                sender: identity,
                recipient: identity % ACCOUNTS + 1,
                amount: Decimal::new(125, 2),
            }),
        }
    }
    commands
}

/// Benchmark replaying generated operations through the ledger
#[divan::bench(args = [100, 1_000, 10_000])]
fn replay_generated(bencher: Bencher, operations: usize) {
    let commands = generate(operations);

    bencher
        .with_inputs(|| (ledger(), commands.clone()))
        .bench_values(|(ledger, commands)| replay(&ledger, commands.into_iter().map(Ok)));
}

/// Benchmark approving a queue of pending deposits in submission order
#[divan::bench(args = [100, 1_000])]
fn approve_pending(bencher: Bencher, requests: u64) {
    bencher
        .with_inputs(|| {
            let ledger = ledger();
            ledger.register(1, "alice").expect("register");
            for _ in 0..requests {
                ledger
                    .submit_request(1, RequestKind::Deposit, Decimal::ONE)
                    .expect("submit");
            }
            ledger
        })
        .bench_values(|ledger| {
            for request in ledger.list_pending(ADMIN).expect("list pending") {
                ledger.approve(ADMIN, request.id).expect("approve");
            }
            ledger
        });
}

/// Benchmark transfers between the same two accounts from several threads
#[divan::bench(threads = [1, 2, 4, 8])]
fn contended_transfers(bencher: Bencher) {
    let ledger = ledger();
    ledger.register(1, "alice").expect("register");
    ledger.register(2, "bob").expect("register");
    ledger
        .set_balance(ADMIN, 1, Decimal::new(1_000_000, 0))
        .expect("fund");
    ledger
        .set_balance(ADMIN, 2, Decimal::new(1_000_000, 0))
        .expect("fund");
    let turn = AtomicU64::new(0);

    bencher.bench(|| {
        let (from, to) = if turn.fetch_add(1, Ordering::Relaxed) % 2 == 0 {
            (1, 2)
        } else {
            (2, 1)
        };
        ledger.transfer(from, to, Decimal::ONE)
    });
}
