use alloy::primitives::{Address, U256};
use log::debug;
use rand::Rng;
use std::time::Duration;

use crate::chain::Chain;
use crate::config::{NetworkConfig, TransferSettings};
use crate::confirm::Confirmer;
use crate::fees::{self, format_native};
use crate::orchestrator::{self, ActionRequest, Approval, TransactionOutcome};

/// Aggregate of one batch run; mutated only by the loop that owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferBatchResult {
    pub attempted: usize,
    pub succeeded: usize,
    pub total_sent_wei: U256,
}

/// Fresh recipient per transfer, unrelated to any existing account.
pub fn random_recipient<R: Rng + ?Sized>(rng: &mut R) -> Address {
    Address::from(rng.gen::<[u8; 20]>())
}

/// Uniform draw over [min, max), floored to the configured precision so the
/// upper bound stays exclusive after rounding. The draw happens in the
/// integer precision units `Config::load` validated as non-empty, so the
/// result converts to wei exactly and the sample range is never empty.
pub fn random_amount<R: Rng + ?Sized>(rng: &mut R, settings: &TransferSettings) -> U256 {
    let (min_units, max_units) = settings.unit_range();
    let units = rng.gen_range(min_units..max_units);
    U256::from(units) * U256::from(10u64).pow(U256::from(18 - settings.precision))
}

/// Issues `count` independent random transfers with jittered pacing.
/// Consent is collected once here; individual transfers skip the gate.
/// A failed transfer never stops the rest of the batch.
pub async fn run_batch<R: Rng + ?Sized>(
    chain: &dyn Chain,
    network: &NetworkConfig,
    confirmer: &mut dyn Confirmer,
    rng: &mut R,
    settings: &TransferSettings,
    count: usize,
) -> TransferBatchResult {
    let mut result = TransferBatchResult::default();

    println!("\n===== RANDOM TRANSFERS =====");

    let gas_budget = ActionRequest::Transfer {
        to: Address::ZERO,
        amount: U256::ZERO,
    }
    .gas_budget();
    let quote = match fees::estimate(chain, gas_budget).await {
        Ok(quote) => quote,
        Err(e) => {
            println!("Fee estimation failed: {}", e);
            println!("===== TRANSFERS FAILED =====\n");
            return result;
        }
    };

    let rows = vec![
        ("Action", "Random Transfers".to_string()),
        ("Count", count.to_string()),
        (
            "Amount",
            format!("{} - {} {} each", settings.min_amount, settings.max_amount, network.symbol),
        ),
        (
            "Est. Gas",
            format!("{} {} each", format_native(quote.total_wei), network.symbol),
        ),
    ];
    if !confirmer.confirm(&rows) {
        println!("Transaction canceled.");
        println!("===== TRANSFERS CANCELED =====\n");
        return result;
    }

    println!("Starting {} random transfers...", count);

    for i in 0..count {
        println!("\n--- Transfer {}/{} ---", i + 1, count);

        // Pacing between transfers, not before the first one.
        if i > 0 {
            let delay_ms = rng.gen_range(settings.jitter_min_ms..settings.jitter_max_ms);
            println!(
                "Waiting {:.1} seconds before next transaction...",
                delay_ms as f64 / 1000.0
            );
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        let amount = random_amount(rng, settings);
        let request = ActionRequest::Transfer {
            to: random_recipient(rng),
            amount,
        };

        result.attempted += 1;
        match orchestrator::execute(chain, network, confirmer, Approval::PreApproved, &request)
            .await
        {
            TransactionOutcome::Confirmed { block_number, tx_hash } => {
                debug!("transfer {} confirmed in block {} as {}", i + 1, block_number, tx_hash);
                result.succeeded += 1;
                result.total_sent_wei += amount;
            }
            TransactionOutcome::TimedOut { tx_hash } => {
                debug!("transfer {} still pending as {}", i + 1, tx_hash);
            }
            TransactionOutcome::Failed { reason } => {
                debug!("transfer {} failed: {}", i + 1, reason);
            }
            TransactionOutcome::Cancelled => {}
        }
    }

    println!("\n===== TRANSFERS SUMMARY =====");
    println!("Successfully completed {}/{} transfers", result.succeeded, count);
    println!(
        "Total amount sent: {} {}",
        format_native(result.total_sent_wei),
        network.symbol
    );
    println!("===== TRANSFERS COMPLETED =====\n");

    result
}
