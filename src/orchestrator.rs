use alloy::primitives::{Address, B256, U256};
use log::debug;

use crate::chain::{Chain, ChainError};
use crate::config::NetworkConfig;
use crate::confirm::Confirmer;
use crate::fees::{self, format_native, FeeQuote};
use crate::wallet::short_address;

/// One unit of work: a state-changing call waiting to be quoted, approved,
/// submitted, and included. Amounts are exact wei.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    Stake { amount: U256 },
    Withdraw { amount: U256 },
    ClaimRewards,
    Transfer { to: Address, amount: U256 },
}

impl ActionRequest {
    /// Fixed gas ceiling attached to the call. Conservative, not measured;
    /// actual consumption may be less.
    pub fn gas_budget(&self) -> u64 {
        match self {
            Self::Stake { .. } => 200_000,
            Self::Withdraw { .. } => 100_000,
            Self::ClaimRewards => 100_000,
            Self::Transfer { .. } => 21_000,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Stake { .. } => "Stake",
            Self::Withdraw { .. } => "Withdraw",
            Self::ClaimRewards => "Claim Rewards",
            Self::Transfer { .. } => "Transfer",
        }
    }

    fn section(&self) -> &'static str {
        match self {
            Self::Stake { .. } => "STAKING",
            Self::Withdraw { .. } => "WITHDRAW",
            Self::ClaimRewards => "CLAIMING",
            Self::Transfer { .. } => "TRANSFER",
        }
    }

    fn describe(&self, network: &NetworkConfig) -> String {
        match self {
            Self::Stake { amount } => {
                format!("Staking {} {}...", format_native(*amount), network.symbol)
            }
            Self::Withdraw { amount } => {
                format!("Withdrawing {} {}...", format_native(*amount), network.staked_symbol)
            }
            Self::ClaimRewards => format!("Claiming {} rewards...", network.staked_symbol),
            Self::Transfer { to, amount } => {
                format!("Sending {} {} to {}...", format_native(*amount), network.symbol, to)
            }
        }
    }
}

/// Exactly one of these per request; no partial states escape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    Confirmed { block_number: u64, tx_hash: B256 },
    Cancelled,
    /// The inclusion wait exceeded the configured bound; the transaction is
    /// still pending, not failed.
    TimedOut { tx_hash: B256 },
    Failed { reason: String },
}

/// Whether the operator still needs to approve this request at the gate.
/// Batch transfers carry consent given once at the scheduler's entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    Required,
    PreApproved,
}

fn preview_rows(
    request: &ActionRequest,
    network: &NetworkConfig,
    quote: &FeeQuote,
) -> Vec<(&'static str, String)> {
    let mut rows = vec![("Action", request.label().to_string())];
    match request {
        ActionRequest::Stake { amount } => {
            rows.push(("Amount", format!("{} {}", format_native(*amount), network.symbol)));
        }
        ActionRequest::Withdraw { amount } => {
            rows.push(("Amount", format!("{} {}", format_native(*amount), network.staked_symbol)));
        }
        ActionRequest::ClaimRewards => {}
        ActionRequest::Transfer { to, amount } => {
            rows.push(("Amount", format!("{} {}", format_native(*amount), network.symbol)));
            rows.push(("To", short_address(to)));
        }
    }
    rows.push(("Est. Gas", format!("{} {}", format_native(quote.total_wei), network.symbol)));
    rows
}

/// Drives one request through `Quoting → AwaitingConfirmation → Submitting
/// → AwaitingInclusion` to a terminal outcome. Exactly one transaction is
/// broadcast iff the gate was passed; nothing is retried automatically.
pub async fn execute(
    chain: &dyn Chain,
    network: &NetworkConfig,
    confirmer: &mut dyn Confirmer,
    approval: Approval,
    request: &ActionRequest,
) -> TransactionOutcome {
    let section = request.section();

    let quote = match fees::estimate(chain, request.gas_budget()).await {
        Ok(quote) => quote,
        Err(e) => {
            println!("Fee estimation failed: {}", e);
            println!("===== {} FAILED =====\n", section);
            return TransactionOutcome::Failed {
                reason: format!("fee estimation: {}", e),
            };
        }
    };
    debug!("quoted {} gas units at {} wei/gas", quote.gas_units, quote.gas_price_wei);

    if approval == Approval::Required {
        let rows = preview_rows(request, network, &quote);
        if !confirmer.confirm(&rows) {
            println!("Transaction canceled.");
            println!("===== {} CANCELED =====\n", section);
            return TransactionOutcome::Cancelled;
        }
    }

    println!("\n===== {} =====", section);
    println!("{}", request.describe(network));

    let tx_hash = match chain.submit(request).await {
        Ok(hash) => hash,
        Err(e) => {
            println!("Error submitting transaction: {}", e);
            println!("===== {} FAILED =====\n", section);
            return TransactionOutcome::Failed { reason: e.to_string() };
        }
    };

    println!("Transaction sent! Hash: {}", tx_hash);
    println!(
        "View on explorer: {}/tx/{}",
        network.explorer.trim_end_matches('/'),
        tx_hash
    );
    println!("Waiting for confirmation...");

    match chain.await_inclusion(tx_hash).await {
        Ok(block_number) => {
            println!("Transaction confirmed in block {}", block_number);
            println!("===== {} COMPLETED =====\n", section);
            TransactionOutcome::Confirmed { block_number, tx_hash }
        }
        Err(ChainError::Timeout) => {
            println!(
                "No inclusion within the configured wait; transaction {} is still pending.",
                tx_hash
            );
            println!("===== {} STILL PENDING =====\n", section);
            TransactionOutcome::TimedOut { tx_hash }
        }
        Err(e) => {
            println!("Error confirming transaction: {}", e);
            println!("===== {} FAILED =====\n", section);
            TransactionOutcome::Failed { reason: e.to_string() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::MockChain;
    use crate::confirm::scripted::ScriptedConfirmer;
    use alloy::primitives::utils::parse_ether;

    const GWEI: u128 = 1_000_000_000;

    fn stake(amount: &str) -> ActionRequest {
        ActionRequest::Stake {
            amount: parse_ether(amount).unwrap(),
        }
    }

    #[tokio::test]
    async fn decline_cancels_without_submitting() {
        let chain = MockChain::new();
        chain.push_gas_price(10 * GWEI);
        let mut confirmer = ScriptedConfirmer::new([false]);

        let outcome = execute(
            &chain,
            &NetworkConfig::default(),
            &mut confirmer,
            Approval::Required,
            &stake("1.5"),
        )
        .await;

        assert_eq!(outcome, TransactionOutcome::Cancelled);
        assert!(chain.submitted().is_empty());
    }

    #[tokio::test]
    async fn approved_stake_confirms_with_previewed_fee() {
        let chain = MockChain::new();
        chain.push_gas_price(10 * GWEI);
        chain.push_inclusion(Ok(1234));
        let mut confirmer = ScriptedConfirmer::new([true]);

        let outcome = execute(
            &chain,
            &NetworkConfig::default(),
            &mut confirmer,
            Approval::Required,
            &stake("1.5"),
        )
        .await;

        // 10 gwei * 200000 gas units = 0.002 TEA
        let preview = &confirmer.previews[0];
        assert!(preview.iter().any(|(k, v)| k == "Action" && v == "Stake"));
        assert!(preview.iter().any(|(k, v)| k == "Amount" && v == "1.5 TEA"));
        assert!(preview.iter().any(|(k, v)| k == "Est. Gas" && v == "0.002 TEA"));

        match outcome {
            TransactionOutcome::Confirmed { block_number, tx_hash } => {
                assert_eq!(block_number, 1234);
                assert_ne!(tx_hash, B256::ZERO);
            }
            other => panic!("expected Confirmed, got {:?}", other),
        }
        assert_eq!(chain.submitted(), vec![stake("1.5")]);
    }

    #[tokio::test]
    async fn pre_approved_request_skips_the_gate() {
        let chain = MockChain::new();
        // No scripted answers: consulting the gate would decline.
        let mut confirmer = ScriptedConfirmer::new([]);

        let outcome = execute(
            &chain,
            &NetworkConfig::default(),
            &mut confirmer,
            Approval::PreApproved,
            &ActionRequest::Transfer {
                to: Address::ZERO,
                amount: parse_ether("0.001").unwrap(),
            },
        )
        .await;

        assert!(matches!(outcome, TransactionOutcome::Confirmed { .. }));
        assert!(confirmer.previews.is_empty());
        assert_eq!(chain.submitted().len(), 1);
    }

    #[tokio::test]
    async fn withdraw_preview_uses_the_staked_symbol() {
        let chain = MockChain::new();
        let mut confirmer = ScriptedConfirmer::new([false]);

        execute(
            &chain,
            &NetworkConfig::default(),
            &mut confirmer,
            Approval::Required,
            &ActionRequest::Withdraw {
                amount: parse_ether("2").unwrap(),
            },
        )
        .await;

        let preview = &confirmer.previews[0];
        assert!(preview.iter().any(|(k, v)| k == "Amount" && v == "2 stTEA"));
    }

    #[tokio::test]
    async fn fee_failure_aborts_before_anything_is_signed() {
        let chain = MockChain::new();
        chain.push_gas_error();
        let mut confirmer = ScriptedConfirmer::new([true]);

        let outcome = execute(
            &chain,
            &NetworkConfig::default(),
            &mut confirmer,
            Approval::Required,
            &ActionRequest::ClaimRewards,
        )
        .await;

        assert!(matches!(outcome, TransactionOutcome::Failed { .. }));
        assert!(confirmer.previews.is_empty());
        assert!(chain.submitted().is_empty());
    }

    #[tokio::test]
    async fn revert_maps_to_failed() {
        let chain = MockChain::new();
        chain.push_inclusion(Err(ChainError::Revert));
        let mut confirmer = ScriptedConfirmer::new([true]);

        let outcome = execute(
            &chain,
            &NetworkConfig::default(),
            &mut confirmer,
            Approval::Required,
            &stake("0.1"),
        )
        .await;

        match outcome {
            TransactionOutcome::Failed { reason } => assert!(reason.contains("reverted")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn stalled_inclusion_reports_timed_out_not_failed() {
        let chain = MockChain::new();
        chain.push_inclusion(Err(ChainError::Timeout));
        let mut confirmer = ScriptedConfirmer::new([true]);

        let outcome = execute(
            &chain,
            &NetworkConfig::default(),
            &mut confirmer,
            Approval::Required,
            &stake("0.1"),
        )
        .await;

        assert_eq!(
            outcome,
            TransactionOutcome::TimedOut {
                tx_hash: B256::with_last_byte(1)
            }
        );
    }
}
