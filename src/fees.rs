use alloy::primitives::utils::{format_ether, parse_ether};
use alloy::primitives::U256;
use anyhow::{bail, Result};

use crate::chain::{Chain, ChainError};

/// Advisory cost quote for one call. The chain enforces the real cost at
/// inclusion time; the gas units here are a fixed ceiling, not a measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeQuote {
    pub gas_price_wei: u128,
    pub gas_units: u64,
    pub total_wei: U256,
}

/// Quotes the cost of one call at the current gas price. The price is
/// fetched fresh on every call; quotes are never reused because the price
/// drifts block to block.
pub async fn estimate(chain: &dyn Chain, gas_units: u64) -> Result<FeeQuote, ChainError> {
    let gas_price_wei = chain.gas_price().await?;
    let total_wei = U256::from(gas_price_wei) * U256::from(gas_units);
    Ok(FeeQuote {
        gas_price_wei,
        gas_units,
        total_wei,
    })
}

/// Renders a wei amount in native units without trailing zeros.
pub fn format_native(wei: U256) -> String {
    let text = format_ether(wei);
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Gas price in gwei with two decimals, for the banner.
pub fn format_gwei(gas_price_wei: u128) -> String {
    format!("{:.2}", gas_price_wei as f64 / 1e9)
}

/// Parses an operator-entered native amount into wei. Rejects zero,
/// negative, and malformed input.
pub fn parse_native(input: &str) -> Result<U256> {
    let text = input.trim();
    if text.starts_with('-') {
        bail!("amount must be greater than zero");
    }
    let wei = match parse_ether(text) {
        Ok(wei) => wei,
        Err(e) => bail!("invalid amount {:?}: {}", text, e),
    };
    if wei.is_zero() {
        bail!("amount must be greater than zero");
    }
    Ok(wei)
}
