use alloy::primitives::{Address, U256};
use log::warn;

use crate::chain::Chain;
use crate::config::NetworkConfig;
use crate::fees::{format_gwei, format_native};

/// `0x1234...abcd` form used in previews.
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Point-in-time balance report, re-printed after every action whatever
/// its outcome.
pub async fn report(
    chain: &dyn Chain,
    address: Address,
    network: &NetworkConfig,
    proxy: Option<&str>,
) {
    println!("\n===== WALLET INFORMATION =====");
    println!("Your address: {}", address);

    match chain.native_balance(address).await {
        Ok(balance) => {
            println!("{} Balance: {} {}", network.symbol, format_native(balance), network.symbol)
        }
        Err(e) => println!("{} Balance: unavailable ({})", network.symbol, e),
    }

    // The operator may not have staked yet, or the contract read may fail;
    // either way the report still renders.
    let staked = match chain.staked_balance(address).await {
        Ok(balance) => balance,
        Err(e) => {
            warn!("staked balance read failed: {}", e);
            U256::ZERO
        }
    };
    println!(
        "{} Balance: {} {}",
        network.staked_symbol,
        format_native(staked),
        network.staked_symbol
    );

    println!("Using proxy: {}", proxy.unwrap_or("None"));
    println!("=============================\n");
}

/// Startup banner with a best-effort network snapshot.
pub async fn print_banner(chain: &dyn Chain, network: &NetworkConfig) {
    println!("===============================================");
    println!("            {}", network.name);
    match (chain.block_number().await, chain.gas_price().await) {
        (Ok(block), Ok(gas_price)) => {
            println!("        Block: {} | Gas: {} Gwei", block, format_gwei(gas_price))
        }
        _ => println!("        Network status unavailable"),
    }
    println!("===============================================\n");
}
