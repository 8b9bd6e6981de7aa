use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use anyhow::{Result, Context, anyhow};
use alloy::primitives::{address, Address};

/// Chain descriptor, fixed at process start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    // RPC endpoint URL
    pub rpc_url: String,
    pub chain_id: u64,
    // Native currency symbol
    pub symbol: String,
    // Receipt token symbol minted by the staking contract
    pub staked_symbol: String,
    pub explorer: String,
    pub staking_contract: Address,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "Tea Sepolia Testnet".to_string(),
            rpc_url: "https://tea-sepolia.g.alchemy.com/public".to_string(),
            chain_id: 10218,
            symbol: "TEA".to_string(),
            staked_symbol: "stTEA".to_string(),
            explorer: "https://sepolia.tea.xyz".to_string(),
            staking_contract: address!("04290DACdb061C6C9A0B9735556744be49A64012"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferSettings {
    // Amount range in native units, half-open [min, max)
    pub min_amount: f64,
    pub max_amount: f64,
    // Decimal places kept when rounding a drawn amount
    pub precision: u32,
    // Delay window between consecutive batch transfers (milliseconds)
    pub jitter_min_ms: u64,
    pub jitter_max_ms: u64,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            min_amount: 0.0001,
            max_amount: 0.005,
            precision: 8,
            jitter_min_ms: 2000,
            jitter_max_ms: 5000,
        }
    }
}

impl TransferSettings {
    /// Amount bounds as integer precision units, half-open. Rounding both
    /// bounds keeps the scaled range exact under float noise; the sampler
    /// and the validation both go through here so they cannot disagree.
    pub fn unit_range(&self) -> (u64, u64) {
        let scale = 10u64.pow(self.precision) as f64;
        let min_units = (self.min_amount * scale).round() as u64;
        let max_units = (self.max_amount * scale).round() as u64;
        (min_units, max_units)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    // Proxy list file, one host:port or URL per line
    pub proxy_file: String,
    // Upper bound on the inclusion wait for a submitted transaction
    pub receipt_timeout_secs: u64,
    pub transfer: TransferSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            proxy_file: "proxies.txt".to_string(),
            receipt_timeout_secs: 300,
            transfer: TransferSettings::default(),
        }
    }
}

impl Config {
    pub fn load(config_path: &str) -> Result<Self> {
        if let Ok(content) = fs::read_to_string(config_path) {
            let config: Config = serde_json::from_str(&content)
                .context("Failed to parse config file")?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            Ok(config)
        }
    }

    pub fn save(&self, config_path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;

        // Create parent directories if they don't exist
        if let Some(parent) = PathBuf::from(config_path).parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(config_path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let transfer = &self.transfer;
        // Precision first: unit_range scales by 10^precision.
        if transfer.precision == 0 || transfer.precision > 18 {
            return Err(anyhow!("transfer precision must be between 1 and 18 decimals"));
        }
        if !(transfer.min_amount > 0.0 && transfer.min_amount < transfer.max_amount) {
            return Err(anyhow!("transfer amount range must satisfy 0 < min < max"));
        }
        // The sampler draws whole precision units; a range that holds none
        // of them would panic, and a minimum that rounds to zero would
        // allow zero-value transfers.
        let (min_units, max_units) = transfer.unit_range();
        if min_units == 0 {
            return Err(anyhow!(
                "transfer minimum rounds to zero at {} decimals",
                transfer.precision
            ));
        }
        if max_units <= min_units {
            return Err(anyhow!(
                "transfer amount range holds no whole unit at {} decimals",
                transfer.precision
            ));
        }
        if transfer.jitter_min_ms >= transfer.jitter_max_ms {
            return Err(anyhow!("transfer jitter window must satisfy min < max"));
        }
        Ok(())
    }
}
