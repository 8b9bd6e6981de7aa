use alloy::network::EthereumWallet;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::{reqwest, Http};
use alloy::primitives::Address;
use log::debug;
use rand::Rng;
use std::fs;
use std::time::Duration;
use url::Url;

use crate::config::{Config, NetworkConfig};

// Header sent when routing through a proxy, so the endpoint sees an
// ordinary browser client.
const PROXY_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(thiserror::Error, Debug)]
pub enum ConnectError {
    #[error("PRIVATE_KEY not set in the environment")]
    MissingCredential,

    #[error("PRIVATE_KEY is not a valid private key: {0}")]
    InvalidCredential(String),

    #[error("invalid rpc url {0:?}: {1}")]
    InvalidRpcUrl(String, String),

    #[error("invalid proxy entry {0:?}: {1}")]
    InvalidProxy(String, String),

    #[error("rpc endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("chain id mismatch: expected {expected}, endpoint reports {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },
}

/// Proxy endpoints loaded once at startup. Empty means direct connection.
pub struct ProxyPool {
    entries: Vec<String>,
}

impl ProxyPool {
    pub fn load(path: &str) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => {
                let entries: Vec<String> = content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();
                if entries.is_empty() {
                    println!("No proxies found in {}. Running without proxy.", path);
                }
                Self { entries }
            }
            Err(_) => {
                println!("Proxy file {} not readable. Running without proxy.", path);
                Self { entries: Vec::new() }
            }
        }
    }

    /// One entry drawn uniformly at random, or none for a direct connection.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.entries.len());
        Some(self.entries[index].clone())
    }
}

/// Bare `host:port` entries get an http scheme before use.
pub fn normalize_proxy(entry: &str) -> String {
    if entry.starts_with("http://") || entry.starts_with("https://") {
        entry.to_string()
    } else {
        format!("http://{}", entry)
    }
}

/// One chain handle bound to the operator's signing identity. The sole
/// writer of outbound transactions for the process lifetime.
pub struct Session {
    pub provider: DynProvider,
    pub address: Address,
    pub network: NetworkConfig,
    pub proxy: Option<String>,
    pub receipt_timeout: Duration,
}

impl Session {
    pub async fn connect<R: Rng + ?Sized>(
        config: &Config,
        pool: &ProxyPool,
        rng: &mut R,
    ) -> Result<Self, ConnectError> {
        let key = std::env::var("PRIVATE_KEY").map_err(|_| ConnectError::MissingCredential)?;
        let signer: PrivateKeySigner = key
            .trim()
            .parse()
            .map_err(|e| ConnectError::InvalidCredential(format!("{}", e)))?;
        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let rpc_url: Url = config.network.rpc_url.parse().map_err(|e| {
            ConnectError::InvalidRpcUrl(config.network.rpc_url.clone(), format!("{}", e))
        })?;

        let proxy = pool.pick(rng);
        let provider = match &proxy {
            Some(entry) => {
                let proxy_url = normalize_proxy(entry);
                Url::parse(&proxy_url)
                    .map_err(|e| ConnectError::InvalidProxy(entry.clone(), format!("{}", e)))?;
                debug!("routing rpc traffic through {}", proxy_url);
                let client = reqwest::Client::builder()
                    .proxy(
                        reqwest::Proxy::all(&proxy_url).map_err(|e| {
                            ConnectError::InvalidProxy(entry.clone(), format!("{}", e))
                        })?,
                    )
                    .user_agent(PROXY_USER_AGENT)
                    .build()
                    .map_err(|e| ConnectError::InvalidProxy(entry.clone(), format!("{}", e)))?;
                let transport = Http::with_client(client, rpc_url);
                ProviderBuilder::new()
                    .wallet(wallet)
                    .connect_client(RpcClient::new(transport, false))
                    .erased()
            }
            None => ProviderBuilder::new()
                .wallet(wallet)
                .connect_http(rpc_url)
                .erased(),
        };

        // One round trip before anything is signed: prove the endpoint is
        // reachable and actually serves the configured chain.
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| ConnectError::Unreachable(e.to_string()))?;
        if chain_id != config.network.chain_id {
            return Err(ConnectError::ChainIdMismatch {
                expected: config.network.chain_id,
                actual: chain_id,
            });
        }

        Ok(Self {
            provider,
            address,
            network: config.network.clone(),
            proxy,
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
        })
    }
}
