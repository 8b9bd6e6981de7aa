use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{
    PendingTransactionBuilder, PendingTransactionError, Provider, WatchTxError,
};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use async_trait::async_trait;

use crate::network::Session;
use crate::orchestrator::ActionRequest;

sol! {
    #[sol(rpc)]
    contract IStTea {
        function stake() external payable;
        function withdraw(uint256 _amount) external;
        function balanceOf(address owner) external view returns (uint256);
    }
}

// claim() selector, sent pre-encoded; the contract exposes no ABI for it
const CLAIM_CALLDATA: [u8; 4] = [0x3d, 0x18, 0xb9, 0x12];

#[derive(thiserror::Error, Debug)]
pub enum ChainError {
    #[error("rpc: {0}")]
    Rpc(String),

    #[error("transaction reverted on-chain")]
    Revert,

    #[error("timed out waiting for inclusion")]
    Timeout,
}

/// Everything the orchestrator needs from the chain. One implementation
/// talks to the real network through the session; tests script a double.
#[async_trait]
pub trait Chain {
    async fn gas_price(&self) -> Result<u128, ChainError>;

    async fn block_number(&self) -> Result<u64, ChainError>;

    async fn native_balance(&self, address: Address) -> Result<U256, ChainError>;

    async fn staked_balance(&self, address: Address) -> Result<U256, ChainError>;

    /// Signs and broadcasts the call, returning its hash without waiting
    /// for inclusion. The request's gas budget is attached as an explicit
    /// ceiling, never auto-estimated.
    async fn submit(&self, request: &ActionRequest) -> Result<B256, ChainError>;

    /// Blocks until the transaction is mined, bounded by the session's
    /// receipt timeout. Returns the inclusion block number.
    async fn await_inclusion(&self, hash: B256) -> Result<u64, ChainError>;
}

#[async_trait]
impl Chain for Session {
    async fn gas_price(&self) -> Result<u128, ChainError> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn native_balance(&self, address: Address) -> Result<U256, ChainError> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn staked_balance(&self, address: Address) -> Result<U256, ChainError> {
        IStTea::new(self.network.staking_contract, self.provider.clone())
            .balanceOf(address)
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn submit(&self, request: &ActionRequest) -> Result<B256, ChainError> {
        let gas = request.gas_budget();
        match request {
            ActionRequest::Stake { amount } => {
                let contract = IStTea::new(self.network.staking_contract, self.provider.clone());
                let pending = contract
                    .stake()
                    .value(*amount)
                    .gas(gas)
                    .send()
                    .await
                    .map_err(|e| ChainError::Rpc(e.to_string()))?;
                Ok(*pending.tx_hash())
            }
            ActionRequest::Withdraw { amount } => {
                let contract = IStTea::new(self.network.staking_contract, self.provider.clone());
                let pending = contract
                    .withdraw(*amount)
                    .gas(gas)
                    .send()
                    .await
                    .map_err(|e| ChainError::Rpc(e.to_string()))?;
                Ok(*pending.tx_hash())
            }
            ActionRequest::ClaimRewards => {
                let tx = TransactionRequest::default()
                    .with_to(self.network.staking_contract)
                    .with_input(Bytes::from_static(&CLAIM_CALLDATA))
                    .with_gas_limit(gas);
                let pending = self
                    .provider
                    .send_transaction(tx)
                    .await
                    .map_err(|e| ChainError::Rpc(e.to_string()))?;
                Ok(*pending.tx_hash())
            }
            ActionRequest::Transfer { to, amount } => {
                let tx = TransactionRequest::default()
                    .with_to(*to)
                    .with_value(*amount)
                    .with_gas_limit(gas);
                let pending = self
                    .provider
                    .send_transaction(tx)
                    .await
                    .map_err(|e| ChainError::Rpc(e.to_string()))?;
                Ok(*pending.tx_hash())
            }
        }
    }

    async fn await_inclusion(&self, hash: B256) -> Result<u64, ChainError> {
        let pending = PendingTransactionBuilder::new(self.provider.root().clone(), hash)
            .with_timeout(Some(self.receipt_timeout));
        let receipt = match pending.get_receipt().await {
            Ok(receipt) => receipt,
            Err(PendingTransactionError::TxWatcher(WatchTxError::Timeout)) => {
                return Err(ChainError::Timeout)
            }
            Err(e) => return Err(ChainError::Rpc(e.to_string())),
        };
        if !receipt.status() {
            return Err(ChainError::Revert);
        }
        Ok(receipt.block_number.unwrap_or_default())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const DEFAULT_GAS_PRICE: u128 = 10_000_000_000; // 10 gwei
    const DEFAULT_BLOCK: u64 = 42;

    /// Scripted chain double: records every submission and replays queued
    /// gas prices and inclusion results.
    pub struct MockChain {
        gas_prices: Mutex<VecDeque<Result<u128, ChainError>>>,
        inclusions: Mutex<VecDeque<Result<u64, ChainError>>>,
        submissions: Mutex<Vec<ActionRequest>>,
    }

    impl MockChain {
        pub fn new() -> Self {
            Self {
                gas_prices: Mutex::new(VecDeque::new()),
                inclusions: Mutex::new(VecDeque::new()),
                submissions: Mutex::new(Vec::new()),
            }
        }

        pub fn push_gas_price(&self, wei: u128) {
            self.gas_prices.lock().unwrap().push_back(Ok(wei));
        }

        pub fn push_gas_error(&self) {
            self.gas_prices
                .lock()
                .unwrap()
                .push_back(Err(ChainError::Rpc("gas price fetch failed".to_string())));
        }

        pub fn push_inclusion(&self, result: Result<u64, ChainError>) {
            self.inclusions.lock().unwrap().push_back(result);
        }

        pub fn submitted(&self) -> Vec<ActionRequest> {
            self.submissions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Chain for MockChain {
        async fn gas_price(&self) -> Result<u128, ChainError> {
            self.gas_prices
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(DEFAULT_GAS_PRICE))
        }

        async fn block_number(&self) -> Result<u64, ChainError> {
            Ok(DEFAULT_BLOCK)
        }

        async fn native_balance(&self, _address: Address) -> Result<U256, ChainError> {
            Ok(U256::ZERO)
        }

        async fn staked_balance(&self, _address: Address) -> Result<U256, ChainError> {
            Ok(U256::ZERO)
        }

        async fn submit(&self, request: &ActionRequest) -> Result<B256, ChainError> {
            let mut submissions = self.submissions.lock().unwrap();
            submissions.push(request.clone());
            Ok(B256::with_last_byte(submissions.len() as u8))
        }

        async fn await_inclusion(&self, _hash: B256) -> Result<u64, ChainError> {
            self.inclusions
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(DEFAULT_BLOCK))
        }
    }
}
