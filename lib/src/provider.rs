//! Capability boundaries for the wallet provider and the bound contract
//!
//! The orchestrator only ever talks to these traits. The script crate
//! implements them over a JSON-RPC node; tests implement them in memory.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::ProviderError;
use crate::session::NetworkInfo;

/// Notifications pushed by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The authorized account set changed (connect, disconnect, switch).
    AccountsChanged(Vec<Address>),
    /// The wallet moved to a different chain.
    ChainChanged(u64),
}

/// Browser-resident (or locally simulated) wallet holding the user's keys.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Capability probe: whether this is the wallet implementation the
    /// collection expects. Absence of the expected wallet is a normal,
    /// reportable condition, never a fault.
    fn is_expected_wallet(&self) -> bool;

    /// Ask the wallet to authorize accounts, raising its consent prompt.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Accounts currently authorized, without prompting.
    async fn list_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Identity of the chain the wallet is connected to.
    async fn network(&self) -> Result<NetworkInfo, ProviderError>;

    /// Deployed bytecode at `address`; empty when nothing is deployed there.
    async fn code_at(&self, address: Address) -> Result<Bytes, ProviderError>;

    /// Bind the collection contract at `address` with a signer derived from
    /// the connected `account`.
    async fn bind_contract(
        &self,
        address: Address,
        account: Address,
    ) -> Result<Arc<dyn ContractProxy>, ProviderError>;

    /// Stream of account and chain notifications.
    fn subscribe_events(&self) -> mpsc::UnboundedReceiver<WalletEvent>;
}

/// Typed handle bound to the deployed collection contract.
///
/// Read methods mirror the contract's view functions; the two write methods
/// resolve on submission acknowledgment, not confirmation.
#[async_trait]
pub trait ContractProxy: Send + Sync {
    async fn max_supply(&self) -> Result<u64, ProviderError>;

    async fn total_supply(&self) -> Result<u64, ProviderError>;

    async fn max_mint_amount_per_tx(&self) -> Result<u64, ProviderError>;

    /// Unit price per token in wei.
    async fn cost(&self) -> Result<U256, ProviderError>;

    async fn paused(&self) -> Result<bool, ProviderError>;

    async fn whitelist_mint_enabled(&self) -> Result<bool, ProviderError>;

    /// Public mint, `value` attached as payment.
    async fn mint(&self, amount: u64, value: U256) -> Result<TxHash, ProviderError>;

    /// Whitelist mint carrying a Merkle membership proof.
    async fn whitelist_mint(
        &self,
        amount: u64,
        proof: Vec<B256>,
        value: U256,
    ) -> Result<TxHash, ProviderError>;
}
