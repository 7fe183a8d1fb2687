//! Session state and its presentation snapshot
//!
//! [`Session`] is the orchestrator's sole mutable entity; everything else in
//! the crate either rebuilds it wholesale or reads an immutable [`Snapshot`]
//! projected from it. The contract handle stays inside the session so
//! consumers can never issue calls behind the orchestrator's back.

use std::sync::Arc;

use alloy::primitives::{Address, U256};

use crate::config::{CollectionConfig, NetworkConfig};
use crate::error::Notice;
use crate::provider::ContractProxy;

/// Network identity as reported by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub chain_id: u64,
    pub name: String,
}

/// On-chain supply counters as of the last synchronization pass.
///
/// Stale the moment it is read; the contract is the source of truth and a
/// fresh pass is the only way to observe newer counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupplyState {
    pub total_supply: u64,
    pub max_supply: u64,
    pub max_per_tx: u64,
}

/// Sale phase flags mirrored from the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleFlags {
    pub paused: bool,
    pub whitelist_phase: bool,
}

impl Default for SaleFlags {
    fn default() -> Self {
        // a collection is paused until the contract says otherwise
        Self {
            paused: true,
            whitelist_phase: false,
        }
    }
}

/// The orchestrator's single mutable entity.
pub(crate) struct Session {
    pub connected_address: Option<Address>,
    pub network: Option<NetworkInfo>,
    pub active_network: NetworkConfig,
    pub supply: SupplyState,
    pub price: U256,
    pub flags: SaleFlags,
    pub caller_whitelisted: bool,
    pub last_error: Option<Notice>,
    pub contract: Option<Arc<dyn ContractProxy>>,
}

impl Session {
    /// A fresh disconnected session. The active network defaults to the
    /// configured mainnet until the provider reports otherwise.
    pub fn new(config: &CollectionConfig) -> Self {
        Self {
            connected_address: None,
            network: None,
            active_network: config.mainnet.clone(),
            supply: SupplyState::default(),
            price: U256::ZERO,
            flags: SaleFlags::default(),
            caller_whitelisted: false,
            last_error: None,
            contract: None,
        }
    }

    /// Project the read-only view handed to the presentation layer.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            connected_address: self.connected_address,
            network: self.network.clone(),
            active_network: self.active_network.clone(),
            supply: self.supply,
            price: self.price,
            flags: self.flags,
            caller_whitelisted: self.caller_whitelisted,
            last_error: self.last_error.clone(),
            contract_bound: self.contract.is_some(),
        }
    }
}

/// Immutable view of the session for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub connected_address: Option<Address>,
    pub network: Option<NetworkInfo>,
    pub active_network: NetworkConfig,
    pub supply: SupplyState,
    pub price: U256,
    pub flags: SaleFlags,
    pub caller_whitelisted: bool,
    pub last_error: Option<Notice>,
    /// Whether a contract handle is currently bound.
    pub contract_bound: bool,
}

impl Snapshot {
    pub fn wallet_connected(&self) -> bool {
        self.connected_address.is_some()
    }

    /// Whether every token has been minted. False until supply is synced.
    pub fn sold_out(&self) -> bool {
        self.supply.max_supply != 0 && self.supply.total_supply >= self.supply.max_supply
    }

    /// Total payment for minting `amount` tokens at the synced unit price.
    pub fn payment_for(&self, amount: u64) -> U256 {
        self.price.saturating_mul(U256::from(amount))
    }
}
