//! Static collection configuration
//!
//! Everything the session needs to know up front: the supported networks,
//! the deployed contract address, token metadata, the marketplace the
//! collection is listed on, and the whitelisted address set. Configurations
//! are plain serde structs so a deployment can keep them in a JSON file next
//! to the binary.

use std::fs;
use std::path::Path;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chain identifier of the Ethereum mainnet configuration.
pub const MAINNET_CHAIN_ID: u64 = 1;

/// Chain identifier of the Goerli testnet configuration.
pub const TESTNET_CHAIN_ID: u64 = 5;

/// Failure while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Block explorer for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockExplorerConfig {
    /// Display name, e.g. "Etherscan".
    pub name: String,
    /// Base URL without a trailing slash.
    pub base_url: String,
}

impl BlockExplorerConfig {
    /// URL of the contract page for `address`.
    pub fn contract_url(&self, address: Address) -> String {
        format!("{}/address/{}", self.base_url, address)
    }

    /// URL of the transaction page for `tx_hash` (0x-prefixed hex).
    pub fn transaction_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.base_url, tx_hash)
    }
}

/// One supported network: its chain identity plus its block explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub chain_id: u64,
    /// Display name, e.g. "mainnet".
    pub name: String,
    pub block_explorer: BlockExplorerConfig,
}

/// Marketplace the collection is listed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Display name, e.g. "OpenSea".
    pub name: String,
    /// Collection URL prefix on the main network.
    pub collection_base_url: String,
    /// Collection URL prefix on the test network.
    pub testnet_collection_base_url: String,
}

impl MarketplaceConfig {
    /// URL of the collection page for `identifier`.
    pub fn collection_url(&self, identifier: &str, mainnet: bool) -> String {
        let base = if mainnet {
            &self.collection_base_url
        } else {
            &self.testnet_collection_base_url
        };
        format!("{}/{}", base, identifier)
    }
}

/// Full static configuration for one collection deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub token_name: String,
    pub token_symbol: String,
    pub max_supply: u64,
    pub mainnet: NetworkConfig,
    pub testnet: NetworkConfig,
    pub contract_address: Address,
    pub marketplace_identifier: String,
    pub marketplace: MarketplaceConfig,
    /// Addresses committed to the whitelist Merkle tree.
    #[serde(default)]
    pub whitelist_addresses: Vec<Address>,
}

impl CollectionConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The network configuration matching `chain_id`, if it is one of the
    /// two supported networks.
    pub fn network_for_chain(&self, chain_id: u64) -> Option<&NetworkConfig> {
        if chain_id == self.mainnet.chain_id {
            Some(&self.mainnet)
        } else if chain_id == self.testnet.chain_id {
            Some(&self.testnet)
        } else {
            None
        }
    }

    /// Block explorer URL of the deployed contract on `network`.
    pub fn contract_url(&self, network: &NetworkConfig) -> String {
        network.block_explorer.contract_url(self.contract_address)
    }

    /// Marketplace URL of the collection.
    pub fn marketplace_url(&self, mainnet: bool) -> String {
        self.marketplace
            .collection_url(&self.marketplace_identifier, mainnet)
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            token_name: "Mintgate NFT".to_string(),
            token_symbol: "MGT".to_string(),
            max_supply: 2300,
            mainnet: NetworkConfig {
                chain_id: MAINNET_CHAIN_ID,
                name: "mainnet".to_string(),
                block_explorer: BlockExplorerConfig {
                    name: "Etherscan".to_string(),
                    base_url: "https://etherscan.io".to_string(),
                },
            },
            testnet: NetworkConfig {
                chain_id: TESTNET_CHAIN_ID,
                name: "goerli".to_string(),
                block_explorer: BlockExplorerConfig {
                    name: "Etherscan (Goerli)".to_string(),
                    base_url: "https://goerli.etherscan.io".to_string(),
                },
            },
            contract_address: Address::ZERO,
            marketplace_identifier: "mintgate-nft".to_string(),
            marketplace: MarketplaceConfig {
                name: "OpenSea".to_string(),
                collection_base_url: "https://opensea.io/collection".to_string(),
                testnet_collection_base_url: "https://testnets.opensea.io/collection".to_string(),
            },
            whitelist_addresses: Vec::new(),
        }
    }
}
