//! Live JSON-RPC implementations of the session capability traits
//!
//! A local signer plus an HTTP provider stand in for the browser wallet:
//! account authorization is immediate (the signer already holds the key),
//! network identity and bytecode probes go to the node, and the bound
//! contract is the generated client below.

use std::sync::Arc;

use alloy::{
    primitives::{Address, Bytes, TxHash, B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    sol,
};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use mintgate_lib::{ContractProxy, NetworkInfo, ProviderError, WalletEvent, WalletProvider};

sol! {
    #[sol(rpc)]
    contract MintContract {
        function maxSupply() external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function maxMintAmountPerTx() external view returns (uint256);
        function cost() external view returns (uint256);
        function paused() external view returns (bool);
        function whitelistMintEnabled() external view returns (bool);
        function mint(uint256 amount) external payable;
        function whitelistMint(uint256 amount, bytes32[] calldata proof) external payable;
    }
}

fn rpc_error(err: impl std::fmt::Display) -> ProviderError {
    ProviderError::new(err.to_string())
}

fn network_name(chain_id: u64) -> String {
    match chain_id {
        1 => "mainnet".to_string(),
        5 => "goerli".to_string(),
        11155111 => "sepolia".to_string(),
        other => format!("chain-{other}"),
    }
}

/// Wallet capability backed by a JSON-RPC node and a local signer.
pub struct RpcWallet {
    provider: DynProvider,
    account: Address,
}

impl RpcWallet {
    /// Connect to `rpc_url` with `signer` paying for transactions.
    pub async fn connect(rpc_url: &str, signer: PrivateKeySigner) -> Result<Self, ProviderError> {
        let account = signer.address();
        debug!(%account, rpc_url, "connecting wallet provider");
        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect(rpc_url)
            .await
            .map_err(rpc_error)?
            .erased();
        Ok(Self { provider, account })
    }

    /// The account the local signer controls.
    pub fn account(&self) -> Address {
        self.account
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    fn is_expected_wallet(&self) -> bool {
        // a local signer is always the wallet we asked for
        true
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        // no consent prompt to raise on a local signer
        Ok(vec![self.account])
    }

    async fn list_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        Ok(vec![self.account])
    }

    async fn network(&self) -> Result<NetworkInfo, ProviderError> {
        let chain_id = self.provider.get_chain_id().await.map_err(rpc_error)?;
        Ok(NetworkInfo {
            chain_id,
            name: network_name(chain_id),
        })
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ProviderError> {
        self.provider.get_code_at(address).await.map_err(rpc_error)
    }

    async fn bind_contract(
        &self,
        address: Address,
        _account: Address,
    ) -> Result<Arc<dyn ContractProxy>, ProviderError> {
        debug!(%address, "binding collection contract");
        Ok(Arc::new(RpcContract {
            inner: MintContract::new(address, self.provider.clone()),
        }))
    }

    fn subscribe_events(&self) -> mpsc::UnboundedReceiver<WalletEvent> {
        // a JSON-RPC wallet has no account or chain notifications to push
        let (_tx, rx) = mpsc::unbounded_channel();
        rx
    }
}

/// Bound collection contract over the generated RPC client.
pub struct RpcContract {
    inner: MintContract::MintContractInstance<DynProvider>,
}

#[async_trait]
impl ContractProxy for RpcContract {
    async fn max_supply(&self) -> Result<u64, ProviderError> {
        let value = self.inner.maxSupply().call().await.map_err(rpc_error)?;
        Ok(value.saturating_to())
    }

    async fn total_supply(&self) -> Result<u64, ProviderError> {
        let value = self.inner.totalSupply().call().await.map_err(rpc_error)?;
        Ok(value.saturating_to())
    }

    async fn max_mint_amount_per_tx(&self) -> Result<u64, ProviderError> {
        let value = self
            .inner
            .maxMintAmountPerTx()
            .call()
            .await
            .map_err(rpc_error)?;
        Ok(value.saturating_to())
    }

    async fn cost(&self) -> Result<U256, ProviderError> {
        self.inner.cost().call().await.map_err(rpc_error)
    }

    async fn paused(&self) -> Result<bool, ProviderError> {
        self.inner.paused().call().await.map_err(rpc_error)
    }

    async fn whitelist_mint_enabled(&self) -> Result<bool, ProviderError> {
        self.inner
            .whitelistMintEnabled()
            .call()
            .await
            .map_err(rpc_error)
    }

    async fn mint(&self, amount: u64, value: U256) -> Result<TxHash, ProviderError> {
        let pending = self
            .inner
            .mint(U256::from(amount))
            .value(value)
            .send()
            .await
            .map_err(rpc_error)?;
        Ok(*pending.tx_hash())
    }

    async fn whitelist_mint(
        &self,
        amount: u64,
        proof: Vec<B256>,
        value: U256,
    ) -> Result<TxHash, ProviderError> {
        let pending = self
            .inner
            .whitelistMint(U256::from(amount), proof)
            .value(value)
            .send()
            .await
            .map_err(rpc_error)?;
        Ok(*pending.tx_hash())
    }
}
