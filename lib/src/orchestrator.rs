//! Wallet and contract session lifecycle
//!
//! [`SessionOrchestrator`] owns the session and sequences provider
//! discovery, wallet connection, network validation, contract binding,
//! state synchronization, and mint dispatch. Consumers read immutable
//! [`Snapshot`]s; every failure is folded into the session's single error
//! slot instead of propagating.
//!
//! Synchronization is all-or-nothing and latest-wins: each pass takes a
//! ticket from a monotonic counter and publishes its result only while its
//! ticket is still the newest, so a pass superseded by a fresh account or
//! chain notification discards its work instead of overwriting newer state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::CollectionConfig;
use crate::error::{Notice, ProviderError, SyncError};
use crate::provider::{ContractProxy, WalletEvent, WalletProvider};
use crate::session::{SaleFlags, Session, Snapshot, SupplyState};
use crate::whitelist::Whitelist;

/// Shown when no injected wallet, or the wrong one, is present.
pub const WALLET_NOT_DETECTED: &str = "Wallet not detected";

/// Shown when a mint is dispatched before a contract is bound.
pub const CONTRACT_NOT_READY: &str = "Contract is not ready";

/// Advisory shown for any whitelist mint failure, replacing raw diagnostics.
pub const WHITELIST_CLAIM_ADVISORY: &str =
    "Address has already claimed whitelist. Please wait for public sale";

/// Single owner of the minting session.
///
/// Cheap to share behind an [`Arc`]; all methods take `&self` and the
/// session lock is never held across an await point.
pub struct SessionOrchestrator {
    config: CollectionConfig,
    whitelist: Whitelist,
    provider: Mutex<Option<Arc<dyn WalletProvider>>>,
    events: Mutex<Option<mpsc::UnboundedReceiver<WalletEvent>>>,
    session: Mutex<Session>,
    sync_seq: AtomicU64,
    connect_pending: AtomicBool,
}

impl SessionOrchestrator {
    /// A fresh orchestrator in the default disconnected state. The
    /// whitelist tree is committed once, up front, from the configuration.
    pub fn new(config: CollectionConfig) -> Self {
        let whitelist = Whitelist::new(&config.whitelist_addresses);
        let session = Session::new(&config);
        Self {
            config,
            whitelist,
            provider: Mutex::new(None),
            events: Mutex::new(None),
            session: Mutex::new(session),
            sync_seq: AtomicU64::new(0),
            connect_pending: AtomicBool::new(false),
        }
    }

    /// Probe the execution environment for the expected wallet provider.
    ///
    /// Absence, or a provider that fails the capability probe, records a
    /// notice and leaves the session disconnected; nothing further is
    /// attempted automatically. On success the provider handle is stored
    /// and its event stream is subscribed, exactly once per instance.
    pub fn discover(&self, provider: Option<Arc<dyn WalletProvider>>) {
        let Some(provider) = provider.filter(|p| p.is_expected_wallet()) else {
            warn!("expected wallet provider not detected");
            self.session.lock().last_error = Some(Notice::plain(WALLET_NOT_DETECTED));
            return;
        };

        let mut slot = self.provider.lock();
        if slot.is_none() {
            *self.events.lock() = Some(provider.subscribe_events());
            *slot = Some(provider);
            debug!("wallet provider attached");
        }
    }

    /// Whether a provider survived discovery.
    pub fn provider_attached(&self) -> bool {
        self.provider.lock().is_some()
    }

    /// Current immutable view of the session.
    pub fn snapshot(&self) -> Snapshot {
        self.session.lock().snapshot()
    }

    /// Static configuration backing this session.
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// The whitelist oracle backing this collection.
    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Request account authorization from the wallet, then rebuild the
    /// session. A second call while one is pending is a no-op; concurrent
    /// consent prompts are undefined behavior on the provider side. A
    /// rejection stores the provider's message and mutates nothing else.
    pub async fn connect(&self) -> Snapshot {
        if self.connect_pending.swap(true, Ordering::SeqCst) {
            debug!("connect already pending, ignoring");
            return self.snapshot();
        }

        match self.current_provider() {
            None => {
                self.session.lock().last_error = Some(Notice::plain(WALLET_NOT_DETECTED));
            }
            Some(provider) => match provider.request_accounts().await {
                Ok(_) => {
                    self.sync().await;
                }
                Err(err) => {
                    warn!(error = %err, "wallet connection failed");
                    self.session.lock().last_error = Some(Notice::from_provider(&err));
                }
            },
        }

        self.connect_pending.store(false, Ordering::SeqCst);
        self.snapshot()
    }

    /// Single authoritative rebuild of the session from live provider,
    /// contract, and whitelist queries.
    ///
    /// The pass resets the session to defaults first, then queries
    /// accounts, validates the network, probes and binds the contract, and
    /// joins the collection reads. Any failing step fails the whole pass
    /// with one reported notice and a default session; a pass superseded by
    /// a newer one discards its result.
    pub async fn sync(&self) -> Snapshot {
        let ticket = self.sync_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(ticket, "synchronization pass started");
        self.publish(ticket, Session::new(&self.config));

        let Some(provider) = self.current_provider() else {
            let mut next = Session::new(&self.config);
            next.last_error = Some(Notice::plain(WALLET_NOT_DETECTED));
            self.publish(ticket, next);
            return self.snapshot();
        };

        let next = match self.rebuild(provider.as_ref()).await {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "synchronization failed");
                let mut next = Session::new(&self.config);
                next.last_error = Some(err.notice());
                next
            }
        };

        if !self.publish(ticket, next) {
            debug!(ticket, "synchronization pass superseded, result discarded");
        }
        self.snapshot()
    }

    /// Fold one wallet notification into the session. Account and chain
    /// changes both trigger a fresh synchronization pass.
    pub async fn handle_event(&self, event: WalletEvent) -> Snapshot {
        match &event {
            WalletEvent::AccountsChanged(accounts) => {
                debug!(count = accounts.len(), "account set changed");
            }
            WalletEvent::ChainChanged(chain_id) => debug!(chain_id, "chain changed"),
        }
        self.sync().await
    }

    /// Pump the provider's event stream until it closes. For hosts that let
    /// the orchestrator own its subscription; hosts with their own event
    /// plumbing call [`Self::handle_event`] directly.
    pub async fn run_event_loop(&self) {
        let receiver = self.events.lock().take();
        let Some(mut receiver) = receiver else { return };
        while let Some(event) = receiver.recv().await {
            self.handle_event(event).await;
        }
    }

    /// Return the session to its default disconnected state.
    pub fn reset(&self) {
        // taking a ticket fences out any in-flight pass
        let ticket = self.sync_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(ticket, Session::new(&self.config));
    }

    /// Dispatch a public mint of `amount` tokens, attaching the unit price
    /// times `amount` as payment. Resolves on submission acknowledgment;
    /// supply counters are not updated optimistically, so callers rerun
    /// [`Self::sync`] to observe post-mint state. `None` means the failure
    /// was recorded in the error slot.
    pub async fn mint_public(&self, amount: u64) -> Option<TxHash> {
        let (contract, payment) = self.bound_contract(amount)?;

        match contract.mint(amount, payment).await {
            Ok(tx_hash) => {
                debug!(%tx_hash, amount, "mint submitted");
                Some(tx_hash)
            }
            Err(err) => {
                warn!(error = %err, "mint failed");
                self.session.lock().last_error = Some(Notice::from_provider(&err));
                None
            }
        }
    }

    /// Dispatch a whitelist mint of `amount` tokens, carrying the caller's
    /// Merkle membership proof. Any failure, from a missing proof to a
    /// reverted call, surfaces as the fixed claim advisory rather than the
    /// raw diagnostic.
    pub async fn mint_whitelist(&self, amount: u64) -> Option<TxHash> {
        let (contract, payment) = self.bound_contract(amount)?;

        let proof = self
            .connected_address()
            .and_then(|address| self.whitelist.proof_for(&address));
        let outcome = match proof {
            Some(proof) => contract.whitelist_mint(amount, proof, payment).await,
            None => Err(ProviderError::new("no whitelist proof for connected address")),
        };

        match outcome {
            Ok(tx_hash) => {
                debug!(%tx_hash, amount, "whitelist mint submitted");
                Some(tx_hash)
            }
            Err(err) => {
                warn!(error = %err, "whitelist mint failed");
                self.session.lock().last_error = Some(Notice::plain(WHITELIST_CLAIM_ADVISORY));
                None
            }
        }
    }

    /// Clear the error slot without retriggering synchronization.
    pub fn clear_error(&self) {
        self.session.lock().last_error = None;
    }

    /// Store a plain text message, normalized with a leading capital.
    pub fn report_text(&self, message: &str) {
        self.session.lock().last_error = Some(Notice::plain(message));
    }

    /// Store a pre-rendered fragment verbatim, bypassing normalization.
    pub fn report_markup(&self, fragment: impl Into<String>) {
        self.session.lock().last_error = Some(Notice::markup(fragment));
    }

    /// Install `next` as the session iff `ticket` is still the newest pass.
    fn publish(&self, ticket: u64, next: Session) -> bool {
        let mut session = self.session.lock();
        if self.sync_seq.load(Ordering::SeqCst) != ticket {
            return false;
        }
        *session = next;
        true
    }

    async fn rebuild(&self, provider: &dyn WalletProvider) -> Result<Session, SyncError> {
        let mut session = Session::new(&self.config);

        let accounts = provider.list_accounts().await?;
        let Some(address) = accounts.first().copied() else {
            debug!("no authorized accounts, session stays disconnected");
            return Ok(session);
        };

        let network = provider.network().await?;
        let Some(active) = self.config.network_for_chain(network.chain_id) else {
            return Err(SyncError::UnsupportedNetwork);
        };
        let active = active.clone();

        let code = provider.code_at(self.config.contract_address).await?;
        if code.is_empty() {
            return Err(SyncError::ContractMissing);
        }

        let contract = provider
            .bind_contract(self.config.contract_address, address)
            .await?;

        let (max_supply, total_supply, max_per_tx, price, paused, whitelist_phase) = tokio::try_join!(
            contract.max_supply(),
            contract.total_supply(),
            contract.max_mint_amount_per_tx(),
            contract.cost(),
            contract.paused(),
            contract.whitelist_mint_enabled(),
        )?;

        session.connected_address = Some(address);
        session.network = Some(network);
        session.active_network = active;
        session.supply = SupplyState {
            total_supply,
            max_supply,
            max_per_tx,
        };
        session.price = price;
        session.flags = SaleFlags {
            paused,
            whitelist_phase,
        };
        session.caller_whitelisted = self.whitelist.contains(&address);
        session.contract = Some(contract);
        Ok(session)
    }

    /// The bound contract and the payment for `amount`, or a recorded
    /// not-ready notice.
    fn bound_contract(&self, amount: u64) -> Option<(Arc<dyn ContractProxy>, U256)> {
        let mut session = self.session.lock();
        match session.contract.clone() {
            Some(contract) => {
                let payment = session.price.saturating_mul(U256::from(amount));
                Some((contract, payment))
            }
            None => {
                session.last_error = Some(Notice::plain(CONTRACT_NOT_READY));
                None
            }
        }
    }

    fn connected_address(&self) -> Option<Address> {
        self.session.lock().connected_address
    }

    fn current_provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.provider.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BlockExplorerConfig, MarketplaceConfig, NetworkConfig};
    use crate::session::NetworkInfo;
    use alloy::primitives::{Bytes, B256};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    const MAX_SUPPLY: u64 = 2300;
    const UNIT_PRICE: u64 = 10_000;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn test_config(whitelist_addresses: Vec<Address>) -> CollectionConfig {
        CollectionConfig {
            token_name: "Test Collection".to_string(),
            token_symbol: "TST".to_string(),
            max_supply: MAX_SUPPLY,
            mainnet: NetworkConfig {
                chain_id: 1,
                name: "mainnet".to_string(),
                block_explorer: BlockExplorerConfig {
                    name: "Etherscan".to_string(),
                    base_url: "https://etherscan.io".to_string(),
                },
            },
            testnet: NetworkConfig {
                chain_id: 5,
                name: "goerli".to_string(),
                block_explorer: BlockExplorerConfig {
                    name: "Etherscan (Goerli)".to_string(),
                    base_url: "https://goerli.etherscan.io".to_string(),
                },
            },
            contract_address: addr(0x42),
            marketplace_identifier: "test-collection".to_string(),
            marketplace: MarketplaceConfig {
                name: "OpenSea".to_string(),
                collection_base_url: "https://opensea.io/collection".to_string(),
                testnet_collection_base_url: "https://testnets.opensea.io/collection".to_string(),
            },
            whitelist_addresses,
        }
    }

    #[derive(Clone)]
    struct MockContract {
        total_supply: u64,
        fail_total_supply: bool,
        mint_error: Option<ProviderError>,
        whitelist_mint_error: Option<ProviderError>,
        mints: Arc<Mutex<Vec<(u64, U256)>>>,
        whitelist_mints: Arc<Mutex<Vec<(u64, Vec<B256>, U256)>>>,
    }

    impl MockContract {
        fn healthy() -> Self {
            Self {
                total_supply: 120,
                fail_total_supply: false,
                mint_error: None,
                whitelist_mint_error: None,
                mints: Arc::new(Mutex::new(Vec::new())),
                whitelist_mints: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl ContractProxy for MockContract {
        async fn max_supply(&self) -> Result<u64, ProviderError> {
            Ok(MAX_SUPPLY)
        }

        async fn total_supply(&self) -> Result<u64, ProviderError> {
            if self.fail_total_supply {
                Err(ProviderError::new("execution reverted"))
            } else {
                Ok(self.total_supply)
            }
        }

        async fn max_mint_amount_per_tx(&self) -> Result<u64, ProviderError> {
            Ok(2)
        }

        async fn cost(&self) -> Result<U256, ProviderError> {
            Ok(U256::from(UNIT_PRICE))
        }

        async fn paused(&self) -> Result<bool, ProviderError> {
            Ok(false)
        }

        async fn whitelist_mint_enabled(&self) -> Result<bool, ProviderError> {
            Ok(true)
        }

        async fn mint(&self, amount: u64, value: U256) -> Result<TxHash, ProviderError> {
            if let Some(err) = &self.mint_error {
                return Err(err.clone());
            }
            self.mints.lock().push((amount, value));
            Ok(B256::repeat_byte(0xaa))
        }

        async fn whitelist_mint(
            &self,
            amount: u64,
            proof: Vec<B256>,
            value: U256,
        ) -> Result<TxHash, ProviderError> {
            if let Some(err) = &self.whitelist_mint_error {
                return Err(err.clone());
            }
            self.whitelist_mints.lock().push((amount, proof, value));
            Ok(B256::repeat_byte(0xbb))
        }
    }

    struct MockWallet {
        expected: bool,
        accounts: Mutex<Vec<Address>>,
        chain_id: Mutex<u64>,
        code: Mutex<Bytes>,
        contract: MockContract,
        request_error: Option<ProviderError>,
        request_calls: AtomicUsize,
        request_gate: Option<Arc<Notify>>,
        // when set, the first list_accounts call waits on the gate after
        // capturing its answer, signalling `entered` first
        accounts_gate: Option<Arc<Notify>>,
        entered: Arc<Notify>,
        gated_calls: AtomicUsize,
    }

    impl MockWallet {
        fn healthy(account: Address) -> Self {
            Self {
                expected: true,
                accounts: Mutex::new(vec![account]),
                chain_id: Mutex::new(1),
                code: Mutex::new(Bytes::from_static(&[0x60, 0x80, 0x60, 0x40])),
                contract: MockContract::healthy(),
                request_error: None,
                request_calls: AtomicUsize::new(0),
                request_gate: None,
                accounts_gate: None,
                entered: Arc::new(Notify::new()),
                gated_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WalletProvider for MockWallet {
        fn is_expected_wallet(&self) -> bool {
            self.expected
        }

        async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
            self.request_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.request_gate {
                self.entered.notify_one();
                gate.notified().await;
            }
            if let Some(err) = &self.request_error {
                return Err(err.clone());
            }
            Ok(self.accounts.lock().clone())
        }

        async fn list_accounts(&self) -> Result<Vec<Address>, ProviderError> {
            let accounts = self.accounts.lock().clone();
            if let Some(gate) = &self.accounts_gate {
                if self.gated_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    self.entered.notify_one();
                    gate.notified().await;
                }
            }
            Ok(accounts)
        }

        async fn network(&self) -> Result<NetworkInfo, ProviderError> {
            let chain_id = *self.chain_id.lock();
            let name = match chain_id {
                1 => "mainnet".to_string(),
                5 => "goerli".to_string(),
                other => format!("chain-{other}"),
            };
            Ok(NetworkInfo { chain_id, name })
        }

        async fn code_at(&self, _address: Address) -> Result<Bytes, ProviderError> {
            Ok(self.code.lock().clone())
        }

        async fn bind_contract(
            &self,
            _address: Address,
            _account: Address,
        ) -> Result<Arc<dyn ContractProxy>, ProviderError> {
            Ok(Arc::new(self.contract.clone()))
        }

        fn subscribe_events(&self) -> mpsc::UnboundedReceiver<WalletEvent> {
            let (_tx, rx) = mpsc::unbounded_channel();
            rx
        }
    }

    fn orchestrator_with(wallet: MockWallet, whitelist: Vec<Address>) -> Arc<SessionOrchestrator> {
        let orchestrator = Arc::new(SessionOrchestrator::new(test_config(whitelist)));
        orchestrator.discover(Some(Arc::new(wallet)));
        orchestrator
    }

    #[tokio::test]
    async fn test_discover_without_provider_reports_missing_wallet() {
        let orchestrator = SessionOrchestrator::new(test_config(Vec::new()));
        orchestrator.discover(None);

        assert!(!orchestrator.provider_attached());
        let snapshot = orchestrator.snapshot();
        assert_eq!(
            snapshot.last_error,
            Some(Notice::Plain(WALLET_NOT_DETECTED.to_string()))
        );
        assert!(!snapshot.wallet_connected());
    }

    #[tokio::test]
    async fn test_discover_rejects_unexpected_wallet() {
        let mut wallet = MockWallet::healthy(addr(0x01));
        wallet.expected = false;

        let orchestrator = SessionOrchestrator::new(test_config(Vec::new()));
        orchestrator.discover(Some(Arc::new(wallet)));

        assert!(!orchestrator.provider_attached());
        assert_eq!(
            orchestrator.snapshot().last_error,
            Some(Notice::Plain(WALLET_NOT_DETECTED.to_string()))
        );
    }

    #[tokio::test]
    async fn test_connect_builds_full_session() {
        let account = addr(0x01);
        let orchestrator = orchestrator_with(MockWallet::healthy(account), vec![account]);

        let snapshot = orchestrator.connect().await;

        assert_eq!(snapshot.connected_address, Some(account));
        assert_eq!(snapshot.network.as_ref().map(|n| n.chain_id), Some(1));
        assert_eq!(snapshot.active_network.name, "mainnet");
        assert_eq!(snapshot.supply.max_supply, MAX_SUPPLY);
        assert_eq!(snapshot.supply.total_supply, 120);
        assert_eq!(snapshot.supply.max_per_tx, 2);
        assert_eq!(snapshot.price, U256::from(UNIT_PRICE));
        assert!(!snapshot.flags.paused);
        assert!(snapshot.flags.whitelist_phase);
        assert!(snapshot.caller_whitelisted);
        assert!(snapshot.contract_bound);
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test]
    async fn test_connect_rejection_extracts_nested_message() {
        let mut wallet = MockWallet::healthy(addr(0x01));
        wallet.request_error = Some(
            ProviderError::new("request failed")
                .with_nested(ProviderError::new("user rejected the request")),
        );
        let orchestrator = orchestrator_with(wallet, Vec::new());

        let snapshot = orchestrator.connect().await;

        assert_eq!(
            snapshot.last_error,
            Some(Notice::Plain("User rejected the request".to_string()))
        );
        // nothing else was mutated
        assert!(!snapshot.wallet_connected());
        assert!(!snapshot.contract_bound);
        assert_eq!(snapshot.supply, SupplyState::default());
    }

    #[tokio::test]
    async fn test_connect_is_noop_while_pending() {
        let gate = Arc::new(Notify::new());
        let mut wallet = MockWallet::healthy(addr(0x01));
        wallet.request_gate = Some(gate.clone());
        let entered = wallet.entered.clone();
        let request_calls = Arc::new(wallet);
        let orchestrator = Arc::new(SessionOrchestrator::new(test_config(Vec::new())));
        orchestrator.discover(Some(request_calls.clone()));

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.connect().await })
        };
        entered.notified().await;

        // second call returns without a second consent prompt
        orchestrator.connect().await;
        assert_eq!(request_calls.request_calls.load(Ordering::SeqCst), 1);

        gate.notify_one();
        let snapshot = first.await.expect("first connect completes");
        assert_eq!(snapshot.connected_address, Some(addr(0x01)));
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let account = addr(0x01);
        let orchestrator = orchestrator_with(MockWallet::healthy(account), vec![account]);

        let first = orchestrator.sync().await;
        let second = orchestrator.sync().await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_sync_without_accounts_stays_disconnected() {
        let wallet = MockWallet::healthy(addr(0x01));
        *wallet.accounts.lock() = Vec::new();
        let orchestrator = orchestrator_with(wallet, Vec::new());

        let snapshot = orchestrator.sync().await;

        assert!(!snapshot.wallet_connected());
        assert!(snapshot.last_error.is_none());
        assert!(!snapshot.contract_bound);
    }

    #[tokio::test]
    async fn test_unsupported_network_rejected_without_binding() {
        let wallet = MockWallet::healthy(addr(0x01));
        *wallet.chain_id.lock() = 1337;
        let orchestrator = orchestrator_with(wallet, Vec::new());

        let snapshot = orchestrator.sync().await;

        assert_eq!(
            snapshot.last_error,
            Some(Notice::Plain("Unsupported network!".to_string()))
        );
        assert!(!snapshot.contract_bound);
        assert!(!snapshot.wallet_connected());
    }

    #[tokio::test]
    async fn test_missing_contract_code_fails_sync() {
        let wallet = MockWallet::healthy(addr(0x01));
        *wallet.code.lock() = Bytes::new();
        let orchestrator = orchestrator_with(wallet, Vec::new());

        let snapshot = orchestrator.sync().await;

        assert_eq!(
            snapshot.last_error,
            Some(Notice::Plain(
                "Could not find the contract, are you connected to the right chain?".to_string()
            ))
        );
        assert!(!snapshot.contract_bound);
    }

    #[tokio::test]
    async fn test_failed_read_leaves_no_partial_state() {
        let mut wallet = MockWallet::healthy(addr(0x01));
        wallet.contract.fail_total_supply = true;
        let orchestrator = orchestrator_with(wallet, Vec::new());

        let snapshot = orchestrator.sync().await;

        // all-or-nothing: no field of the failed pass leaks through
        assert_eq!(snapshot.supply, SupplyState::default());
        assert_eq!(snapshot.price, U256::ZERO);
        assert!(snapshot.flags.paused);
        assert!(!snapshot.contract_bound);
        assert_eq!(
            snapshot.last_error,
            Some(Notice::Plain("Execution reverted".to_string()))
        );
    }

    #[tokio::test]
    async fn test_account_change_rebuilds_and_clears_error() {
        let first = addr(0x01);
        let second = addr(0x02);
        let wallet = Arc::new(MockWallet::healthy(first));
        let orchestrator = Arc::new(SessionOrchestrator::new(test_config(Vec::new())));
        orchestrator.discover(Some(wallet.clone()));

        orchestrator.sync().await;
        orchestrator.report_text("stale notice");

        // the wallet switches accounts, then the notification lands
        *wallet.accounts.lock() = vec![second];
        let snapshot = orchestrator
            .handle_event(WalletEvent::AccountsChanged(vec![second]))
            .await;

        assert_eq!(snapshot.connected_address, Some(second));
        assert!(snapshot.last_error.is_none());
        assert!(snapshot.contract_bound);
    }

    #[tokio::test]
    async fn test_chain_change_triggers_fresh_pass() {
        let account = addr(0x01);
        let wallet = Arc::new(MockWallet::healthy(account));
        let orchestrator = Arc::new(SessionOrchestrator::new(test_config(Vec::new())));
        orchestrator.discover(Some(wallet.clone()));

        let before = orchestrator.sync().await;
        assert_eq!(before.active_network.name, "mainnet");

        *wallet.chain_id.lock() = 5;
        let snapshot = orchestrator.handle_event(WalletEvent::ChainChanged(5)).await;

        assert_eq!(snapshot.active_network.name, "goerli");
        assert_eq!(snapshot.network.as_ref().map(|n| n.chain_id), Some(5));
    }

    #[tokio::test]
    async fn test_superseded_pass_discards_result() {
        let first = addr(0x01);
        let second = addr(0x02);
        let gate = Arc::new(Notify::new());
        let mut wallet = MockWallet::healthy(first);
        wallet.accounts_gate = Some(gate.clone());
        let entered = wallet.entered.clone();
        let wallet = Arc::new(wallet);
        let orchestrator = Arc::new(SessionOrchestrator::new(test_config(Vec::new())));
        orchestrator.discover(Some(wallet.clone()));

        // pass 1 captures the old account set, then stalls
        let stalled = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.sync().await })
        };
        entered.notified().await;

        // the account switches and pass 2 runs to completion
        *wallet.accounts.lock() = vec![second];
        let fresh = orchestrator
            .handle_event(WalletEvent::AccountsChanged(vec![second]))
            .await;
        assert_eq!(fresh.connected_address, Some(second));

        // pass 1 resumes with its stale account and must not publish
        gate.notify_one();
        stalled.await.expect("stalled pass completes");

        assert_eq!(orchestrator.snapshot().connected_address, Some(second));
    }

    #[tokio::test]
    async fn test_reset_returns_defaults() {
        let account = addr(0x01);
        let orchestrator = orchestrator_with(MockWallet::healthy(account), Vec::new());

        let synced = orchestrator.sync().await;
        assert!(synced.contract_bound);

        orchestrator.reset();
        let snapshot = orchestrator.snapshot();

        assert!(!snapshot.wallet_connected());
        assert!(!snapshot.contract_bound);
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test]
    async fn test_mint_public_attaches_payment() {
        let account = addr(0x01);
        let wallet = MockWallet::healthy(account);
        let mints = wallet.contract.mints.clone();
        let orchestrator = orchestrator_with(wallet, Vec::new());
        orchestrator.sync().await;

        let tx_hash = orchestrator.mint_public(2).await;

        assert!(tx_hash.is_some());
        let recorded = mints.lock().clone();
        assert_eq!(recorded, vec![(2, U256::from(UNIT_PRICE * 2))]);
        assert!(orchestrator.snapshot().last_error.is_none());
    }

    #[tokio::test]
    async fn test_mint_public_error_uses_extraction_precedence() {
        let mut wallet = MockWallet::healthy(addr(0x01));
        wallet.contract.mint_error = Some(
            ProviderError::new("B").with_nested(ProviderError::new("A")),
        );
        let orchestrator = orchestrator_with(wallet, Vec::new());
        orchestrator.sync().await;

        let tx_hash = orchestrator.mint_public(1).await;

        assert!(tx_hash.is_none());
        assert_eq!(
            orchestrator.snapshot().last_error,
            Some(Notice::Plain("A".to_string()))
        );
    }

    #[tokio::test]
    async fn test_mint_without_binding_reports_not_ready() {
        let orchestrator = SessionOrchestrator::new(test_config(Vec::new()));

        let tx_hash = orchestrator.mint_public(1).await;

        assert!(tx_hash.is_none());
        assert_eq!(
            orchestrator.snapshot().last_error,
            Some(Notice::Plain(CONTRACT_NOT_READY.to_string()))
        );
    }

    #[tokio::test]
    async fn test_whitelist_mint_carries_proof() {
        let account = addr(0x01);
        let other = addr(0x02);
        let wallet = MockWallet::healthy(account);
        let whitelist_mints = wallet.contract.whitelist_mints.clone();
        let orchestrator = orchestrator_with(wallet, vec![account, other]);
        orchestrator.sync().await;

        let tx_hash = orchestrator.mint_whitelist(1).await;

        assert!(tx_hash.is_some());
        let expected_proof = orchestrator
            .whitelist()
            .proof_for(&account)
            .expect("member has a proof");
        let recorded = whitelist_mints.lock().clone();
        assert_eq!(recorded, vec![(1, expected_proof, U256::from(UNIT_PRICE))]);
    }

    #[tokio::test]
    async fn test_whitelist_mint_failure_collapses_to_advisory() {
        let account = addr(0x01);
        let mut wallet = MockWallet::healthy(account);
        wallet.contract.whitelist_mint_error = Some(
            ProviderError::new("execution reverted: invalid proof")
                .with_nested(ProviderError::new("very specific revert data")),
        );
        let orchestrator = orchestrator_with(wallet, vec![account]);
        orchestrator.sync().await;

        let tx_hash = orchestrator.mint_whitelist(1).await;

        assert!(tx_hash.is_none());
        assert_eq!(
            orchestrator.snapshot().last_error,
            Some(Notice::Plain(WHITELIST_CLAIM_ADVISORY.to_string()))
        );
    }

    #[tokio::test]
    async fn test_whitelist_mint_for_non_member_uses_advisory() {
        let account = addr(0x01);
        let orchestrator = orchestrator_with(MockWallet::healthy(account), Vec::new());
        orchestrator.sync().await;

        let tx_hash = orchestrator.mint_whitelist(1).await;

        assert!(tx_hash.is_none());
        assert_eq!(
            orchestrator.snapshot().last_error,
            Some(Notice::Plain(WHITELIST_CLAIM_ADVISORY.to_string()))
        );
    }

    #[tokio::test]
    async fn test_error_slot_holds_one_message() {
        let orchestrator = SessionOrchestrator::new(test_config(Vec::new()));

        orchestrator.report_text("first problem");
        orchestrator.report_text("second problem");
        assert_eq!(
            orchestrator.snapshot().last_error,
            Some(Notice::Plain("Second problem".to_string()))
        );

        orchestrator.report_markup("<em>as-is</em>");
        assert_eq!(
            orchestrator.snapshot().last_error,
            Some(Notice::Markup("<em>as-is</em>".to_string()))
        );

        orchestrator.clear_error();
        assert!(orchestrator.snapshot().last_error.is_none());
    }
}
