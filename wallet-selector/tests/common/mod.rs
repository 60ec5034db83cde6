//! Shared test doubles for the selector and adapter tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use wallet_selector::account::Account;
use wallet_selector::error::{Error, Result};
use wallet_selector::events::{EventEmitter, Subscription, WalletEvent};
use wallet_selector::provider::{
    InjectedProvider, ProviderEvent, ProviderEventHandler, ProviderEventKind,
    ProviderSubscriptionId, ProviderTransactionResponse, SignInParams, SignInResponse,
    SignOutResponse, WalletEnvironment,
};
use wallet_selector::transaction::{
    TransactionOutcome, TransactionRequest, TransactionStatus,
};
use wallet_selector::wallet::{
    HardwareSignInParams, HardwareWallet, Wallet, WalletFactory, WalletMetadata, WalletModule,
    WalletType,
};

type SharedHandler =
    Arc<dyn Fn(ProviderEvent) -> futures::future::BoxFuture<'static, ()> + Send + Sync>;

#[derive(Default)]
struct MockProviderState {
    signed_in: bool,
    account_id: Option<String>,
    public_key: Option<String>,
    network_id: String,
}

/// Scriptable injected provider handle.
///
/// Records every round trip so tests can assert which provider calls were
/// (or were not) issued.
pub struct MockProvider {
    state: Mutex<MockProviderState>,
    sign_in_response: Mutex<SignInResponse>,
    sign_out_response: Mutex<SignOutResponse>,
    transaction_response: Mutex<ProviderTransactionResponse>,
    calls: Mutex<Vec<String>>,
    submitted: Mutex<Vec<TransactionRequest>>,
    next_subscription: Mutex<ProviderSubscriptionId>,
    handlers: Mutex<Vec<(ProviderEventKind, ProviderSubscriptionId, SharedHandler)>>,
}

impl MockProvider {
    /// Provider on the given network, not signed in, granting sign-in
    /// requests and signing out successfully by default
    pub fn new(network_id: &str) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MockProviderState {
                network_id: network_id.to_string(),
                ..MockProviderState::default()
            }),
            sign_in_response: Mutex::new(SignInResponse {
                access_key: Some(serde_json::json!("ed25519:mock-access-key")),
                error: None,
            }),
            sign_out_response: Mutex::new(SignOutResponse {
                success: true,
                error: None,
            }),
            transaction_response: Mutex::new(ProviderTransactionResponse {
                error: None,
                response: Some(vec![TransactionOutcome {
                    transaction_hash: "mock-tx-hash".to_string(),
                    status: TransactionStatus::Succeeded,
                }]),
            }),
            calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            next_subscription: Mutex::new(0),
            handlers: Mutex::new(Vec::new()),
        })
    }

    /// Provider that already holds a signed-in session for `account_id`
    pub fn signed_in(network_id: &str, account_id: &str) -> Arc<Self> {
        let provider = Self::new(network_id);
        provider.set_signed_in(true);
        provider.set_account(account_id, Some("ed25519:mock-public-key"));
        provider
    }

    pub fn set_signed_in(&self, signed_in: bool) {
        self.state.lock().unwrap().signed_in = signed_in;
    }

    pub fn set_account(&self, account_id: &str, public_key: Option<&str>) {
        let mut state = self.state.lock().unwrap();
        state.account_id = Some(account_id.to_string());
        state.public_key = public_key.map(|key| key.to_string());
    }

    pub fn set_sign_in_response(&self, response: SignInResponse) {
        *self.sign_in_response.lock().unwrap() = response;
    }

    pub fn set_sign_out_response(&self, response: SignOutResponse) {
        *self.sign_out_response.lock().unwrap() = response;
    }

    pub fn set_transaction_response(&self, response: ProviderTransactionResponse) {
        *self.transaction_response.lock().unwrap() = response;
    }

    /// Round trips issued so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Transaction requests the provider received, in order
    pub fn submitted(&self) -> Vec<TransactionRequest> {
        self.submitted.lock().unwrap().clone()
    }

    /// Number of live callback registrations
    pub fn handler_count(&self) -> usize {
        self.handlers.lock().unwrap().len()
    }

    /// Deliver a provider-level event to every matching registered handler
    pub async fn fire(&self, event: ProviderEvent) {
        let kind = match &event {
            ProviderEvent::AccountChanged { .. } => ProviderEventKind::AccountChanged,
            ProviderEvent::RpcChanged { .. } => ProviderEventKind::RpcChanged,
        };
        // Snapshot so handlers may unsubscribe while running.
        let handlers: Vec<SharedHandler> = self
            .handlers
            .lock()
            .unwrap()
            .iter()
            .filter(|(registered, _, _)| *registered == kind)
            .map(|(_, _, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(event.clone()).await;
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl InjectedProvider for MockProvider {
    fn is_signed_in(&self) -> bool {
        self.state.lock().unwrap().signed_in
    }

    fn account_id(&self) -> Option<String> {
        self.state.lock().unwrap().account_id.clone()
    }

    fn public_key(&self) -> Option<String> {
        self.state.lock().unwrap().public_key.clone()
    }

    fn network_id(&self) -> String {
        self.state.lock().unwrap().network_id.clone()
    }

    async fn request_sign_in(&self, _params: SignInParams) -> SignInResponse {
        self.record("request_sign_in");
        let response = self.sign_in_response.lock().unwrap().clone();
        if response.access_key.is_some() && response.error.is_none() {
            self.state.lock().unwrap().signed_in = true;
        }
        response
    }

    async fn sign_out(&self) -> SignOutResponse {
        self.record("sign_out");
        let response = self.sign_out_response.lock().unwrap().clone();
        if response.success && response.error.is_none() {
            self.state.lock().unwrap().signed_in = false;
        }
        response
    }

    async fn sign_and_send_transaction(
        &self,
        request: TransactionRequest,
    ) -> ProviderTransactionResponse {
        self.record("sign_and_send_transaction");
        self.submitted.lock().unwrap().push(request);
        self.transaction_response.lock().unwrap().clone()
    }

    async fn request_sign_transactions(
        &self,
        requests: Vec<TransactionRequest>,
    ) -> ProviderTransactionResponse {
        self.record("request_sign_transactions");
        self.submitted.lock().unwrap().extend(requests);
        self.transaction_response.lock().unwrap().clone()
    }

    fn subscribe(
        &self,
        kind: ProviderEventKind,
        handler: ProviderEventHandler,
    ) -> ProviderSubscriptionId {
        let mut next = self.next_subscription.lock().unwrap();
        let id = *next;
        *next += 1;
        self.handlers
            .lock()
            .unwrap()
            .push((kind, id, Arc::from(handler)));
        id
    }

    fn unsubscribe(&self, id: ProviderSubscriptionId) {
        self.handlers
            .lock()
            .unwrap()
            .retain(|(_, subscription, _)| *subscription != id);
    }
}

/// Execution environment with a controllable injected handle
pub struct MockEnvironment {
    mobile: bool,
    wallet: Mutex<Option<Arc<dyn InjectedProvider>>>,
}

impl MockEnvironment {
    /// Desktop environment with the given provider already injected
    pub fn with_wallet(provider: Arc<MockProvider>) -> Arc<Self> {
        Arc::new(Self {
            mobile: false,
            wallet: Mutex::new(Some(provider)),
        })
    }

    /// Desktop environment where no extension ever loads
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            mobile: false,
            wallet: Mutex::new(None),
        })
    }

    /// Mobile environment; injected wallets are never available here
    pub fn mobile() -> Arc<Self> {
        Arc::new(Self {
            mobile: true,
            wallet: Mutex::new(None),
        })
    }

    /// Simulate the extension finishing injection
    pub fn inject(&self, provider: Arc<dyn InjectedProvider>) {
        *self.wallet.lock().unwrap() = Some(provider);
    }
}

impl WalletEnvironment for MockEnvironment {
    fn is_mobile(&self) -> bool {
        self.mobile
    }

    fn injected_wallet(&self) -> Option<Arc<dyn InjectedProvider>> {
        self.wallet.lock().unwrap().clone()
    }
}

/// Scripted injected-type wallet for controller-level tests.
///
/// Appends its operations to a shared log so tests can assert ordering
/// across wallets.
pub struct MockInjectedWallet {
    metadata: WalletMetadata,
    connected: AtomicBool,
    fail_disconnect: AtomicBool,
    log: Arc<Mutex<Vec<String>>>,
}

impl MockInjectedWallet {
    pub fn new(id: &str, log: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            metadata: WalletMetadata {
                id: id.to_string(),
                name: id.to_string(),
                wallet_type: WalletType::Injected,
                download_url: format!("https://example.com/{}", id),
                icon: None,
            },
            connected: AtomicBool::new(false),
            fail_disconnect: AtomicBool::new(false),
            log,
        })
    }

    /// Roster factory handing out this exact instance
    pub fn module(wallet: Arc<Self>) -> WalletFactory {
        Box::new(move |_context| Ok(WalletModule::Injected(wallet.clone())))
    }

    pub fn set_fail_disconnect(&self, fail: bool) {
        self.fail_disconnect.store(fail, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn push(&self, operation: &str) {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.metadata.id, operation));
    }
}

#[async_trait]
impl Wallet for MockInjectedWallet {
    fn metadata(&self) -> &WalletMetadata {
        &self.metadata
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn is_signed_in(&self) -> bool {
        self.is_connected()
    }

    async fn connect(&self) -> Result<Vec<Account>> {
        self.push("connect");
        self.connected.store(true, Ordering::SeqCst);
        Ok(vec![Account {
            account_id: format!("{}.near", self.metadata.id),
            public_key: None,
        }])
    }

    async fn disconnect(&self) -> Result<()> {
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(Error::ProviderRejected(format!(
                "{} refused to sign out",
                self.metadata.id
            )));
        }
        self.push("disconnect");
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn get_accounts(&self) -> Vec<Account> {
        if self.is_connected() {
            vec![Account {
                account_id: format!("{}.near", self.metadata.id),
                public_key: None,
            }]
        } else {
            Vec::new()
        }
    }

    async fn sign_and_send_transaction(
        &self,
        _request: TransactionRequest,
    ) -> Result<TransactionOutcome> {
        if !self.is_connected() {
            return Err(Error::NotConnected(self.metadata.name.clone()));
        }
        Ok(TransactionOutcome {
            transaction_hash: format!("{}-tx", self.metadata.id),
            status: TransactionStatus::Succeeded,
        })
    }

    async fn sign_and_send_transactions(
        &self,
        requests: Vec<TransactionRequest>,
    ) -> Result<Vec<TransactionOutcome>> {
        if !self.is_connected() {
            return Err(Error::NotConnected(self.metadata.name.clone()));
        }
        Ok(requests
            .iter()
            .map(|_| TransactionOutcome {
                transaction_hash: format!("{}-tx", self.metadata.id),
                status: TransactionStatus::Succeeded,
            })
            .collect())
    }
}

/// Hardware-type wallet requiring explicit sign-in parameters
pub struct MockHardwareWallet {
    metadata: WalletMetadata,
    session: Mutex<Option<HardwareSignInParams>>,
}

impl MockHardwareWallet {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            metadata: WalletMetadata {
                id: "ledger".to_string(),
                name: "Ledger".to_string(),
                wallet_type: WalletType::Hardware,
                download_url: "https://www.ledger.com".to_string(),
                icon: None,
            },
            session: Mutex::new(None),
        })
    }

    /// Roster factory handing out this exact instance
    pub fn module(wallet: Arc<Self>) -> WalletFactory {
        Box::new(move |_context| Ok(WalletModule::Hardware(wallet.clone())))
    }

    /// Parameters used by the last successful sign-in, if any
    pub fn session(&self) -> Option<HardwareSignInParams> {
        self.session.lock().unwrap().clone()
    }
}

#[async_trait]
impl Wallet for MockHardwareWallet {
    fn metadata(&self) -> &WalletMetadata {
        &self.metadata
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn is_signed_in(&self) -> bool {
        self.session.lock().unwrap().is_some()
    }

    async fn connect(&self) -> Result<Vec<Account>> {
        Err(Error::InvalidSelection(
            "Ledger requires an account id and derivation path".to_string(),
        ))
    }

    async fn disconnect(&self) -> Result<()> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }

    async fn get_accounts(&self) -> Vec<Account> {
        self.session
            .lock()
            .unwrap()
            .as_ref()
            .map(|params| {
                vec![Account {
                    account_id: params.account_id.clone(),
                    public_key: None,
                }]
            })
            .unwrap_or_default()
    }

    async fn sign_and_send_transaction(
        &self,
        _request: TransactionRequest,
    ) -> Result<TransactionOutcome> {
        if self.session.lock().unwrap().is_none() {
            return Err(Error::NotConnected(self.metadata.name.clone()));
        }
        Ok(TransactionOutcome {
            transaction_hash: "ledger-tx".to_string(),
            status: TransactionStatus::Succeeded,
        })
    }

    async fn sign_and_send_transactions(
        &self,
        requests: Vec<TransactionRequest>,
    ) -> Result<Vec<TransactionOutcome>> {
        if self.session.lock().unwrap().is_none() {
            return Err(Error::NotConnected(self.metadata.name.clone()));
        }
        Ok(requests
            .iter()
            .map(|_| TransactionOutcome {
                transaction_hash: "ledger-tx".to_string(),
                status: TransactionStatus::Succeeded,
            })
            .collect())
    }
}

#[async_trait]
impl HardwareWallet for MockHardwareWallet {
    async fn connect_with(&self, params: HardwareSignInParams) -> Result<Vec<Account>> {
        let account = Account {
            account_id: params.account_id.clone(),
            public_key: None,
        };
        *self.session.lock().unwrap() = Some(params);
        Ok(vec![account])
    }
}

/// Record every emitted wallet event; keep the subscription alive for the
/// duration of the test
pub fn record_events(emitter: &EventEmitter) -> (Arc<Mutex<Vec<WalletEvent>>>, Subscription) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let subscription = emitter.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    (events, subscription)
}
