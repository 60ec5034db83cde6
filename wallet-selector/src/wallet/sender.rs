//! Injected adapter for the Sender browser wallet

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::account::Account;
use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::events::{EventEmitter, WalletEvent};
use crate::provider::{
    InjectedProvider, ProviderEvent, ProviderEventHandler, ProviderEventKind,
    ProviderSubscriptionId, ProviderTransactionResponse, SignInParams, WalletEnvironment,
};
use crate::transaction::{Action, TransactionOutcome, TransactionRequest};

use super::{ModuleContext, Wallet, WalletFactory, WalletMetadata, WalletModule, WalletType};

/// Wallet id under which the module registers in the roster
pub const SENDER_WALLET_ID: &str = "sender";

/// Attempts made while waiting for the extension to inject its handle
const INSTALL_POLL_ATTEMPTS: u32 = 10;
/// Delay between install poll attempts
const INSTALL_POLL_INTERVAL: Duration = Duration::from_millis(300);
/// Attempts made while waiting for the provider to report signed-in
const SIGN_IN_POLL_ATTEMPTS: u32 = 5;
/// Delay between sign-in status poll attempts
const SIGN_IN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Live connection to the injected provider.
///
/// Dropping the session releases the provider callback registrations made
/// when it was established.
struct Session {
    provider: Arc<dyn InjectedProvider>,
    subscriptions: Vec<ProviderSubscriptionId>,
}

struct SenderInner {
    metadata: WalletMetadata,
    network: NetworkConfig,
    emitter: EventEmitter,
    environment: Arc<dyn WalletEnvironment>,
    session: Mutex<Option<Session>>,
}

/// Injected adapter for the Sender browser extension.
///
/// Wraps the provider handle the extension injects into the execution
/// environment and translates its response and error shapes into the
/// uniform wallet contract.
pub struct SenderWallet {
    inner: Arc<SenderInner>,
}

impl SenderWallet {
    /// Build the module from shared collaborators
    pub fn new(context: &ModuleContext) -> Self {
        Self {
            inner: Arc::new(SenderInner {
                metadata: WalletMetadata {
                    id: SENDER_WALLET_ID.to_string(),
                    name: "Sender".to_string(),
                    wallet_type: WalletType::Injected,
                    download_url:
                        "https://chrome.google.com/webstore/detail/sender-wallet/epapihdplajcdnnkdeiahlgigofloibg"
                            .to_string(),
                    icon: None,
                },
                network: context.network.clone(),
                emitter: context.emitter.clone(),
                environment: context.environment.clone(),
                session: Mutex::new(None),
            }),
        }
    }

    /// Factory registering the module in a selector roster
    pub fn factory() -> WalletFactory {
        Box::new(|context| Ok(WalletModule::Injected(Arc::new(SenderWallet::new(context)))))
    }

    /// Poll for the provider handle to appear in the execution environment.
    ///
    /// Installation absence is an expected outcome: returns `false` on
    /// timeout, never errors.
    pub async fn is_installed(&self) -> bool {
        for attempt in 0..INSTALL_POLL_ATTEMPTS {
            if self.inner.environment.injected_wallet().is_some() {
                return true;
            }
            if attempt + 1 < INSTALL_POLL_ATTEMPTS {
                tokio::time::sleep(INSTALL_POLL_INTERVAL).await;
            }
        }
        false
    }

    /// Cache the injected handle, wait for its sign-in status and register
    /// provider callbacks. Returns the cached handle when one exists.
    async fn ensure_session(&self) -> Result<Arc<dyn InjectedProvider>> {
        if let Some(provider) = self.inner.cached_provider() {
            return Ok(provider);
        }

        if !self.is_installed().await {
            return Err(Error::NotInstalled(format!(
                "{} provider not found in this environment",
                self.inner.metadata.name
            )));
        }
        let provider = match self.inner.environment.injected_wallet() {
            Some(provider) => provider,
            None => {
                return Err(Error::NotInstalled(format!(
                    "{} provider not found in this environment",
                    self.inner.metadata.name
                )))
            }
        };

        self.inner.await_signed_in(provider.as_ref()).await;

        let subscriptions = SenderInner::register_callbacks(&self.inner, &provider);
        *self.inner.session.lock().unwrap() = Some(Session {
            provider: provider.clone(),
            subscriptions,
        });

        Ok(provider)
    }

    /// Handle that must be both cached and signed in
    fn connected_provider(&self) -> Result<Arc<dyn InjectedProvider>> {
        self.inner
            .cached_provider()
            .filter(|provider| provider.is_signed_in())
            .ok_or_else(|| {
                Error::NotConnected(format!("{} is not signed in", self.inner.metadata.name))
            })
    }

    /// Every action must be a kind the provider can forward
    fn validate_actions(&self, request: &TransactionRequest) -> Result<()> {
        for action in &request.actions {
            if !matches!(action, Action::FunctionCall { .. }) {
                return Err(Error::UnsupportedAction(format!(
                    "{} does not support {} actions, only function calls",
                    self.inner.metadata.name,
                    action.kind()
                )));
            }
        }
        Ok(())
    }

    fn with_default_signer(&self, mut request: TransactionRequest) -> TransactionRequest {
        if request.signer_id.is_none() {
            request.signer_id = Some(self.inner.network.contract_id.clone());
        }
        request
    }

    /// A successful submission must produce at least one outcome; an empty
    /// or missing response array is a fault even without an explicit
    /// provider error.
    fn normalize_response(
        &self,
        response: ProviderTransactionResponse,
    ) -> Result<Vec<TransactionOutcome>> {
        if let Some(error) = response.error {
            return Err(Error::ProviderRejected(error.describe()));
        }
        match response.response {
            Some(outcomes) if !outcomes.is_empty() => Ok(outcomes),
            _ => Err(Error::InvalidResponse(
                "provider returned an empty transaction response".to_string(),
            )),
        }
    }
}

impl SenderInner {
    fn cached_provider(&self) -> Option<Arc<dyn InjectedProvider>> {
        self.session
            .lock()
            .unwrap()
            .as_ref()
            .map(|session| session.provider.clone())
    }

    /// Drop the cached handle and release its provider callbacks
    fn clear_session(&self) {
        let session = self.session.lock().unwrap().take();
        if let Some(session) = session {
            for id in session.subscriptions {
                session.provider.unsubscribe(id);
            }
        }
    }

    /// Best-effort wait for the provider to report signed-in. A timeout is
    /// treated as "unknown, assume not ready" and absorbed.
    async fn await_signed_in(&self, provider: &dyn InjectedProvider) {
        for attempt in 0..SIGN_IN_POLL_ATTEMPTS {
            if provider.is_signed_in() {
                return;
            }
            if attempt + 1 < SIGN_IN_POLL_ATTEMPTS {
                tokio::time::sleep(SIGN_IN_POLL_INTERVAL).await;
            }
        }
        debug!(
            "{} did not report signed-in before timeout",
            self.metadata.id
        );
    }

    /// Best-effort sign-out used when tearing a session down from a
    /// provider-initiated path; provider refusals are logged, not raised.
    async fn force_disconnect(&self) {
        if let Some(provider) = self.cached_provider() {
            if provider.is_signed_in() {
                let response = provider.sign_out().await;
                if !response.success || response.error.is_some() {
                    warn!(
                        "{} refused sign-out during forced disconnect",
                        self.metadata.id
                    );
                }
            }
        }
        self.clear_session();
    }

    /// Register the account-change and network-change callbacks. Held for
    /// the session lifetime and released with it.
    fn register_callbacks(
        inner: &Arc<SenderInner>,
        provider: &Arc<dyn InjectedProvider>,
    ) -> Vec<ProviderSubscriptionId> {
        let account_handler: ProviderEventHandler = {
            let inner = Arc::downgrade(inner);
            Box::new(move |event: ProviderEvent| {
                let inner = inner.clone();
                async move {
                    let Some(inner) = inner.upgrade() else { return };
                    if let ProviderEvent::AccountChanged { account_id } = event {
                        // An account switch invalidates the session: treat
                        // it as an implicit disconnect.
                        debug!(
                            "{} account changed to {:?}, dropping session",
                            inner.metadata.id, account_id
                        );
                        inner.clear_session();
                        inner.emitter.emit(WalletEvent::Disconnected);
                    }
                }
                .boxed()
            })
        };

        let rpc_handler: ProviderEventHandler = {
            let inner = Arc::downgrade(inner);
            Box::new(move |event: ProviderEvent| {
                let inner = inner.clone();
                async move {
                    let Some(inner) = inner.upgrade() else { return };
                    if let ProviderEvent::RpcChanged { network_id } = event {
                        if network_id != inner.network.network_id {
                            warn!(
                                "{} switched network to {}, disconnecting",
                                inner.metadata.id, network_id
                            );
                            inner.force_disconnect().await;
                            inner.emitter.emit(WalletEvent::NetworkChanged { network_id });
                        }
                    }
                }
                .boxed()
            })
        };

        vec![
            provider.subscribe(ProviderEventKind::AccountChanged, account_handler),
            provider.subscribe(ProviderEventKind::RpcChanged, rpc_handler),
        ]
    }
}

#[async_trait]
impl Wallet for SenderWallet {
    fn metadata(&self) -> &WalletMetadata {
        &self.inner.metadata
    }

    fn is_available(&self) -> bool {
        !self.inner.environment.is_mobile()
    }

    async fn init(&self) -> Result<()> {
        self.ensure_session().await.map(|_| ())
    }

    async fn is_signed_in(&self) -> bool {
        self.inner
            .cached_provider()
            .map(|provider| provider.is_signed_in())
            .unwrap_or(false)
    }

    async fn connect(&self) -> Result<Vec<Account>> {
        // Idempotent reconnect: an existing session with visible accounts is
        // reported as-is, without re-querying sign-in. Stale if the account
        // changed out-of-band without an accountChanged notification; kept
        // pending review.
        if let Some(provider) = self.inner.cached_provider() {
            if provider.is_signed_in() {
                let accounts = self.get_accounts().await;
                if !accounts.is_empty() {
                    self.inner.emitter.emit(WalletEvent::Connected {
                        accounts: accounts.clone(),
                    });
                    return Ok(accounts);
                }
            }
        }

        let provider = self.ensure_session().await?;
        let response = provider
            .request_sign_in(SignInParams {
                contract_id: self.inner.network.contract_id.clone(),
                method_names: self.inner.network.method_names.clone(),
            })
            .await;

        if let Some(error) = response.error {
            self.inner.force_disconnect().await;
            return Err(Error::ProviderRejected(error.describe()));
        }
        if response.access_key.is_none() {
            self.inner.force_disconnect().await;
            return Err(Error::ProviderRejected(
                "sign-in request returned no access grant".to_string(),
            ));
        }

        let accounts = self.get_accounts().await;
        debug!(
            "{} connected with {} account(s)",
            self.inner.metadata.id,
            accounts.len()
        );
        self.inner.emitter.emit(WalletEvent::Connected {
            accounts: accounts.clone(),
        });
        Ok(accounts)
    }

    async fn disconnect(&self) -> Result<()> {
        let provider = match self.inner.cached_provider() {
            Some(provider) => provider,
            None => return Ok(()),
        };

        if !provider.is_signed_in() {
            // Session already gone on the provider side; skip the round trip.
            self.inner.clear_session();
            return Ok(());
        }

        let response = provider.sign_out().await;
        if let Some(error) = response.error {
            return Err(Error::ProviderRejected(error.describe()));
        }
        if !response.success {
            return Err(Error::ProviderRejected(
                "wallet declined the sign-out request".to_string(),
            ));
        }

        self.inner.clear_session();
        self.inner.emitter.emit(WalletEvent::Disconnected);
        Ok(())
    }

    async fn get_accounts(&self) -> Vec<Account> {
        let provider = match self.inner.cached_provider() {
            Some(provider) => provider,
            None => return Vec::new(),
        };
        let account_id = match provider.account_id() {
            Some(account_id) if !account_id.is_empty() => account_id,
            _ => return Vec::new(),
        };
        vec![Account {
            account_id,
            public_key: provider.public_key(),
        }]
    }

    async fn sign_and_send_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionOutcome> {
        let provider = self.connected_provider()?;
        self.validate_actions(&request)?;

        let request = self.with_default_signer(request);
        let response = provider.sign_and_send_transaction(request).await;
        let mut outcomes = self.normalize_response(response)?;
        Ok(outcomes.remove(0))
    }

    async fn sign_and_send_transactions(
        &self,
        requests: Vec<TransactionRequest>,
    ) -> Result<Vec<TransactionOutcome>> {
        let provider = self.connected_provider()?;
        for request in &requests {
            self.validate_actions(request)?;
        }

        let requests = requests
            .into_iter()
            .map(|request| self.with_default_signer(request))
            .collect();
        let response = provider.request_sign_transactions(requests).await;
        self.normalize_response(response)
    }
}
