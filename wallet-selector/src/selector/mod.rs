//! Wallet selection controller
//!
//! Owns the roster of configured wallet modules, enforces the
//! single-active-wallet invariant and reconciles the persisted selection
//! with live wallet state at startup.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::account::Account;
use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::events::EventEmitter;
use crate::state::{SelectionState, SelectionStateView};
use crate::storage::{StorageBackend, SELECTED_WALLET_KEY};
use crate::provider::WalletEnvironment;
use crate::transaction::{TransactionOutcome, TransactionRequest};
use crate::wallet::{
    HardwareSignInParams, HardwareWallet, ModuleContext, Wallet, WalletFactory, WalletMetadata,
    WalletModule,
};

/// Selector configuration
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Network shared with every wallet module
    pub network: NetworkConfig,
}

/// Sign-in request routed to one roster wallet
#[derive(Debug, Clone, Default)]
pub struct SignInRequest {
    /// Wallet to sign in with
    pub wallet_id: String,
    /// Account to sign in as; required for hardware wallets
    pub account_id: Option<String>,
    /// Key derivation path; required for hardware wallets
    pub derivation_path: Option<String>,
}

impl SignInRequest {
    /// Request for a wallet that needs no extra parameters
    pub fn new(wallet_id: impl Into<String>) -> Self {
        Self {
            wallet_id: wallet_id.into(),
            ..Self::default()
        }
    }
}

/// Wallet selection controller.
///
/// The sole coordinator between the host application and the configured
/// wallet modules; modules never talk to each other.
pub struct WalletSelector {
    modules: Vec<WalletModule>,
    storage: Arc<dyn StorageBackend>,
    state: SelectionState,
    emitter: EventEmitter,
}

impl WalletSelector {
    /// Build one module per configured factory, injecting the shared
    /// collaborators. Factories receive no reference to the controller.
    pub fn new(
        config: SelectorConfig,
        environment: Arc<dyn WalletEnvironment>,
        storage: Arc<dyn StorageBackend>,
        factories: Vec<WalletFactory>,
    ) -> Result<Self> {
        let emitter = EventEmitter::new();
        let context = ModuleContext {
            network: config.network,
            emitter: emitter.clone(),
            storage: storage.clone(),
            environment,
        };

        let mut modules = Vec::with_capacity(factories.len());
        for factory in &factories {
            let module = factory(&context)?;
            if modules
                .iter()
                .any(|existing: &WalletModule| existing.id() == module.id())
            {
                return Err(Error::InvalidSelection(format!(
                    "duplicate wallet id in roster: {}",
                    module.id()
                )));
            }
            modules.push(module);
        }

        Ok(Self {
            modules,
            storage,
            state: SelectionState::new(),
            emitter,
        })
    }

    /// Lifecycle event channel shared with every module
    pub fn events(&self) -> &EventEmitter {
        &self.emitter
    }

    /// Read-only view of the current selection
    pub fn state(&self) -> SelectionStateView {
        self.state.view()
    }

    /// Roster metadata, in registration order
    pub fn wallets(&self) -> Vec<&WalletMetadata> {
        self.modules.iter().map(|module| module.metadata()).collect()
    }

    /// Reconcile the persisted selection with live wallet state.
    ///
    /// This is the only path that marks a wallet active without a fresh
    /// sign-in. A persisted id naming an unknown or not-signed-in wallet is
    /// purged, never silently kept.
    pub async fn init(&self) -> Result<()> {
        let persisted = match self.storage.get(SELECTED_WALLET_KEY)? {
            Some(persisted) => persisted,
            None => return Ok(()),
        };

        let module = match self.module(&persisted) {
            Some(module) => module,
            None => {
                warn!("persisted wallet {} is not in the roster, purging", persisted);
                return self.storage.remove(SELECTED_WALLET_KEY);
            }
        };

        let wallet = module.as_wallet();
        if let Err(error) = wallet.init().await {
            debug!("persisted wallet {} failed to initialize: {}", persisted, error);
        }

        if wallet.is_signed_in().await {
            debug!("restored persisted selection: {}", persisted);
            self.state.select(&persisted);
            Ok(())
        } else {
            warn!("persisted wallet {} is not signed in, purging", persisted);
            self.storage.remove(SELECTED_WALLET_KEY)
        }
    }

    /// Sign in with the named wallet.
    ///
    /// A different currently-selected wallet is fully signed out first; its
    /// failure aborts the new sign-in and keeps the old selection. Signing
    /// in with the already-active wallet is a no-op.
    pub async fn sign_in(&self, request: SignInRequest) -> Result<Vec<Account>> {
        let module = self.module(&request.wallet_id).ok_or_else(|| {
            Error::InvalidSelection(format!("unknown wallet id: {}", request.wallet_id))
        })?;

        // Validate hardware parameters before any side effects.
        let hardware_params = match module {
            WalletModule::Hardware(_) => Some(HardwareSignInParams {
                account_id: request.account_id.clone().ok_or_else(|| {
                    Error::InvalidSelection(format!(
                        "wallet {} requires an account id to sign in",
                        request.wallet_id
                    ))
                })?,
                derivation_path: request.derivation_path.clone().ok_or_else(|| {
                    Error::InvalidSelection(format!(
                        "wallet {} requires a derivation path to sign in",
                        request.wallet_id
                    ))
                })?,
            }),
            WalletModule::Injected(_) => None,
        };

        if self.state.selected().as_deref() == Some(request.wallet_id.as_str()) {
            // Already active: avoid duplicate sign-in side effects.
            return Ok(module.as_wallet().get_accounts().await);
        }

        if let Some(previous_id) = self.state.selected() {
            let previous = self.module(&previous_id).ok_or_else(|| {
                Error::InvalidSelection(format!("selected wallet {} is not in the roster", previous_id))
            })?;
            debug!(
                "signing out {} before activating {}",
                previous_id, request.wallet_id
            );
            previous.as_wallet().disconnect().await?;
            self.state.clear();
            self.storage.remove(SELECTED_WALLET_KEY)?;
        }

        let accounts = match (module, hardware_params) {
            (WalletModule::Hardware(wallet), Some(params)) => wallet.connect_with(params).await?,
            (WalletModule::Injected(wallet), _) => wallet.connect().await?,
            // Hardware params are extracted above whenever the module is a
            // hardware variant.
            (WalletModule::Hardware(_), None) => unreachable!(),
        };

        self.storage.set(SELECTED_WALLET_KEY, &request.wallet_id)?;
        self.state.select(&request.wallet_id);
        Ok(accounts)
    }

    /// Sign out of the active wallet. No selection is a normal state and a
    /// no-op, not an error.
    pub async fn sign_out(&self) -> Result<()> {
        let module = match self.selected_module() {
            Some(module) => module,
            None => return Ok(()),
        };

        module.as_wallet().disconnect().await?;
        self.state.clear();
        self.storage.remove(SELECTED_WALLET_KEY)
    }

    /// Whether the active wallet holds a signed-in session
    pub async fn is_signed_in(&self) -> bool {
        match self.selected_module() {
            Some(module) => module.as_wallet().is_signed_in().await,
            None => false,
        }
    }

    /// Accounts visible through the active wallet; empty without a selection
    pub async fn get_accounts(&self) -> Vec<Account> {
        match self.selected_module() {
            Some(module) => module.as_wallet().get_accounts().await,
            None => Vec::new(),
        }
    }

    /// Sign and submit one transaction through the active wallet
    pub async fn sign_and_send_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionOutcome> {
        let module = self.selected_module().ok_or_else(|| {
            Error::NotConnected("no wallet is currently selected".to_string())
        })?;
        module.as_wallet().sign_and_send_transaction(request).await
    }

    /// Sign and submit a batch of transactions through the active wallet
    pub async fn sign_and_send_transactions(
        &self,
        requests: Vec<TransactionRequest>,
    ) -> Result<Vec<TransactionOutcome>> {
        let module = self.selected_module().ok_or_else(|| {
            Error::NotConnected("no wallet is currently selected".to_string())
        })?;
        module.as_wallet().sign_and_send_transactions(requests).await
    }

    fn module(&self, wallet_id: &str) -> Option<&WalletModule> {
        self.modules.iter().find(|module| module.id() == wallet_id)
    }

    fn selected_module(&self) -> Option<&WalletModule> {
        let selected = self.state.selected()?;
        self.module(&selected)
    }
}
