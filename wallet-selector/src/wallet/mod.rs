//! Wallet module contract
//!
//! Every pluggable wallet module implements the common [`Wallet`] capability
//! set; hardware modules additionally implement [`HardwareWallet`]. The
//! selection controller stores modules as tagged [`WalletModule`] roster
//! entries and checks the capability set before dispatch.

mod sender;

pub use sender::{SenderWallet, SENDER_WALLET_ID};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::config::NetworkConfig;
use crate::error::Result;
use crate::events::EventEmitter;
use crate::provider::WalletEnvironment;
use crate::storage::StorageBackend;
use crate::transaction::{TransactionOutcome, TransactionRequest};

/// Wallet capability type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletType {
    /// Browser-injected wallet
    Injected,
    /// Hardware wallet requiring explicit account selection
    Hardware,
}

/// Immutable wallet module descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletMetadata {
    /// Unique wallet id used for selection and persistence
    pub id: String,
    /// Human-readable wallet name
    pub name: String,
    /// Capability type
    pub wallet_type: WalletType,
    /// Where the user can install the wallet
    pub download_url: String,
    /// Icon reference, when the module ships one
    pub icon: Option<String>,
}

/// Common capability surface every wallet module implements
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Immutable descriptor for this module
    fn metadata(&self) -> &WalletMetadata;

    /// Where the user can install the wallet
    fn download_url(&self) -> String {
        self.metadata().download_url.clone()
    }

    /// Whether the current execution environment can host this wallet.
    /// Pure check, no side effects.
    fn is_available(&self) -> bool;

    /// Prepare the module without user interaction: cache provider handles
    /// and restore any live session state
    async fn init(&self) -> Result<()>;

    /// Whether the wallet currently holds a signed-in session
    async fn is_signed_in(&self) -> bool;

    /// Request sign-in; returns the accounts made visible
    async fn connect(&self) -> Result<Vec<Account>>;

    /// Sign out of the active session
    async fn disconnect(&self) -> Result<()>;

    /// Accounts currently visible; empty when not connected
    async fn get_accounts(&self) -> Vec<Account>;

    /// Sign and submit one transaction
    async fn sign_and_send_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionOutcome>;

    /// Sign and submit a batch of transactions
    async fn sign_and_send_transactions(
        &self,
        requests: Vec<TransactionRequest>,
    ) -> Result<Vec<TransactionOutcome>>;
}

/// Parameters hardware modules require on sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareSignInParams {
    /// Account to sign in as
    pub account_id: String,
    /// Key derivation path on the device
    pub derivation_path: String,
}

/// Additional capability set required of hardware wallet modules
#[async_trait]
pub trait HardwareWallet: Wallet {
    /// Request sign-in for a specific account and derivation path
    async fn connect_with(&self, params: HardwareSignInParams) -> Result<Vec<Account>>;
}

/// Roster entry: one wallet module tagged with its capability set
#[derive(Clone)]
pub enum WalletModule {
    /// Module implementing only the common capability set
    Injected(Arc<dyn Wallet>),
    /// Module implementing the hardware capability set
    Hardware(Arc<dyn HardwareWallet>),
}

impl WalletModule {
    /// Common capability surface, regardless of variant
    pub fn as_wallet(&self) -> &dyn Wallet {
        match self {
            WalletModule::Injected(wallet) => wallet.as_ref(),
            WalletModule::Hardware(wallet) => wallet.as_ref(),
        }
    }

    /// Immutable descriptor for this module
    pub fn metadata(&self) -> &WalletMetadata {
        self.as_wallet().metadata()
    }

    /// Unique wallet id
    pub fn id(&self) -> &str {
        &self.metadata().id
    }
}

/// Collaborators injected into every wallet module factory.
///
/// Modules receive no reference to each other or to the controller.
#[derive(Clone)]
pub struct ModuleContext {
    /// Network the application is configured for
    pub network: NetworkConfig,
    /// Shared lifecycle event channel
    pub emitter: EventEmitter,
    /// Durable key-value storage
    pub storage: Arc<dyn StorageBackend>,
    /// Execution environment hosting injected providers
    pub environment: Arc<dyn WalletEnvironment>,
}

/// Factory building one wallet module from shared collaborators
pub type WalletFactory = Box<dyn Fn(&ModuleContext) -> Result<WalletModule> + Send + Sync>;
