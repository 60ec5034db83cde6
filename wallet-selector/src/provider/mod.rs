//! Injected provider handle contract
//!
//! An injected provider is the externally-supplied object representing one
//! wallet extension or service. Adapters own the only live reference to
//! their provider handle; this module fixes the wire shapes the handle must
//! expose so adapters can normalize them into the uniform contract.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::transaction::{TransactionOutcome, TransactionRequest};

/// Structured failure reported by a provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    /// Provider-specific error code or type tag
    pub kind: Option<String>,
    /// Human-readable message
    pub message: Option<String>,
}

impl ProviderFailure {
    /// Flatten into a message for uniform errors, with a generic fallback
    /// when the provider reported nothing usable
    pub fn describe(&self) -> String {
        match (&self.kind, &self.message) {
            (Some(kind), Some(message)) => format!("{}: {}", kind, message),
            (Some(kind), None) => kind.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) => "wallet rejected the request".to_string(),
        }
    }
}

/// Sign-in request forwarded to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInParams {
    /// Contract the access grant is requested for
    pub contract_id: String,
    /// Contract methods the granted key may call (empty = all)
    pub method_names: Vec<String>,
}

/// Provider response to a sign-in request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignInResponse {
    /// Access grant issued by the provider, opaque to this crate
    pub access_key: Option<serde_json::Value>,
    /// Structured failure, when the provider rejected the request
    pub error: Option<ProviderFailure>,
}

/// Provider response to a sign-out request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignOutResponse {
    /// Whether the provider performed the sign-out
    pub success: bool,
    /// Structured failure, when the provider rejected the request
    pub error: Option<ProviderFailure>,
}

/// Provider response to transaction submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderTransactionResponse {
    /// Structured failure, when the provider rejected the submission
    pub error: Option<ProviderFailure>,
    /// Outcomes for the submitted transactions, one per transaction
    pub response: Option<Vec<TransactionOutcome>>,
}

/// Provider-level notifications an adapter can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderEventKind {
    /// The active account changed out from under the session
    AccountChanged,
    /// The provider switched to a different RPC network
    RpcChanged,
}

/// Payload delivered to provider event handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The active account changed; `account_id` is the new account, if any
    AccountChanged { account_id: Option<String> },
    /// The provider switched networks
    RpcChanged { network_id: String },
}

/// Token identifying one registered provider callback
pub type ProviderSubscriptionId = u64;

/// Async handler invoked when a subscribed provider event fires
pub type ProviderEventHandler =
    Box<dyn Fn(ProviderEvent) -> BoxFuture<'static, ()> + Send + Sync>;

/// Externally-injected wallet provider handle.
///
/// Synchronous methods are plain property reads on the injected object;
/// async methods are round trips into the extension that may prompt the
/// user.
#[async_trait]
pub trait InjectedProvider: Send + Sync {
    /// Whether the provider currently holds a signed-in session
    fn is_signed_in(&self) -> bool;

    /// Active account id, if any
    fn account_id(&self) -> Option<String>;

    /// Public key of the active account, when exposed
    fn public_key(&self) -> Option<String>;

    /// Network the provider is currently pointed at
    fn network_id(&self) -> String;

    /// Request a sign-in access grant for the given contract
    async fn request_sign_in(&self, params: SignInParams) -> SignInResponse;

    /// Request sign-out of the active session
    async fn sign_out(&self) -> SignOutResponse;

    /// Sign and submit one transaction
    async fn sign_and_send_transaction(
        &self,
        request: TransactionRequest,
    ) -> ProviderTransactionResponse;

    /// Sign and submit a batch of transactions
    async fn request_sign_transactions(
        &self,
        requests: Vec<TransactionRequest>,
    ) -> ProviderTransactionResponse;

    /// Register a callback for the given event kind; the returned token
    /// releases the registration when passed to [`unsubscribe`](Self::unsubscribe)
    fn subscribe(
        &self,
        kind: ProviderEventKind,
        handler: ProviderEventHandler,
    ) -> ProviderSubscriptionId;

    /// Release a callback registration
    fn unsubscribe(&self, id: ProviderSubscriptionId);
}

/// Execution environment a provider may be injected into
pub trait WalletEnvironment: Send + Sync {
    /// Mobile contexts cannot host the injected extension
    fn is_mobile(&self) -> bool;

    /// Current injected handle, if the extension has loaded
    fn injected_wallet(&self) -> Option<Arc<dyn InjectedProvider>>;
}
