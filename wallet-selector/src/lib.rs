//! Wallet selection and adapter protocol
//!
//! This library lets a host application connect to exactly one of several
//! third-party wallet providers, issue sign-in/sign-out requests, and submit
//! transactions for signing through a uniform contract, regardless of which
//! provider is active. It ships the selection controller, the wallet module
//! contract and one reference adapter for the Sender browser extension.

pub mod error;
pub mod config;
pub mod account;
pub mod events;
pub mod state;
pub mod storage;
pub mod transaction;
pub mod provider;
pub mod wallet;
pub mod selector;

// Re-export commonly used types for convenience
pub use account::Account;
pub use config::NetworkConfig;
pub use error::{Error, Result};
pub use selector::{SelectorConfig, SignInRequest, WalletSelector};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
