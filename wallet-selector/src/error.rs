//! Error types for the wallet-selector library

use thiserror::Error;

/// Custom error type for wallet-selector operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Wallet not installed: {0}")]
    NotInstalled(String),

    #[error("Wallet not connected: {0}")]
    NotConnected(String),

    #[error("Invalid wallet selection: {0}")]
    InvalidSelection(String),

    #[error("Provider rejected request: {0}")]
    ProviderRejected(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for wallet-selector operations
pub type Result<T> = std::result::Result<T, Error>;
