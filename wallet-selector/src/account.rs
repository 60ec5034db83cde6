//! Wallet accounts

use serde::{Deserialize, Serialize};

/// A single account visible through a connected wallet.
///
/// Accounts are derived on demand from the live provider handle and never
/// cached across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier
    pub account_id: String,
    /// Public key, when the provider exposes one
    pub public_key: Option<String>,
}
