//! Transaction requests submitted to wallet adapters

use serde::{Deserialize, Serialize};

/// A single action inside a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Contract method invocation
    FunctionCall {
        /// Method to invoke on the receiver contract
        method_name: String,
        /// JSON-encoded call arguments
        args: serde_json::Value,
        /// Gas attached to the call
        gas: u64,
        /// Deposit attached to the call, in the smallest unit
        deposit: String,
    },
    /// Native token transfer
    Transfer {
        /// Amount to transfer, in the smallest unit
        deposit: String,
    },
}

impl Action {
    /// Action kind name, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Action::FunctionCall { .. } => "FunctionCall",
            Action::Transfer { .. } => "Transfer",
        }
    }
}

/// One transaction submitted for signing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Account or contract receiving the transaction
    pub receiver_id: String,
    /// Signing account; defaults to the configured contract id when absent
    pub signer_id: Option<String>,
    /// Ordered actions to execute
    pub actions: Vec<Action>,
}

/// Status reported by the provider for a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Transaction executed successfully
    Succeeded,
    /// Transaction failed
    Failed,
}

/// Outcome returned by the provider for one submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    /// Transaction hash
    pub transaction_hash: String,
    /// Execution status
    pub status: TransactionStatus,
}
