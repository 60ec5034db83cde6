//! Network configuration shared with every wallet module

use serde::{Deserialize, Serialize};

/// Network the host application is configured for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network identifier (e.g. "mainnet", "testnet")
    pub network_id: String,
    /// RPC node URL
    pub node_url: String,
    /// Contract the application requests sign-in access for
    pub contract_id: String,
    /// Contract methods the granted access key may call (empty = all)
    pub method_names: Vec<String>,
}

impl NetworkConfig {
    /// Mainnet configuration for the given contract
    pub fn mainnet(contract_id: impl Into<String>) -> Self {
        Self {
            network_id: "mainnet".to_string(),
            node_url: "https://rpc.mainnet.near.org".to_string(),
            contract_id: contract_id.into(),
            method_names: Vec::new(),
        }
    }

    /// Testnet configuration for the given contract
    pub fn testnet(contract_id: impl Into<String>) -> Self {
        Self {
            network_id: "testnet".to_string(),
            node_url: "https://rpc.testnet.near.org".to_string(),
            contract_id: contract_id.into(),
            method_names: Vec::new(),
        }
    }
}
