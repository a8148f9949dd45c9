//! Configuration schema definitions.
//!
//! Settings for a deployer run. All types derive Serde traits for
//! deserialization from a TOML file; every field has a default so an empty
//! file (or no file) is valid.

use serde::{Deserialize, Serialize};

use crate::blockchain::ReportOptions;

/// Root configuration for the deployer.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct DeployerConfig {
    /// Target network and transport settings.
    pub network: NetworkConfig,

    /// Transaction assembly settings.
    pub transaction: TransactionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network selection.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Network name (devnet, testnet, mainnet). Unknown names use devnet.
    pub name: String,

    /// Replaces the built-in RPC endpoint of the selected network.
    pub rpc_url: Option<String>,

    /// RPC request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "testnet".to_string(),
            rpc_url: None,
            request_timeout_secs: 30,
        }
    }
}

/// Transaction settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TransactionConfig {
    /// Gas budget in MIST.
    pub gas_budget: u64,

    /// Sections the ledger should include in the receipt.
    pub report: ReportOptions,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            gas_budget: 100_000_000,
            report: ReportOptions::default(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Log a Prometheus-format metrics snapshot when the run ends.
    pub metrics_summary: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_summary: false,
        }
    }
}
