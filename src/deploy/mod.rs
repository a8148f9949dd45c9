//! Deployment flow.
//!
//! # Data Flow
//! ```text
//! deployments file → registry::load          (gate: nothing is built from a bad registry)
//! secret key       → SigningIdentity
//! network settings → EndpointSet (rpc_url override applied)
//! attestation      → feeds::build_price_feed_chain
//! chain + identity → Submitter::submit → SubmissionReceipt
//! ```

pub mod feeds;

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::blockchain::{resolve_endpoints, EndpointSet, SigningIdentity, SubmissionReceipt, Submitter};
use crate::config::{ConfigError, DeployerConfig};
use crate::error::DeployError;
use crate::registry;

pub use feeds::{build_price_feed_chain, PriceFeedTargets};

/// Inputs of one deployment run.
pub struct DeployParams {
    /// Base64 secret key material.
    pub secret_key: String,
    pub deployments_file: PathBuf,
    pub targets: PriceFeedTargets,
    /// Raw price update payload.
    pub attestation: Vec<u8>,
}

impl std::fmt::Debug for DeployParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployParams")
            .field("secret_key", &"<redacted>")
            .field("deployments_file", &self.deployments_file)
            .field("targets", &self.targets)
            .field("attestation_len", &self.attestation.len())
            .finish()
    }
}

/// Endpoints for the configured network, with the RPC override applied.
pub fn endpoints_for(config: &DeployerConfig) -> Result<EndpointSet, ConfigError> {
    let mut endpoints = resolve_endpoints(&config.network.name);
    if let Some(rpc_url) = &config.network.rpc_url {
        endpoints.rpc_url = Url::parse(rpc_url).map_err(|e| ConfigError::SchemaMismatch {
            field: "network.rpc_url".to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(endpoints)
}

/// Run the price feed deployment end to end.
pub async fn run(params: &DeployParams, config: &DeployerConfig) -> Result<SubmissionReceipt, DeployError> {
    let registry = registry::load(&params.deployments_file)?;
    let identity = SigningIdentity::from_base64(&params.secret_key)?;
    let endpoints = endpoints_for(config)?;

    tracing::info!(
        network = %config.network.name,
        rpc_url = %endpoints.rpc_url,
        sender = %identity.address(),
        core_package = %registry.core.package,
        "Starting deployment"
    );

    let chain = build_price_feed_chain(&params.attestation, &params.targets)?;

    let submitter = Submitter::new(
        &endpoints,
        Duration::from_secs(config.network.request_timeout_secs),
        config.transaction.gas_budget,
    )?;
    let receipt = submitter
        .submit(&chain, &identity, &config.transaction.report)
        .await?;

    tracing::info!(digest = %receipt.digest, "Deployment submitted");
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_override() {
        let mut config = DeployerConfig::default();
        config.network.rpc_url = Some("http://127.0.0.1:9000".to_string());
        let endpoints = endpoints_for(&config).unwrap();
        assert_eq!(endpoints.rpc_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(endpoints.auxiliary_url.as_str(), "https://explorer-rpc.testnet.sui.io/gas");
    }

    #[test]
    fn test_debug_hides_secret() {
        let params = DeployParams {
            secret_key: "c2VjcmV0".to_string(),
            deployments_file: PathBuf::from("deployments.json"),
            targets: PriceFeedTargets {
                pyth_package: crate::blockchain::Address::ZERO,
                pyth_state: crate::blockchain::Address::ZERO,
                worm_package: crate::blockchain::Address::ZERO,
                worm_state: crate::blockchain::Address::ZERO,
            },
            attestation: vec![1, 2, 3],
        };
        assert!(!format!("{:?}", params).contains("c2VjcmV0"));
    }

    #[tokio::test]
    async fn test_bad_registry_stops_before_identity() {
        let params = DeployParams {
            secret_key: String::new(),
            deployments_file: PathBuf::from("/nonexistent/deployments.json"),
            targets: PriceFeedTargets {
                pyth_package: crate::blockchain::Address::ZERO,
                pyth_state: crate::blockchain::Address::ZERO,
                worm_package: crate::blockchain::Address::ZERO,
                worm_state: crate::blockchain::Address::ZERO,
            },
            attestation: Vec::new(),
        };
        let err = run(&params, &DeployerConfig::default()).await.unwrap_err();
        assert!(matches!(err, DeployError::Config(ConfigError::NotFound { .. })));
    }
}
