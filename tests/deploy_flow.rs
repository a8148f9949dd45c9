//! End-to-end deployment runs against an in-process node.

mod common;

use std::io::Write;
use std::path::PathBuf;

use abex_deployer::blockchain::{IdentityError, SubmissionError};
use abex_deployer::config::{ConfigError, DeployerConfig};
use abex_deployer::deploy::{run, DeployParams, PriceFeedTargets};
use abex_deployer::DeployError;
use base64::{engine::general_purpose, Engine as _};

use common::MockNode;

const REGISTRY: &str = r#"{
  "abexCore": {
    "package": "0xa1", "upgradeCap": "0xa2", "adminCap": "0xa3", "market": "0xa4",
    "alpMetadata": "0xa5", "vaultsParent": "0xa6", "symbolsParent": "0xa7",
    "positionsParent": "0xa8", "rebaseFeeModel": "0xa9",
    "vaults": {}, "symbols": {}
  },
  "abexFeeder": { "package": "0xb1", "feeder": {} },
  "coins": {},
  "coinDecimals": {}
}"#;

fn registry_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(REGISTRY.as_bytes()).unwrap();
    file
}

fn params(deployments_file: PathBuf, secret_key: String) -> DeployParams {
    DeployParams {
        secret_key,
        deployments_file,
        targets: PriceFeedTargets {
            pyth_package: "0x8d97".parse().unwrap(),
            pyth_state: "0x1f93".parse().unwrap(),
            worm_package: "0x5306".parse().unwrap(),
            worm_state: "0xaeab".parse().unwrap(),
        },
        attestation: vec![1, 0, 0, 0, 0, 1],
    }
}

fn config_for(node: &common::RunningNode) -> DeployerConfig {
    let mut config = DeployerConfig::default();
    config.network.rpc_url = Some(node.url().to_string());
    config.network.request_timeout_secs = 5;
    config
}

#[tokio::test]
async fn test_full_run_returns_receipt() {
    let node = MockNode::healthy().start().await;
    let file = registry_file();
    let secret = general_purpose::STANDARD.encode([5u8; 32]);

    let receipt = run(&params(file.path().to_path_buf(), secret), &config_for(&node))
        .await
        .unwrap();

    assert_eq!(receipt.digest, "5uDG1cnBHcWiVWsJt2DZVhmvXaMvTYFcNPZhz7ReByDq");
    assert_eq!(node.methods().len(), 4);
}

#[tokio::test]
async fn test_empty_secret_key_never_contacts_node() {
    let node = MockNode::healthy().start().await;
    let file = registry_file();

    let err = run(&params(file.path().to_path_buf(), String::new()), &config_for(&node))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DeployError::Identity(IdentityError::InvalidKeyEncoding(_))
    ));
    assert!(node.requests().is_empty());
}

#[tokio::test]
async fn test_invalid_registry_never_contacts_node() {
    let node = MockNode::healthy().start().await;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{ "abexCore": {} }"#).unwrap();
    let secret = general_purpose::STANDARD.encode([5u8; 32]);

    let err = run(&params(file.path().to_path_buf(), secret), &config_for(&node))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DeployError::Config(ConfigError::SchemaMismatch { .. })
    ));
    assert!(node.requests().is_empty());
}

#[tokio::test]
async fn test_rejection_surfaces_as_submission_error() {
    let node = MockNode::healthy()
        .reject("suix_getReferenceGasPrice", -32000, "node is syncing")
        .start()
        .await;
    let file = registry_file();
    let secret = general_purpose::STANDARD.encode([5u8; 32]);

    let err = run(&params(file.path().to_path_buf(), secret), &config_for(&node))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DeployError::Submission(SubmissionError::RemoteRejection { .. })
    ));
    assert_eq!(err.exit_code(), 5);
}
