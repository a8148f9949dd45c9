//! Deployment registry loading.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::loader::read_file;
use crate::config::ConfigError;
use crate::registry::normalize::normalize_keys;
use crate::registry::schema::DeploymentRegistry;

/// Load, normalize and decode a registry file.
pub fn load(path: &Path) -> Result<DeploymentRegistry, ConfigError> {
    let content = read_file(path)?;
    let registry = decode(&content, path)?;

    tracing::info!(
        path = %path.display(),
        package = %registry.core.package,
        vaults = registry.vault_count(),
        symbols = registry.symbol_count(),
        coins = registry.coins.len(),
        "Deployment registry loaded"
    );
    Ok(registry)
}

/// Decode a registry document already held in memory.
pub fn load_str(content: &str) -> Result<DeploymentRegistry, ConfigError> {
    decode(content, &PathBuf::from("<inline>"))
}

fn decode(content: &str, path: &Path) -> Result<DeploymentRegistry, ConfigError> {
    let raw: Value = serde_json::from_str(content).map_err(|e| ConfigError::ParseFailure {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let normalized = normalize_keys(raw).map_err(|e| ConfigError::SchemaMismatch {
        field: e.path.clone(),
        reason: e.to_string(),
    })?;

    DeploymentRegistry::from_value(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SNAKE_CASE: &str = r#"{
        "abex_core": {
            "package": "0x1", "upgrade_cap": "0x2", "admin_cap": "0x3",
            "market": "0x4", "alp_metadata": "0x5", "vaults_parent": "0x6",
            "symbols_parent": "0x7", "positions_parent": "0x8", "rebase_fee_model": "0x9",
            "vaults": { "BTC": { "reserving_fee_model": "0xaa", "weight": "1" } },
            "symbols": {}
        },
        "abex_feeder": { "package": "0xb", "upgrade_cap": "0xc", "feeder": {} },
        "coins": {},
        "coin_decimal": {}
    }"#;

    #[test]
    fn test_snake_case_registry_decodes() {
        let registry = load_str(SNAKE_CASE).unwrap();
        let btc = &registry.core.vaults["BTC"];
        assert_eq!(btc.weight, 1);
        assert_eq!(btc.reserving_fee_model, "0xaa".parse::<crate::blockchain::Address>().unwrap());
        assert_eq!(registry.feeder.upgrade_cap, Some("0xc".parse().unwrap()));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAKE_CASE.as_bytes()).unwrap();
        let registry = load(file.path()).unwrap();
        assert_eq!(registry.vault_count(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = load(Path::new("/nonexistent/deployments.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = load_str("{ \"abex_core\": ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailure { .. }));
    }

    #[test]
    fn test_missing_section() {
        let err = load_str(r#"{ "coins": {}, "coin_decimal": {} }"#).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaMismatch { .. }));
    }
}
