//! Registry files as the deployment tooling writes them.

use std::io::Write;

use abex_deployer::blockchain::Address;
use abex_deployer::config::ConfigError;
use abex_deployer::registry;

const DEPLOYMENTS: &str = r#"{
  "abex_core": {
    "package": "0x3b4f0b9a3d0d7a9b6e7f0d3c2a1b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d",
    "upgrade_cap": "0x01",
    "admin_cap": "0x02",
    "market": "0x03",
    "alp_metadata": "0x04",
    "vaults_parent": "0x05",
    "symbols_parent": "0x06",
    "positions_parent": "0x07",
    "rebase_fee_model": "0x08",
    "vaults": {
      "BTC": { "reserving_fee_model": "0x0b", "weight": "30" },
      "USDC": { "reserving_fee_model": "0x0c", "weight": 70 }
    },
    "symbols": {
      "long_BTC": {
        "supported_collaterals": ["0x0d", "0x0e"],
        "funding_fee_model": "0x0f",
        "position_config": "0x10"
      }
    }
  },
  "abex_feeder": {
    "package": "0x20",
    "upgrade_cap": "0x21",
    "feeder": { "BTC": "0x22", "USDC": "0x23" }
  },
  "coins": {
    "BTC": { "module": "0x30::btc::BTC", "metadata": "0x31", "treasury": "0x32" },
    "USDC": { "module": "0x33::usdc::USDC", "metadata": "0x34", "treasury": null }
  },
  "coin_decimal": { "BTC": 8, "USDC": 6 }
}"#;

fn write_registry(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

#[test]
fn test_btc_vault_from_snake_case_file() {
    let file = write_registry(DEPLOYMENTS);
    let registry = registry::load(file.path()).unwrap();

    let btc = &registry.core.vaults["BTC"];
    assert_eq!(btc.reserving_fee_model, addr("0x0b"));
    assert_eq!(btc.weight, 30);
    assert_eq!(registry.core.vaults["USDC"].weight, 70);
    assert_eq!(
        registry.core.package.to_string(),
        "0x3b4f0b9a3d0d7a9b6e7f0d3c2a1b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d"
    );
}

#[test]
fn test_nested_fields_are_normalized() {
    let registry = registry::load_str(DEPLOYMENTS).unwrap();

    let symbol = &registry.core.symbols["long_BTC"];
    assert_eq!(symbol.supported_collaterals, vec![addr("0x0d"), addr("0x0e")]);
    assert_eq!(symbol.position_config, addr("0x10"));
    assert_eq!(registry.feeder.upgrade_cap, Some(addr("0x21")));
    assert_eq!(registry.feeder.feeder.len(), 2);
    assert_eq!(registry.coins["BTC"].treasury, Some(addr("0x32")));
    assert_eq!(registry.coins["USDC"].treasury, None);
    assert_eq!(registry.decimals_of("USDC"), Some(6));
}

#[test]
fn test_camel_case_file_loads_identically() {
    let normalized = registry::normalize_keys(serde_json::from_str(DEPLOYMENTS).unwrap()).unwrap();
    let camel = serde_json::to_string(&normalized).unwrap();
    assert_eq!(
        registry::load_str(&camel).unwrap(),
        registry::load_str(DEPLOYMENTS).unwrap()
    );
}

#[test]
fn test_missing_field_names_its_path() {
    let content = DEPLOYMENTS.replace(r#""position_config": "0x10""#, r#""position_configs": "0x10""#);
    match registry::load_str(&content).unwrap_err() {
        ConfigError::SchemaMismatch { field, reason } => {
            assert_eq!(field, "abexCore.symbols.long_BTC");
            assert!(reason.contains("positionConfig"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_non_hex_address_is_schema_mismatch() {
    let content = DEPLOYMENTS.replace(r#""market": "0x03""#, r#""market": "market-object""#);
    match registry::load_str(&content).unwrap_err() {
        ConfigError::SchemaMismatch { field, .. } => assert_eq!(field, "abexCore.market"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_truncated_file_is_parse_failure() {
    let file = write_registry(&DEPLOYMENTS[..DEPLOYMENTS.len() / 2]);
    let err = registry::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseFailure { .. }));
}

#[test]
fn test_written_registry_reloads_equal() {
    let original = registry::load_str(DEPLOYMENTS).unwrap();
    let file = write_registry(&serde_json::to_string_pretty(&original).unwrap());
    assert_eq!(registry::load(file.path()).unwrap(), original);
}
