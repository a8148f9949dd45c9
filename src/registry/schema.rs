//! Typed deployment registry.
//!
//! Decoding expects keys already normalized to camel case (see
//! [`super::normalize`]). Every address field is parsed into an
//! [`ObjectId`]; a missing or mistyped field fails the whole document.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blockchain::{Address, ObjectId};
use crate::config::ConfigError;

/// Object identifiers of a published protocol deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRegistry {
    #[serde(rename = "abexCore", alias = "core")]
    pub core: CoreDeployment,

    #[serde(rename = "abexFeeder", alias = "feeder")]
    pub feeder: FeederDeployment,

    pub coins: BTreeMap<String, CoinRef>,

    #[serde(alias = "coinDecimal")]
    pub coin_decimals: BTreeMap<String, u8>,
}

/// Core package and its shared objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreDeployment {
    pub package: ObjectId,
    pub upgrade_cap: ObjectId,
    pub admin_cap: ObjectId,
    pub market: ObjectId,
    pub alp_metadata: ObjectId,
    pub vaults_parent: ObjectId,
    pub symbols_parent: ObjectId,
    pub positions_parent: ObjectId,
    pub rebase_fee_model: ObjectId,
    pub vaults: BTreeMap<String, VaultRef>,
    pub symbols: BTreeMap<String, SymbolRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRef {
    pub reserving_fee_model: ObjectId,
    #[serde(deserialize_with = "number_or_decimal_string")]
    pub weight: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolRef {
    /// Order is significant.
    pub supported_collaterals: Vec<ObjectId>,
    pub funding_fee_model: ObjectId,
    pub position_config: ObjectId,
}

/// Price feeder package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeederDeployment {
    pub package: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_cap: Option<ObjectId>,
    pub feeder: BTreeMap<String, ObjectId>,
}

/// A coin type known to the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinRef {
    /// Defining module, `0xPKG::module[::Type]`.
    #[serde(deserialize_with = "module_path")]
    pub module: String,
    pub metadata: ObjectId,
    /// `null` and a missing key both mean the coin has no treasury.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treasury: Option<ObjectId>,
}

impl CoinRef {
    /// Package address the coin module is published under.
    pub fn package(&self) -> Option<Address> {
        self.module.split("::").next()?.parse().ok()
    }
}

impl DeploymentRegistry {
    /// Strictly decode a key-normalized document.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        serde_path_to_error::deserialize(value).map_err(|e| ConfigError::SchemaMismatch {
            field: e.path().to_string(),
            reason: e.inner().to_string(),
        })
    }

    pub fn vault_count(&self) -> usize {
        self.core.vaults.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.core.symbols.len()
    }

    /// Feeder object for a price feed name.
    pub fn feeder_for(&self, name: &str) -> Option<&ObjectId> {
        self.feeder.feeder.get(name)
    }

    pub fn decimals_of(&self, coin: &str) -> Option<u8> {
        self.coin_decimals.get(coin).copied()
    }
}

fn number_or_decimal_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    struct WeightVisitor;

    impl<'de> Visitor<'de> for WeightVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer or a decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(|_| E::custom(format!("weight must not be negative, got {}", v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            v.trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid weight '{}'", v)))
        }
    }

    deserializer.deserialize_any(WeightVisitor)
}

fn module_path<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let module = String::deserialize(deserializer)?;
    let package = module.split("::").next().unwrap_or_default();
    package
        .parse::<Address>()
        .map_err(|e| de::Error::custom(format!("invalid module package: {}", e)))?;
    Ok(module)
}
