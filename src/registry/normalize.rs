//! Key casing normalization over untyped JSON.
//!
//! Every `_x` pair (underscore followed by a lowercase ASCII letter) becomes
//! `X`. Keys are rewritten at every depth, including objects nested in
//! arrays. Values are never touched. Normalizing twice is a no-op.

use serde_json::{Map, Value};
use thiserror::Error;

/// Two keys of one object normalize to the same name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("keys collide as `{key}` at `{path}`")]
pub struct DuplicateKey {
    pub path: String,
    pub key: String,
}

/// Convert one key to the uniform casing.
pub fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' {
            if let Some(next) = chars.peek().copied().filter(char::is_ascii_lowercase) {
                out.push(next.to_ascii_uppercase());
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Normalize every object key in `value`, recursively.
pub fn normalize_keys(value: Value) -> Result<Value, DuplicateKey> {
    normalize_at(value, "")
}

fn normalize_at(value: Value, path: &str) -> Result<Value, DuplicateKey> {
    match value {
        Value::Object(map) => {
            let mut normalized = Map::with_capacity(map.len());
            for (key, child) in map {
                let key = normalize_key(&key);
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                let child = normalize_at(child, &child_path)?;
                if normalized.insert(key.clone(), child).is_some() {
                    return Err(DuplicateKey {
                        path: if path.is_empty() { ".".to_string() } else { path.to_string() },
                        key,
                    });
                }
            }
            Ok(Value::Object(normalized))
        }
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| normalize_at(item, &format!("{}[{}]", path, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        scalar => Ok(scalar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("reserving_fee_model"), "reservingFeeModel");
        assert_eq!(normalize_key("abex_core"), "abexCore");
        assert_eq!(normalize_key("weight"), "weight");
        assert_eq!(normalize_key("alreadyCamel"), "alreadyCamel");
        assert_eq!(normalize_key("BTC"), "BTC");
        assert_eq!(normalize_key("v_1"), "v_1");
        assert_eq!(normalize_key("a__b"), "a_B");
        assert_eq!(normalize_key("trailing_"), "trailing_");
        assert_eq!(normalize_key("x_Y"), "x_Y");
    }

    #[test]
    fn test_normalizes_nested_objects_and_arrays() {
        let raw = json!({
            "abex_core": {
                "vaults": { "BTC": { "reserving_fee_model": "0x1", "weight": 1 } },
                "symbols": [{ "funding_fee_model": "0x2", "supported_collaterals": ["usd_c"] }]
            }
        });
        let normalized = normalize_keys(raw).unwrap();
        assert_eq!(
            normalized,
            json!({
                "abexCore": {
                    "vaults": { "BTC": { "reservingFeeModel": "0x1", "weight": 1 } },
                    "symbols": [{ "fundingFeeModel": "0x2", "supportedCollaterals": ["usd_c"] }]
                }
            })
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let samples = [
            json!({ "a_b": { "c_d": [ { "e_f_g": null }, 1, "h_i" ] }, "j__k": true }),
            json!([{ "x_1": { "y_z": {} } }, []]),
            json!("scalar_value"),
            json!({ "already": { "camelCase": 2 } }),
        ];
        for sample in samples {
            let once = normalize_keys(sample).unwrap();
            let twice = normalize_keys(once.clone()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_colliding_keys_are_rejected() {
        let err = normalize_keys(json!({ "coins": { "fee_model": 1, "feeModel": 2 } })).unwrap_err();
        assert_eq!(err.key, "feeModel");
        assert_eq!(err.path, "coins");
    }
}
