//! Ledger-specific types and error definitions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::blockchain::transaction::ResultHandle;

/// Length in bytes of ledger addresses and object ids.
pub const ADDRESS_LENGTH: usize = 32;

/// Shared system clock object.
pub const CLOCK_OBJECT_ID: Address = Address::from_low_byte(0x6);

/// 32-byte ledger address, used for accounts, packages and objects alike.
///
/// Human-readable formats (JSON, TOML, logs) use `0x`-prefixed hex; BCS uses
/// the raw fixed-size byte array.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

/// Object ids share the address space.
pub type ObjectId = Address;

impl Address {
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    const fn from_low_byte(byte: u8) -> Self {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[ADDRESS_LENGTH - 1] = byte;
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Full-width `0x` hex form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

/// Errors that can occur parsing an address string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("address is empty")]
    Empty,

    #[error("address has {0} hex digits, at most 64 allowed")]
    TooLong(usize),

    #[error("address is not valid hex: {0}")]
    InvalidHex(String),
}

impl FromStr for Address {
    type Err = AddressParseError;

    /// Parses `0x`-prefixed (or bare) hex, left-padding short forms such as
    /// `0x6` or legacy 20-byte ids with zeros.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() {
            return Err(AddressParseError::Empty);
        }
        if digits.len() > ADDRESS_LENGTH * 2 {
            return Err(AddressParseError::TooLong(digits.len()));
        }

        let padded = format!("{:0>width$}", digits, width = ADDRESS_LENGTH * 2);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            <[u8; ADDRESS_LENGTH]>::deserialize(deserializer).map(Self)
        }
    }
}

/// Errors deriving a signing identity from secret-key material.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The material could not be decoded to a supported key layout.
    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// Decoding worked but the bytes are not a usable Ed25519 key.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
}

/// Errors raised while assembling a call chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainBuildError {
    /// An argument references a result the chain has not produced (yet).
    #[error("step {step} references {handle}, which no earlier step produced")]
    DanglingHandleReference { step: usize, handle: ResultHandle },

    #[error("invalid call target '{input}': {reason}")]
    InvalidTarget { input: String, reason: String },

    #[error("invalid type tag '{input}': {reason}")]
    InvalidTypeTag { input: String, reason: String },

    #[error("cannot encode literal: {0}")]
    InvalidLiteral(String),

    /// The lowered transaction would overflow a 16-bit index.
    #[error("transaction has more than {limit} {what}")]
    LimitExceeded { what: &'static str, limit: usize },
}

/// Errors that can occur submitting a chain.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The chain could not be lowered into ledger commands.
    #[error(transparent)]
    Build(#[from] ChainBuildError),

    /// Transport-level failure, including timeouts and undecodable replies.
    #[error("network failure: {reason}")]
    NetworkFailure { reason: String },

    /// The ledger answered with a structured rejection.
    #[error("rejected by ledger: {raw_reason}")]
    RemoteRejection {
        raw_reason: String,
        digest: Option<String>,
    },

    #[error("cannot resolve object {object_id}: {reason}")]
    ObjectResolution { object_id: ObjectId, reason: String },

    #[error("gas budget {required} exceeds available balance {available}")]
    InsufficientGas { required: u64, available: u64 },

    #[error("cannot encode transaction: {0}")]
    Encoding(String),
}

impl SubmissionError {
    pub(crate) fn network(reason: impl fmt::Display) -> Self {
        Self::NetworkFailure {
            reason: reason.to_string(),
        }
    }
}

/// Result type for submission operations.
pub type SubmissionResult<T> = Result<T, SubmissionError>;
