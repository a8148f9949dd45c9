//! Signing identity and transaction signing.
//!
//! # Security
//! - Secret key material is accepted as base64 and never logged
//! - `Debug` prints the derived address only

use base64::{engine::general_purpose, Engine as _};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};

use crate::blockchain::types::{Address, IdentityError};
use crate::blockchain::wire::{self, ED25519_FLAG};

/// Ed25519 keypair used to sign the run's single transaction.
#[derive(Clone)]
pub struct SigningIdentity {
    signing_key: SigningKey,
    address: Address,
}

impl SigningIdentity {
    /// Derive an identity from base64-encoded secret key material.
    ///
    /// Accepted layouts after decoding:
    /// * 32 bytes: the secret seed
    /// * 33 bytes: scheme flag followed by the seed (keystore form)
    /// * 64 bytes: seed followed by its public key
    pub fn from_base64(material: &str) -> Result<Self, IdentityError> {
        let material = material.trim();
        if material.is_empty() {
            return Err(IdentityError::InvalidKeyEncoding(
                "secret key is empty".to_string(),
            ));
        }

        let bytes = general_purpose::STANDARD
            .decode(material)
            .map_err(|e| IdentityError::InvalidKeyEncoding(format!("not base64: {}", e)))?;

        Self::from_bytes(&bytes)
    }

    /// Derive an identity from decoded secret key bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IdentityError> {
        let seed = match bytes.len() {
            SECRET_KEY_LENGTH => &bytes[..],
            len if len == SECRET_KEY_LENGTH + 1 => {
                if bytes[0] != ED25519_FLAG {
                    return Err(IdentityError::InvalidKeyMaterial(format!(
                        "key scheme flag {:#04x} is not Ed25519",
                        bytes[0]
                    )));
                }
                &bytes[1..]
            }
            len if len == SECRET_KEY_LENGTH + PUBLIC_KEY_LENGTH => &bytes[..SECRET_KEY_LENGTH],
            len => {
                return Err(IdentityError::InvalidKeyEncoding(format!(
                    "decoded key is {} bytes, expected 32, 33 or 64",
                    len
                )))
            }
        };

        let mut secret = [0u8; SECRET_KEY_LENGTH];
        secret.copy_from_slice(seed);
        let signing_key = SigningKey::from_bytes(&secret);

        if bytes.len() == SECRET_KEY_LENGTH + PUBLIC_KEY_LENGTH {
            let public = &bytes[SECRET_KEY_LENGTH..];
            if signing_key.verifying_key().as_bytes()[..] != public[..] {
                return Err(IdentityError::InvalidKeyMaterial(
                    "public half does not match the secret seed".to_string(),
                ));
            }
        }

        let address = derive_address(&signing_key.verifying_key());
        tracing::info!(address = %address, "Signing identity resolved");

        Ok(Self {
            signing_key,
            address,
        })
    }

    /// Ledger address owned by this identity.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign serialized transaction data.
    ///
    /// Returns the base64 wire signature: `flag || signature || public key`.
    pub fn sign_transaction(&self, tx_bytes: &[u8]) -> String {
        let digest = wire::signing_digest(tx_bytes);
        let signature = self.signing_key.sign(&digest);

        let mut serialized = Vec::with_capacity(1 + 64 + PUBLIC_KEY_LENGTH);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(self.signing_key.verifying_key().as_bytes());
        general_purpose::STANDARD.encode(serialized)
    }
}

/// `blake2b256(flag || public_key)`.
pub fn derive_address(public_key: &VerifyingKey) -> Address {
    Address::new(wire::blake2b256(&[&[ED25519_FLAG][..], &public_key.as_bytes()[..]]))
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address)
            .finish()
    }
}
