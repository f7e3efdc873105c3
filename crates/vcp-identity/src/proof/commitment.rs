//! Hash commitments binding an owner to a canonical token path.
//!
//! Two commitment kinds share one 32-byte format:
//!
//! - secret commitments: `SHA-256(tag ‖ secret ‖ canonical)`
//! - key commitments: `SHA-256(tag ‖ ed25519_public_key ‖ canonical)`
//!
//! Distinct domain-separation tags keep the two kinds from colliding.

use std::fmt;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{RegistryError, Result};

use super::secret::OwnershipSecret;

const SECRET_TAG: &[u8] = b"vcp-ownership-v1/secret\x00";
const KEY_TAG: &[u8] = b"vcp-ownership-v1/ed25519\x00";

/// An opaque 32-byte owner commitment, stored by the registry for
/// pseudonymous entries.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Commitment([u8; 32]);

impl Commitment {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| {
            RegistryError::InvalidProof(format!("invalid commitment encoding: {e}"))
        })?;
        Ok(Self(bytes))
    }

    /// Constant-time equality.
    pub fn ct_eq(&self, other: &Commitment) -> bool {
        bool::from(self.0[..].ct_eq(&other.0[..]))
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", &self.to_hex()[..16])
    }
}

impl TryFrom<String> for Commitment {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<Commitment> for String {
    fn from(c: Commitment) -> Self {
        c.to_hex()
    }
}

/// Commit to ownership of `canonical` with a secret.
pub fn commit(secret: &OwnershipSecret, canonical: &str) -> Commitment {
    let mut hasher = Sha256::new();
    hasher.update(SECRET_TAG);
    hasher.update(secret.as_bytes());
    hasher.update(canonical.as_bytes());
    Commitment(hasher.finalize().into())
}

/// Commit to ownership of `canonical` with an Ed25519 public key.
pub fn commit_key(key: &VerifyingKey, canonical: &str) -> Commitment {
    let mut hasher = Sha256::new();
    hasher.update(KEY_TAG);
    hasher.update(key.as_bytes());
    hasher.update(canonical.as_bytes());
    Commitment(hasher.finalize().into())
}
