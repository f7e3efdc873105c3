//! Ownership secrets for pseudonymous tokens.
//!
//! A secret never leaves the owning process. Only its commitment is
//! handed to the registry.

use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{RegistryError, Result};

/// Length of an ownership secret in bytes.
pub const SECRET_LEN: usize = 32;

/// A 32-byte ownership secret, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct OwnershipSecret([u8; SECRET_LEN]);

impl OwnershipSecret {
    /// Generate a fresh secret from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode a secret from 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = [0u8; SECRET_LEN];
        hex::decode_to_slice(s.trim(), &mut bytes).map_err(|_| {
            RegistryError::InvalidProof(format!(
                "secret must be {} hex characters",
                SECRET_LEN * 2
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Encode as hex. The caller is responsible for where this ends up.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for OwnershipSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OwnershipSecret(..)")
    }
}
