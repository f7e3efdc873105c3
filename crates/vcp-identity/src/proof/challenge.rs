//! Registry-issued challenges for signature-based ownership proofs.
//!
//! The registry publishes a random nonce. An owner who committed with an
//! Ed25519 public key answers by signing the nonce; the registry learns the
//! public key and a signature, never the private key.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;

const CHALLENGE_TAG: &[u8] = b"vcp-ownership-challenge-v1\x00";

/// A single-use-per-rotation nonce issued by a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    nonce: [u8; 32],
    issued_at: u64,
}

impl Challenge {
    /// Issue a fresh random challenge.
    pub fn issue() -> Self {
        let mut nonce = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut nonce);
        Self {
            nonce,
            issued_at: crate::time::now_micros(),
        }
    }

    pub fn nonce(&self) -> &[u8; 32] {
        &self.nonce
    }

    pub fn issued_at(&self) -> u64 {
        self.issued_at
    }

    /// Bytes an owner signs to answer this challenge.
    pub fn message(&self) -> Vec<u8> {
        let mut msg = Vec::with_capacity(CHALLENGE_TAG.len() + self.nonce.len());
        msg.extend_from_slice(CHALLENGE_TAG);
        msg.extend_from_slice(&self.nonce);
        msg
    }

    /// Sign this challenge with an owner key.
    pub fn sign(&self, key: &SigningKey) -> Signature {
        key.sign(&self.message())
    }

    /// Check an answer to this challenge.
    pub fn verify(&self, key: &VerifyingKey, signature: &Signature) -> bool {
        key.verify(&self.message(), signature).is_ok()
    }
}
