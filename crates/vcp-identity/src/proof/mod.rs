//! Ownership proofs for pseudonymous registry entries.
//!
//! The registry stores only an owner [`Commitment`]. A caller proves
//! ownership by supplying an [`OwnershipProof`] in its authorization:
//!
//! - [`OwnershipProof::Reveal`]: the minimal commitment-reveal scheme. The
//!   proof recomputes `H(secret ‖ canonical)` locally and compares it to the
//!   stored commitment.
//! - [`OwnershipProof::Signed`]: an Ed25519 signature over the registry's
//!   current [`Challenge`], checked against a key commitment.
//!
//! A failed proof is indistinguishable from no proof: the entry is simply
//! redacted.

pub mod challenge;
pub mod commitment;
pub mod secret;

use ed25519_dalek::{Signature, SigningKey, VerifyingKey};

pub use challenge::Challenge;
pub use commitment::{commit, commit_key, Commitment};
pub use secret::{OwnershipSecret, SECRET_LEN};

/// Proof material a caller attaches to an authorization.
#[derive(Debug, Clone)]
pub enum OwnershipProof {
    /// Commitment-reveal with the owner's secret.
    Reveal(OwnershipSecret),
    /// Signature by the committed key over the registry's challenge.
    Signed {
        public_key: VerifyingKey,
        signature: Signature,
    },
}

impl OwnershipProof {
    /// Answer `challenge` with `key`.
    pub fn sign(key: &SigningKey, challenge: &Challenge) -> Self {
        Self::Signed {
            public_key: key.verifying_key(),
            signature: challenge.sign(key),
        }
    }

    /// Check the parts of the proof that do not depend on any entry.
    ///
    /// Returns `None` for a signature that does not answer `challenge`.
    pub(crate) fn prepare(&self, challenge: &Challenge) -> Option<Opener<'_>> {
        match self {
            Self::Reveal(secret) => Some(Opener::Secret(secret)),
            Self::Signed {
                public_key,
                signature,
            } => challenge
                .verify(public_key, signature)
                .then_some(Opener::Key(public_key)),
        }
    }
}

/// A proof whose entry-independent checks have passed.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Opener<'a> {
    Secret(&'a OwnershipSecret),
    Key(&'a VerifyingKey),
}

impl Opener<'_> {
    /// Does this proof open `commitment` for `canonical`?
    pub(crate) fn opens(&self, commitment: &Commitment, canonical: &str) -> bool {
        let expected = match self {
            Self::Secret(secret) => commit(secret, canonical),
            Self::Key(key) => commit_key(key, canonical),
        };
        expected.ct_eq(commitment)
    }
}

/// Local check that `secret` opens `commitment` for `canonical`.
///
/// Runs entirely in the owning process.
pub fn verify_ownership(secret: &OwnershipSecret, canonical: &str, commitment: &Commitment) -> bool {
    commit(secret, canonical).ct_eq(commitment)
}
