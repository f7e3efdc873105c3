//! VCP Identity: hierarchical identity tokens with a privacy-preserving
//! registry.
//!
//! Tokens name an entity as a dotted path (`company.acme.legal.compliance`).
//! The registry stores them under privacy tiers and answers wildcard queries
//! (`company.acme.**`) with the tokens the caller may see plus a count of
//! those it may not, so existence is disclosed without identity.
//!
//! Pseudonymous entries are bound to an owner commitment and become visible
//! only to a caller presenting an ownership proof.

pub mod auth;
pub mod config;
pub mod error;
pub mod index;
pub mod proof;
pub mod registry;
pub mod storage;
pub mod time;
pub mod token;

// Re-export primary types
pub use auth::Authorization;
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use token::{NamespaceTier, Pattern, SemVer, Token};

// Re-export registry types
pub use registry::{
    EntryId, EntryState, Notification, PrivacyTier, QueryResult, Registry, RegistryEntry,
    RegistryEvent, RegistryStats, SubscriptionId, Visibility,
};

// Re-export proof types
pub use proof::{commit, commit_key, verify_ownership, Challenge, Commitment, OwnershipProof, OwnershipSecret};
