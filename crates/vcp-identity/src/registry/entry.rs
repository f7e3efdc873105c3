//! Registry entries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::proof::Commitment;
use crate::token::Token;

use super::PrivacyTier;

/// Sequential identifier of a registry entry, unique within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Lifecycle state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryState {
    /// Current entry for its `(canonical, namespace)` key.
    Active,
    /// Replaced by a stricter-tier registration; kept for audit only.
    Superseded,
}

/// A registered token and its privacy metadata.
///
/// Entries are immutable once registered, apart from the `Active` →
/// `Superseded` transition performed by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: EntryId,
    pub token: Token,
    pub privacy_tier: PrivacyTier,
    /// Present only for `PSEUDONYMOUS` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_commitment: Option<Commitment>,
    /// Organization that unlocks `ORGANIZATIONAL` visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_scope: Option<String>,
    pub state: EntryState,
    /// Microseconds since Unix epoch.
    pub registered_at: u64,
    /// Entry this one replaced, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<EntryId>,
    /// Entry that replaced this one, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<EntryId>,
}

impl RegistryEntry {
    pub fn is_active(&self) -> bool {
        self.state == EntryState::Active
    }

    /// The `(canonical, namespace)` pair identifying this entry's leaf.
    pub fn key(&self) -> (String, Option<String>) {
        (
            self.token.canonical(),
            self.token.namespace().map(str::to_string),
        )
    }
}
