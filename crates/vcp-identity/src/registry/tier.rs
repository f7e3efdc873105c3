//! Privacy tiers and the visibility rule.
//!
//! Tiers are totally ordered from least to most restrictive. Visibility is
//! a pure function of the entry's tier, the entry, and the caller's
//! credentials, written as one exhaustive match so that a new tier cannot
//! be added without deciding its visibility.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::auth::Authorization;
use crate::error::RegistryError;
use crate::proof::{Challenge, Opener};
use crate::token::Token;

use super::RegistryEntry;

/// Privacy tier of a registry entry, least to most restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivacyTier {
    /// Anyone can discover and enumerate.
    Public,
    /// Visible to members of the entry's organization scope.
    Organizational,
    /// Community-moderated; redacted for every caller at present.
    Community,
    /// Owner-only; redacted for every caller at present.
    Personal,
    /// Visible only with a valid ownership proof.
    Pseudonymous,
    /// Tombstone. Excluded from every query and not counted as redacted.
    Revoked,
}

impl PrivacyTier {
    pub const ALL: [PrivacyTier; 6] = [
        Self::Public,
        Self::Organizational,
        Self::Community,
        Self::Personal,
        Self::Pseudonymous,
        Self::Revoked,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Organizational => "ORGANIZATIONAL",
            Self::Community => "COMMUNITY",
            Self::Personal => "PERSONAL",
            Self::Pseudonymous => "PSEUDONYMOUS",
            Self::Revoked => "REVOKED",
        }
    }

    /// True if `self` is strictly more restrictive than `other`.
    pub fn is_stricter_than(self, other: PrivacyTier) -> bool {
        self > other
    }
}

impl fmt::Display for PrivacyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrivacyTier {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RegistryError::UnknownTier(s.to_string()))
    }
}

/// Outcome of a visibility check for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Returned in `tokens`.
    Visible,
    /// Counted in `redacted_count`.
    Redacted,
    /// Neither returned nor counted.
    Hidden,
}

/// Credentials prepared once per query: the authorization plus the
/// ownership proofs that survived the challenge check.
pub struct AccessContext<'a> {
    authorization: &'a Authorization,
    openers: Vec<Opener<'a>>,
}

impl<'a> AccessContext<'a> {
    pub fn new(authorization: &'a Authorization, challenge: &Challenge) -> Self {
        Self {
            authorization,
            openers: authorization.openers(challenge),
        }
    }

    pub fn authorization(&self) -> &Authorization {
        self.authorization
    }
}

/// Decide whether `entry` is visible to the caller described by `ctx`.
///
/// Anything not positively unlocked is redacted.
pub fn visibility(entry: &RegistryEntry, ctx: &AccessContext<'_>) -> Visibility {
    let unlocked = match entry.privacy_tier {
        PrivacyTier::Public => true,
        PrivacyTier::Organizational => entry
            .org_scope
            .as_deref()
            .is_some_and(|org| ctx.authorization.is_member_of(org)),
        PrivacyTier::Community | PrivacyTier::Personal => false,
        PrivacyTier::Pseudonymous => match &entry.owner_commitment {
            Some(commitment) => {
                let canonical = entry.token.canonical();
                ctx.openers
                    .iter()
                    .any(|o| o.opens(commitment, &canonical))
            }
            None => false,
        },
        PrivacyTier::Revoked => return Visibility::Hidden,
    };
    if unlocked {
        Visibility::Visible
    } else {
        Visibility::Redacted
    }
}

/// Boolean form of [`visibility`].
pub fn visible(entry: &RegistryEntry, ctx: &AccessContext<'_>) -> bool {
    visibility(entry, ctx) == Visibility::Visible
}

/// Domains whose second segment names the owning organization.
pub const ORG_DOMAINS: &[&str] = &["company", "school", "ngo", "org"];

/// Suggest a default privacy tier from a token's domain.
///
/// Unknown domains default to [`PrivacyTier::Organizational`].
pub fn infer_privacy_tier(token: &Token) -> PrivacyTier {
    match token.domain() {
        "family" | "work" | "secure" | "creative" | "reality" | "education" | "health" => {
            PrivacyTier::Public
        }
        d if ORG_DOMAINS.contains(&d) => PrivacyTier::Organizational,
        "religion" | "culture" | "community" => PrivacyTier::Community,
        "user" => PrivacyTier::Personal,
        "anon" | "pseudo" => PrivacyTier::Pseudonymous,
        _ => PrivacyTier::Organizational,
    }
}

/// Organization named by an organizational token, e.g. `acme` in
/// `company.acme.legal`.
pub fn infer_org_scope(token: &Token) -> Option<String> {
    ORG_DOMAINS
        .contains(&token.domain())
        .then(|| token.segments()[1].clone())
}
