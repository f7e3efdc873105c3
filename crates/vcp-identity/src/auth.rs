//! Query-time credentials.
//!
//! An [`Authorization`] describes the principal issuing a query: which
//! organizations it belongs to, which role tags it holds, and any ownership
//! proofs for pseudonymous entries. It is built per query and never stored
//! by the registry.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::proof::{Challenge, Opener, OwnershipProof};

/// Credentials for a single registry query.
///
/// Serializes to the `{org_memberships, roles}` boundary shape; proofs are
/// process-local and never serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Authorization {
    #[serde(default)]
    pub org_memberships: BTreeSet<String>,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(skip)]
    pub proofs: Vec<OwnershipProof>,
}

impl Authorization {
    /// No memberships, roles, or proofs: sees public entries only.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org_memberships.insert(org.into());
        self
    }

    pub fn with_orgs<I, S>(mut self, orgs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.org_memberships.extend(orgs.into_iter().map(Into::into));
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn with_proof(mut self, proof: OwnershipProof) -> Self {
        self.proofs.push(proof);
        self
    }

    pub fn is_member_of(&self, org: &str) -> bool {
        self.org_memberships.contains(org)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Pre-check every attached proof against `challenge`, dropping those
    /// that fail.
    pub(crate) fn openers(&self, challenge: &Challenge) -> Vec<Opener<'_>> {
        self.proofs
            .iter()
            .filter_map(|p| p.prepare(challenge))
            .collect()
    }
}
