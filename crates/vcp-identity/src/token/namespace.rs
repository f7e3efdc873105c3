//! Namespace governance tiers.
//!
//! The domain segment of a token decides who may publish under it:
//! reserved core domains, verified organizations, multi-stakeholder
//! communities, or individual users.

use serde::{Deserialize, Serialize};

use super::Token;

/// Domains reserved for core constitutions.
pub const CORE_DOMAINS: &[&str] = &[
    "family",
    "work",
    "education",
    "health",
    "finance",
    "legal",
    "safety",
    "privacy",
    "accessibility",
    "environment",
];

/// Governance tier implied by a token's domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceTier {
    /// Reserved core domains, pre-defined and not delegable.
    Core,
    /// Verified organizations (`company.acme.*`), proven via DNS.
    Organizational,
    /// Multi-stakeholder consensus.
    Community,
    /// Individual users (`user.*`), proven via email.
    Personal,
}

impl NamespaceTier {
    /// Whether publishing under this tier requires registration.
    pub fn registration_required(self) -> bool {
        !matches!(self, Self::Core)
    }

    /// Whether the tier owner may delegate sub-namespaces.
    pub fn delegation_allowed(self) -> bool {
        matches!(self, Self::Organizational | Self::Community)
    }

    /// Kind of proof used to verify a claim on this tier, if any.
    pub fn proof_type(self) -> Option<&'static str> {
        match self {
            Self::Core => None,
            Self::Organizational => Some("dns"),
            Self::Community => Some("consensus"),
            Self::Personal => Some("email"),
        }
    }
}

/// Return `true` if `domain` is a reserved core domain.
pub fn is_core_domain(domain: &str) -> bool {
    CORE_DOMAINS.contains(&domain)
}

/// Infer the governance tier from a token's domain.
pub fn infer_namespace_tier(token: &Token) -> NamespaceTier {
    let domain = token.domain();
    if is_core_domain(domain) {
        NamespaceTier::Core
    } else if domain == "company" || domain.starts_with("company-") {
        NamespaceTier::Organizational
    } else if domain == "user" || domain.starts_with("user-") {
        NamespaceTier::Personal
    } else {
        NamespaceTier::Community
    }
}
