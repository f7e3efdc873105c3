//! Query results and their assembly.
//!
//! A query resolves a pattern against the hierarchy index, then filters
//! every candidate through [`visibility`](super::visibility):
//!
//! 1. visible entries contribute their token;
//! 2. redacted entries only bump `redacted_count`;
//! 3. hidden (revoked) entries contribute nothing.
//!
//! Tokens are ordered by depth, then canonical form, then namespace, so
//! results never depend on insertion order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::token::Token;

use super::tier::{visibility, AccessContext, Visibility};
use super::RegistryEntry;

/// Result of [`Registry::find`](super::Registry::find).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Visible matches, depth ascending then lexicographic.
    pub tokens: Vec<Token>,
    /// Matches withheld by privacy tier.
    pub redacted_count: usize,
    /// `false` whenever any match was withheld.
    pub scope_authorized: bool,
    /// `true` when a limit cut visible tokens from `tokens`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Visible plus redacted matches.
    pub fn total_matched(&self) -> usize {
        self.tokens.len() + self.redacted_count
    }
}

/// Deterministic result order.
pub fn result_order(a: &Token, b: &Token) -> Ordering {
    a.depth()
        .cmp(&b.depth())
        .then_with(|| a.canonical().cmp(&b.canonical()))
        .then_with(|| a.namespace().cmp(&b.namespace()))
}

/// Filter candidates and build a result.
pub(crate) fn assemble<'e, I>(
    candidates: I,
    ctx: &AccessContext<'_>,
    limit: Option<usize>,
) -> QueryResult
where
    I: IntoIterator<Item = &'e RegistryEntry>,
{
    let mut tokens = Vec::new();
    let mut redacted_count = 0;

    for entry in candidates {
        match visibility(entry, ctx) {
            Visibility::Visible => tokens.push(entry.token.clone()),
            Visibility::Redacted => redacted_count += 1,
            Visibility::Hidden => {}
        }
    }

    tokens.sort_by(result_order);

    let mut truncated = false;
    if let Some(limit) = limit {
        truncated = tokens.len() > limit;
        tokens.truncate(limit);
    }

    QueryResult {
        tokens,
        redacted_count,
        scope_authorized: redacted_count == 0,
        truncated,
    }
}
