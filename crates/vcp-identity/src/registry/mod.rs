//! Privacy-preserving token registry.
//!
//! The registry owns every [`RegistryEntry`] and keeps two indexes in step
//! with them:
//!
//! - a [`HierarchyIndex`] holding the active entry for every
//!   `(canonical, namespace)` key, used to resolve patterns;
//! - an [`ExistenceIndex`] over canonical paths, used only to prune
//!   traversal.
//!
//! ## Concurrency
//!
//! All state sits behind one `RwLock`. `register` and `revoke` take the
//! write lock, because a trie insertion and a Bloom insertion are not
//! atomic as a pair; `find` and the other readers share the read lock.
//! Every operation is synchronous and bounded.
//!
//! ## Supersession
//!
//! Re-registering a key at a strictly more restrictive tier supersedes the
//! current entry; re-registering at an equal or looser tier is rejected with
//! [`RegistryError::NamespaceCollision`]. A namespace variant may not sit at a
//! looser tier than another active variant of the same canonical path.
//! Superseded entries are kept for audit and never appear in query results.
//! There is no physical delete: [`Registry::revoke`] registers a tombstone
//! at [`PrivacyTier::Revoked`].

pub mod entry;
pub mod query;
pub mod subscription;
pub mod tier;

use std::collections::{BTreeMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace, warn};

use crate::auth::Authorization;
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::index::{ExistenceIndex, HierarchyIndex};
use crate::proof::{Challenge, Commitment};
use crate::token::{Pattern, Token};

pub use entry::{EntryId, EntryState, RegistryEntry};
pub use query::{result_order, QueryResult};
pub use subscription::{Callback, Notification, RegistryEvent, SubscriptionId};
pub use tier::{
    infer_org_scope, infer_privacy_tier, visibility, visible, AccessContext, PrivacyTier,
    Visibility, ORG_DOMAINS,
};

use subscription::Subscription;

/// Point-in-time counters, for diagnostics.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RegistryStats {
    /// Every entry ever registered, including superseded ones.
    pub entries: usize,
    /// Entries currently active (one per `(canonical, namespace)` key).
    pub active: usize,
    pub superseded: usize,
    /// Distinct canonical paths.
    pub canonical_paths: usize,
    pub trie_nodes: usize,
    pub existence_capacity: usize,
    pub existence_bits: usize,
    pub existence_hashes: u32,
    pub existence_estimated_fp_rate: f64,
}

struct RegistryState {
    entries: Vec<RegistryEntry>,
    hierarchy: HierarchyIndex,
    existence: ExistenceIndex,
    canonicals: HashSet<String>,
    challenge: Challenge,
}

/// In-memory token registry.
///
/// Construct one explicitly and share it by reference or `Arc`; there is no
/// process-wide instance.
pub struct Registry {
    config: RegistryConfig,
    state: RwLock<RegistryState>,
    subscriptions: Mutex<BTreeMap<SubscriptionId, Subscription>>,
    next_subscription: AtomicU64,
}

impl Registry {
    /// Create an empty registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry.
    pub fn with_config(config: RegistryConfig) -> Self {
        let config = config.normalized();
        let existence =
            ExistenceIndex::with_capacity(config.expected_entries, config.false_positive_rate);
        Self {
            state: RwLock::new(RegistryState {
                entries: Vec::new(),
                hierarchy: HierarchyIndex::new(),
                existence,
                canonicals: HashSet::new(),
                challenge: Challenge::issue(),
            }),
            config,
            subscriptions: Mutex::new(BTreeMap::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Rebuild a registry from a previously exported entry list.
    ///
    /// Entries must be in id order with ids `0..n`, and each
    /// `(canonical, namespace)` key must have at most one active entry.
    /// Supersession links must pair up: `supersedes` points to an earlier
    /// entry for the same key whose `superseded_by` points back, and only
    /// superseded entries carry `superseded_by`.
    pub fn from_entries(config: RegistryConfig, entries: Vec<RegistryEntry>) -> Result<Self> {
        let registry = Self::with_config(config);
        {
            let mut state = registry.write_state();
            for (i, entry) in entries.into_iter().enumerate() {
                if entry.id != EntryId(i as u64) {
                    return Err(RegistryError::InvalidFileFormat(format!(
                        "entry at position {i} has id {}",
                        entry.id
                    )));
                }
                if entry.is_active() && state.hierarchy.insert(&entry.token, entry.id).is_some() {
                    return Err(RegistryError::InvalidFileFormat(format!(
                        "more than one active entry for {}",
                        entry.token.full()
                    )));
                }
                state.canonicals.insert(entry.token.canonical());
                state.entries.push(entry);
            }
            check_links(&state.entries)?;
            registry.rebuild_existence(&mut state);
        }
        Ok(registry)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ── Writers ──────────────────────────────────────────────────────────────

    /// Register `token` at `tier`.
    ///
    /// `owner_commitment` is required for, and only accepted with,
    /// [`PrivacyTier::Pseudonymous`]. An `ORGANIZATIONAL` entry without an
    /// explicit `org_scope` takes the organization named by its token
    /// (`acme` in `company.acme.legal`), if any.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NamespaceCollision`] if the `(canonical, namespace)`
    ///   key is already active at an equal or stricter tier, or if another
    ///   namespace variant of the same canonical path is active at a
    ///   stricter tier.
    /// - [`RegistryError::InvalidProof`] on a missing or unexpected commitment.
    pub fn register(
        &self,
        token: Token,
        tier: PrivacyTier,
        owner_commitment: Option<Commitment>,
        org_scope: Option<String>,
    ) -> Result<RegistryEntry> {
        match (tier, &owner_commitment) {
            (PrivacyTier::Pseudonymous, None) => {
                return Err(RegistryError::InvalidProof(
                    "pseudonymous registration requires an owner commitment".into(),
                ))
            }
            (t, Some(_)) if t != PrivacyTier::Pseudonymous => {
                return Err(RegistryError::InvalidProof(format!(
                    "owner commitment is only accepted for {}, not {t}",
                    PrivacyTier::Pseudonymous
                )))
            }
            _ => {}
        }

        let org_scope = org_scope
            .filter(|s| !s.trim().is_empty())
            .or_else(|| match tier {
                PrivacyTier::Organizational => infer_org_scope(&token),
                _ => None,
            });

        self.insert(token, tier, owner_commitment, org_scope)
    }

    /// Tombstone the active entry for `token`'s `(canonical, namespace)` key.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if nothing is registered for the key;
    /// [`RegistryError::NamespaceCollision`] if it is already revoked.
    pub fn revoke(&self, token: &Token) -> Result<RegistryEntry> {
        let org_scope = {
            let state = self.read_state();
            let id = state.hierarchy.get(token).ok_or_else(|| {
                RegistryError::NotFound(format!("no registered entry for {}", token.full()))
            })?;
            state.entries[id.0 as usize].org_scope.clone()
        };
        self.insert(token.clone(), PrivacyTier::Revoked, None, org_scope)
    }

    /// Issue a fresh ownership challenge, invalidating signatures over the
    /// previous one.
    pub fn rotate_challenge(&self) -> Challenge {
        let mut state = self.write_state();
        state.challenge = Challenge::issue();
        debug!("rotated ownership challenge");
        state.challenge.clone()
    }

    fn insert(
        &self,
        token: Token,
        tier: PrivacyTier,
        owner_commitment: Option<Commitment>,
        org_scope: Option<String>,
    ) -> Result<RegistryEntry> {
        let (entry, previous, challenge) = {
            let mut state = self.write_state();

            for variant in state.hierarchy.variants(&token) {
                let other = &state.entries[variant.0 as usize];
                if other.privacy_tier > tier {
                    return Err(RegistryError::NamespaceCollision {
                        canonical: token.canonical(),
                        namespace: token.namespace().map(str::to_string),
                        existing: other.privacy_tier,
                        requested: tier,
                    });
                }
            }

            let previous = match state.hierarchy.get(&token) {
                Some(prev_id) => {
                    let prev = &state.entries[prev_id.0 as usize];
                    if !tier.is_stricter_than(prev.privacy_tier) {
                        return Err(RegistryError::NamespaceCollision {
                            canonical: token.canonical(),
                            namespace: token.namespace().map(str::to_string),
                            existing: prev.privacy_tier,
                            requested: tier,
                        });
                    }
                    Some(prev_id)
                }
                None => None,
            };

            let id = EntryId(state.entries.len() as u64);
            let entry = RegistryEntry {
                id,
                token,
                privacy_tier: tier,
                owner_commitment,
                org_scope,
                state: EntryState::Active,
                registered_at: crate::time::now_micros(),
                supersedes: previous,
                superseded_by: None,
            };

            let previous = previous.map(|prev_id| {
                let prev = &mut state.entries[prev_id.0 as usize];
                prev.state = EntryState::Superseded;
                prev.superseded_by = Some(id);
                prev.clone()
            });

            state.hierarchy.insert(&entry.token, id);
            let canonical = entry.token.canonical();
            if state.canonicals.insert(canonical.clone()) {
                state.existence.insert(&canonical);
                if state.existence.needs_rebuild(self.config.load_factor) {
                    self.rebuild_existence(&mut state);
                }
            }
            state.entries.push(entry.clone());

            match &previous {
                Some(prev) => debug!(
                    "{} superseded {} at tier {} (was {})",
                    id, prev.id, tier, prev.privacy_tier
                ),
                None => debug!("registered {} at tier {}", id, tier),
            }

            (entry, previous, state.challenge.clone())
        };

        self.notify(&entry, previous.as_ref(), &challenge);
        Ok(entry)
    }

    fn rebuild_existence(&self, state: &mut RegistryState) {
        let capacity = self
            .config
            .expected_entries
            .max(state.canonicals.len().saturating_mul(2));
        state.existence = ExistenceIndex::rebuild(
            state.canonicals.iter().map(String::as_str),
            capacity,
            self.config.false_positive_rate,
        );
        debug!(
            "rebuilt existence index: {} paths, capacity {}, {} bits",
            state.canonicals.len(),
            capacity,
            state.existence.num_bits()
        );
    }

    // ── Readers ──────────────────────────────────────────────────────────────

    /// Find every visible token matching `pattern`.
    ///
    /// Never fails on "no matches"; fails only with
    /// [`RegistryError::InvalidPattern`] for a malformed pattern.
    pub fn find(&self, pattern: &str, authorization: &Authorization) -> Result<QueryResult> {
        self.find_inner(pattern, authorization, None)
    }

    /// Like [`find`](Self::find), returning at most `limit` tokens.
    pub fn find_limited(
        &self,
        pattern: &str,
        authorization: &Authorization,
        limit: usize,
    ) -> Result<QueryResult> {
        self.find_inner(pattern, authorization, Some(limit))
    }

    fn find_inner(
        &self,
        pattern: &str,
        authorization: &Authorization,
        limit: Option<usize>,
    ) -> Result<QueryResult> {
        let pattern = Pattern::parse(pattern)?;
        let state = self.read_state();

        let resolution = state.hierarchy.resolve(&pattern, &state.existence);
        let ctx = AccessContext::new(authorization, &state.challenge);
        let result = query::assemble(
            resolution
                .ids
                .iter()
                .map(|id| &state.entries[id.0 as usize]),
            &ctx,
            limit,
        );

        trace!(
            "find: {} candidates, {} visible, {} redacted, {} nodes visited, {} pruned",
            resolution.ids.len(),
            result.tokens.len(),
            result.redacted_count,
            resolution.visited,
            resolution.pruned
        );
        Ok(result)
    }

    /// Exact lookup of the active entry for `token`'s
    /// `(canonical, namespace)` key, subject to the same visibility rules
    /// as [`find`](Self::find).
    pub fn resolve(&self, token: &Token, authorization: &Authorization) -> Option<RegistryEntry> {
        let state = self.read_state();
        if !state.existence.might_contain(&token.canonical()) {
            return None;
        }
        let id = state.hierarchy.get(token)?;
        let entry = &state.entries[id.0 as usize];
        let ctx = AccessContext::new(authorization, &state.challenge);
        visible(entry, &ctx).then(|| entry.clone())
    }

    /// Advisory existence probe: `false` means definitely never registered.
    pub fn might_exist(&self, token: &Token) -> bool {
        self.read_state()
            .existence
            .might_contain(&token.canonical())
    }

    /// Every entry registered for `token`'s `(canonical, namespace)` key,
    /// oldest first.
    pub fn history(&self, token: &Token) -> Vec<RegistryEntry> {
        let state = self.read_state();
        let mut out = Vec::new();
        let mut cursor = state.hierarchy.get(token);
        while let Some(entry) = cursor.and_then(|id| state.entries.get(id.0 as usize)) {
            out.push(entry.clone());
            // Links only ever point backwards.
            cursor = entry.supersedes.filter(|prev| *prev < entry.id);
        }
        out.reverse();
        out
    }

    /// Snapshot of every entry, in id order.
    pub fn entries(&self) -> Vec<RegistryEntry> {
        self.read_state().entries.clone()
    }

    /// Look up an entry by id.
    pub fn entry(&self, id: EntryId) -> Option<RegistryEntry> {
        self.read_state().entries.get(id.0 as usize).cloned()
    }

    /// Current ownership challenge.
    pub fn challenge(&self) -> Challenge {
        self.read_state().challenge.clone()
    }

    /// Number of entries ever registered.
    pub fn len(&self) -> usize {
        self.read_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().entries.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        let state = self.read_state();
        let active = state.hierarchy.len();
        RegistryStats {
            entries: state.entries.len(),
            active,
            superseded: state.entries.len() - active,
            canonical_paths: state.canonicals.len(),
            trie_nodes: state.hierarchy.node_count(),
            existence_capacity: state.existence.capacity(),
            existence_bits: state.existence.num_bits(),
            existence_hashes: state.existence.num_hashes(),
            existence_estimated_fp_rate: state.existence.estimated_false_positive_rate(),
        }
    }

    // ── Subscriptions ────────────────────────────────────────────────────────

    /// Call `callback` for each future change to a token matching
    /// `pattern` that `authorization` may see.
    ///
    /// Revocations are delivered to subscribers who could see the entry
    /// being revoked.
    pub fn subscribe<F>(
        &self,
        pattern: &str,
        authorization: Authorization,
        callback: F,
    ) -> Result<SubscriptionId>
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let pattern = Pattern::parse(pattern)?;
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.lock_subscriptions().insert(
            id,
            Subscription {
                pattern,
                authorization,
                callback: std::sync::Arc::new(callback),
            },
        );
        debug!("added subscription {id}");
        Ok(id)
    }

    /// Remove a subscription. Returns `false` if it did not exist.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock_subscriptions().remove(&id).is_some()
    }

    fn notify(&self, entry: &RegistryEntry, previous: Option<&RegistryEntry>, challenge: &Challenge) {
        let (event, subject) = match (entry.privacy_tier, previous) {
            (PrivacyTier::Revoked, Some(prev)) => (RegistryEvent::Revoked, prev),
            (_, Some(_)) => (RegistryEvent::Superseded, entry),
            (_, None) => (RegistryEvent::Registered, entry),
        };

        let targets: Vec<Callback> = self
            .lock_subscriptions()
            .values()
            .filter(|sub| sub.pattern.matches(&entry.token))
            .filter(|sub| visible(subject, &AccessContext::new(&sub.authorization, challenge)))
            .map(|sub| sub.callback.clone())
            .collect();

        if targets.is_empty() {
            return;
        }

        let notification = Notification {
            event,
            token: entry.token.clone(),
            privacy_tier: entry.privacy_tier,
        };
        for callback in targets {
            if catch_unwind(AssertUnwindSafe(|| callback(&notification))).is_err() {
                warn!("subscriber callback panicked handling {event:?}");
            }
        }
    }

    // ── Locks ────────────────────────────────────────────────────────────────

    fn read_state(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscriptions(&self) -> MutexGuard<'_, BTreeMap<SubscriptionId, Subscription>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Verify that supersession links in a restored entry list pair up.
fn check_links(entries: &[RegistryEntry]) -> Result<()> {
    let linked = |id: EntryId| entries.get(id.0 as usize);
    for entry in entries {
        if let Some(prev_id) = entry.supersedes {
            let ok = prev_id < entry.id
                && linked(prev_id).is_some_and(|prev| {
                    prev.superseded_by == Some(entry.id) && prev.key() == entry.key()
                });
            if !ok {
                return Err(RegistryError::InvalidFileFormat(format!(
                    "{} supersedes {prev_id}, which does not link back",
                    entry.id
                )));
            }
        }
        match entry.superseded_by {
            Some(next_id) => {
                let ok = next_id > entry.id
                    && !entry.is_active()
                    && linked(next_id).is_some_and(|next| next.supersedes == Some(entry.id));
                if !ok {
                    return Err(RegistryError::InvalidFileFormat(format!(
                        "{} superseded by {next_id}, which does not link back",
                        entry.id
                    )));
                }
            }
            None if !entry.is_active() => {
                return Err(RegistryError::InvalidFileFormat(format!(
                    "{} is superseded but names no successor",
                    entry.id
                )));
            }
            None => {}
        }
    }
    Ok(())
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
