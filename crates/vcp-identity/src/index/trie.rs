//! Segment prefix tree for pattern resolution.
//!
//! Each node is one segment value at one depth. A node holds the current
//! entry for every namespace variant of the canonical path that ends there,
//! keyed by namespace, so `(canonical, namespace)` identifies a leaf.
//!
//! Resolution branches on the pattern:
//! - literal segment: descend into exactly one child;
//! - `*`: descend into every child;
//! - trailing `**`: collect every leaf strictly below the current node.
//!
//! Cost is proportional to the visited subtree, not to the registry size.

use std::collections::BTreeMap;

use crate::registry::EntryId;
use crate::token::{Pattern, PatternSegment, Token};

use super::ExistenceIndex;

#[derive(Debug, Default, Clone)]
struct Node {
    children: BTreeMap<String, Node>,
    /// namespace → current entry for `(path-to-here, namespace)`.
    leaves: BTreeMap<Option<String>, EntryId>,
}

/// Candidates produced by a pattern walk, plus traversal statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Leaf entries whose path matches the pattern, in trie order.
    pub ids: Vec<EntryId>,
    /// Trie nodes visited.
    pub visited: usize,
    /// Subtrees skipped because the existence index ruled them out.
    pub pruned: usize,
}

/// Prefix tree over token segments.
#[derive(Debug, Default, Clone)]
pub struct HierarchyIndex {
    root: Node,
    leaf_count: usize,
    node_count: usize,
}

impl HierarchyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `id` as the current leaf for `(token.canonical, token.namespace)`,
    /// creating the path as needed. Returns the leaf it displaced, if any.
    ///
    /// O(depth).
    pub fn insert(&mut self, token: &Token, id: EntryId) -> Option<EntryId> {
        let mut node = &mut self.root;
        for segment in token.segments() {
            if !node.children.contains_key(segment) {
                self.node_count += 1;
            }
            node = node.children.entry(segment.clone()).or_default();
        }
        let displaced = node
            .leaves
            .insert(token.namespace().map(str::to_string), id);
        if displaced.is_none() {
            self.leaf_count += 1;
        }
        displaced
    }

    /// Current leaf for `(token.canonical, token.namespace)`.
    pub fn get(&self, token: &Token) -> Option<EntryId> {
        let node = self.node_at(token.segments())?;
        node.leaves
            .get(&token.namespace().map(str::to_string))
            .copied()
    }

    /// Every namespace variant registered at exactly `token`'s path.
    pub fn variants(&self, token: &Token) -> Vec<EntryId> {
        self.node_at(token.segments())
            .map(|n| n.leaves.values().copied().collect())
            .unwrap_or_default()
    }

    /// Walk the tree for `pattern`.
    ///
    /// Wherever the remainder of the pattern is fully literal, the
    /// implied canonical path is probed in `existence` first, and the
    /// walk stops early on a definite miss.
    pub fn resolve(&self, pattern: &Pattern, existence: &ExistenceIndex) -> Resolution {
        let mut out = Resolution::default();
        let mut path: Vec<&str> = Vec::with_capacity(pattern.fixed().len());
        walk(&self.root, pattern, 0, &mut path, existence, &mut out);
        out
    }

    /// Number of `(canonical, namespace)` leaves.
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// Number of non-root nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    fn node_at(&self, segments: &[String]) -> Option<&Node> {
        segments
            .iter()
            .try_fold(&self.root, |node, seg| node.children.get(seg))
    }
}

fn walk<'a>(
    node: &'a Node,
    pattern: &Pattern,
    idx: usize,
    path: &mut Vec<&'a str>,
    existence: &ExistenceIndex,
    out: &mut Resolution,
) {
    out.visited += 1;
    let fixed = pattern.fixed();

    if idx == fixed.len() {
        if pattern.is_trailing() {
            // `**` must consume at least one segment: skip this node's own
            // leaves and take everything beneath it.
            for child in node.children.values() {
                collect_subtree(child, out);
            }
        } else {
            out.ids.extend(node.leaves.values().copied());
        }
        return;
    }

    let tail_starts_here = idx == 0 || fixed[idx - 1] == PatternSegment::Any;
    if tail_starts_here {
        if let Some(tail) = pattern.literal_tail(idx) {
            let candidate = path
                .iter()
                .copied()
                .chain(tail.iter().copied())
                .collect::<Vec<_>>()
                .join(".");
            if !existence.might_contain(&candidate) {
                out.pruned += 1;
                return;
            }
        }
    }

    match &fixed[idx] {
        PatternSegment::Literal(seg) => {
            if let Some((key, child)) = node.children.get_key_value(seg) {
                path.push(key);
                walk(child, pattern, idx + 1, path, existence, out);
                path.pop();
            }
        }
        PatternSegment::Any => {
            for (key, child) in &node.children {
                path.push(key);
                walk(child, pattern, idx + 1, path, existence, out);
                path.pop();
            }
        }
    }
}

fn collect_subtree(node: &Node, out: &mut Resolution) {
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        out.visited += 1;
        out.ids.extend(n.leaves.values().copied());
        stack.extend(n.children.values().rev());
    }
}
