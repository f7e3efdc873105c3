//! Indexes backing the registry.
//!
//! - [`ExistenceIndex`] answers "might this canonical token exist?" in O(1)
//!   with no false negatives. It is advisory only and never a source of
//!   truth.
//! - [`HierarchyIndex`] is a prefix tree keyed by token segments that
//!   resolves wildcard patterns in time proportional to the matched subtree.
//!
//! Both hold only canonical paths and [`EntryId`](crate::registry::EntryId)
//! handles; entry records stay owned by the registry.

pub mod bloom;
pub mod trie;

pub use bloom::ExistenceIndex;
pub use trie::{HierarchyIndex, Resolution};
