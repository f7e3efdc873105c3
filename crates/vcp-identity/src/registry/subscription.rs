//! Change notifications for registry subscribers.
//!
//! Subscribers are called synchronously by the registering thread after
//! the registry's write lock has been released. A subscriber only hears
//! about entries it would be allowed to see in a query.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::Authorization;
use crate::token::{Pattern, Token};

use super::PrivacyTier;

/// Handle returned by [`Registry::subscribe`](super::Registry::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// What happened to a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryEvent {
    /// First registration of a `(canonical, namespace)` key.
    Registered,
    /// A stricter-tier entry replaced the previous one.
    Superseded,
    /// The key was tombstoned.
    Revoked,
}

/// Payload delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub event: RegistryEvent,
    pub token: Token,
    pub privacy_tier: PrivacyTier,
}

/// Subscriber callback.
pub type Callback = Arc<dyn Fn(&Notification) + Send + Sync>;

pub(crate) struct Subscription {
    pub(crate) pattern: Pattern,
    pub(crate) authorization: Authorization,
    pub(crate) callback: Callback,
}
