//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Default registry host used when rendering token URIs.
pub const DEFAULT_REGISTRY_HOST: &str = "creed.space";

/// Tunables for a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Initial existence-index capacity.
    pub expected_entries: usize,
    /// Target false-positive rate of the existence index, in (0, 0.5].
    pub false_positive_rate: f64,
    /// The existence index is rebuilt, larger, once distinct canonical
    /// paths exceed `load_factor × capacity`.
    pub load_factor: f64,
    /// Host used by [`Token::to_uri`](crate::Token::to_uri) renderings.
    pub registry_host: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            expected_entries: 1024,
            false_positive_rate: 0.01,
            load_factor: 1.0,
            registry_host: DEFAULT_REGISTRY_HOST.to_string(),
        }
    }
}

impl RegistryConfig {
    pub fn with_expected_entries(mut self, n: usize) -> Self {
        self.expected_entries = n;
        self
    }

    pub fn with_false_positive_rate(mut self, rate: f64) -> Self {
        self.false_positive_rate = rate;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_registry_host(mut self, host: impl Into<String>) -> Self {
        self.registry_host = host.into();
        self
    }

    /// Replace out-of-range values with defaults.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if self.expected_entries == 0 {
            self.expected_entries = defaults.expected_entries;
        }
        if !(self.false_positive_rate > 0.0 && self.false_positive_rate <= 0.5) {
            self.false_positive_rate = defaults.false_positive_rate;
        }
        if !(self.load_factor > 0.0 && self.load_factor.is_finite()) {
            self.load_factor = defaults.load_factor;
        }
        if self.registry_host.trim().is_empty() {
            self.registry_host = defaults.registry_host;
        }
        self
    }
}
