//! Error types for the identity token registry.
//!
//! All errors are strongly typed and surface to the caller; nothing is
//! silently swallowed. Ownership secrets and commitment preimages are
//! never included in error messages.

use crate::registry::PrivacyTier;

/// Registry error types covering token parsing, queries, and storage.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error(
        "Namespace collision on {canonical}{}: already registered at tier {existing}, cannot register at {requested}",
        namespace_suffix(.namespace)
    )]
    NamespaceCollision {
        canonical: String,
        namespace: Option<String>,
        existing: PrivacyTier,
        requested: PrivacyTier,
    },

    #[error("Unknown privacy tier: {0}")]
    UnknownTier(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid ownership proof: {0}")]
    InvalidProof(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn namespace_suffix(namespace: &Option<String>) -> String {
    namespace
        .as_deref()
        .map(|ns| format!(":{ns}"))
        .unwrap_or_default()
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, RegistryError>;
