//! Registry persistence.
//!
//! A registry is saved as a single JSON snapshot holding its configuration
//! and the authoritative entry list. Indexes are never written; loading
//! rebuilds them from the entries.
//!
//! ```text
//! ~/.vcp/
//! └── registry.json
//! ```

pub mod registry_file;

pub use registry_file::{load_registry, save_registry, RegistryFile};
