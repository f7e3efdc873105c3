//! Registry snapshot file.
//!
//! File format (JSON):
//! ```json
//! {
//!     "version": 1,
//!     "format": "vcp-registry-v1",
//!     "config": { ... RegistryConfig ... },
//!     "entries": [ { ... RegistryEntry ... }, ... ]
//! }
//! ```
//!
//! Owner commitments are stored as hex; ownership secrets never reach the
//! file.

use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::registry::{Registry, RegistryEntry};

// ── File format constants ─────────────────────────────────────────────────────

const REGISTRY_VERSION: u32 = 1;
const REGISTRY_FORMAT: &str = "vcp-registry-v1";

// ── On-disk structures ────────────────────────────────────────────────────────

/// Top-level structure written to disk.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistryFile {
    pub version: u32,
    pub format: String,
    #[serde(default)]
    pub config: RegistryConfig,
    #[serde(default)]
    pub entries: Vec<RegistryEntry>,
}

impl RegistryFile {
    /// Snapshot `registry`.
    pub fn capture(registry: &Registry) -> Self {
        Self {
            version: REGISTRY_VERSION,
            format: REGISTRY_FORMAT.to_string(),
            config: registry.config().clone(),
            entries: registry.entries(),
        }
    }

    /// Rebuild a registry from this snapshot.
    pub fn restore(self) -> Result<Registry> {
        if self.version != REGISTRY_VERSION || self.format != REGISTRY_FORMAT {
            return Err(RegistryError::InvalidFileFormat(format!(
                "unsupported registry file version={} format={}",
                self.version, self.format
            )));
        }
        Registry::from_entries(self.config, self.entries)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Save `registry` to `path`, creating parent directories as needed.
///
/// The write goes to a sibling temporary file that is then renamed into
/// place, so readers never observe a partial snapshot.
pub fn save_registry(registry: &Registry, path: &Path) -> Result<()> {
    let file = RegistryFile::capture(registry);
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| RegistryError::SerializationError(e.to_string()))?;
    write_atomic(path, json.as_bytes())?;
    debug!("saved {} entries to {}", file.entries.len(), path.display());
    Ok(())
}

/// Load a registry from `path`.
///
/// # Errors
///
/// `RegistryError::InvalidFileFormat` for unparseable or inconsistent
/// snapshots, `RegistryError::Io` for filesystem errors.
pub fn load_registry(path: &Path) -> Result<Registry> {
    let bytes = std::fs::read(path)?;
    let file: RegistryFile = serde_json::from_slice(&bytes).map_err(|e| {
        RegistryError::InvalidFileFormat(format!("failed to parse registry file: {e}"))
    })?;
    let registry = file.restore().map_err(|e| {
        warn!("rejected registry snapshot {}: {e}", path.display());
        e
    })?;
    debug!("loaded {} entries from {}", registry.len(), path.display());
    Ok(registry)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
