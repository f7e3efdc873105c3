//! Strict `MAJOR.MINOR.PATCH` versions carried as token metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// A strict semantic version: three dot-separated decimal numbers, no
/// pre-release or build suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemVer {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `1*DIGIT "." 1*DIGIT "." 1*DIGIT`.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split('.');
        let (Some(major), Some(minor), Some(patch), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(RegistryError::MalformedToken(format!(
                "invalid version {s:?}: expected MAJOR.MINOR.PATCH"
            )));
        };
        Ok(Self {
            major: parse_component(major, s)?,
            minor: parse_component(minor, s)?,
            patch: parse_component(patch, s)?,
        })
    }
}

fn parse_component(part: &str, whole: &str) -> Result<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RegistryError::MalformedToken(format!(
            "invalid version {whole:?}: components must be decimal digits"
        )));
    }
    part.parse().map_err(|_| {
        RegistryError::MalformedToken(format!("invalid version {whole:?}: component overflow"))
    })
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
