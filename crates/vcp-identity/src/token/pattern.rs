//! Wildcard patterns over token segments.
//!
//! ```text
//! pattern = (segment / "*") *("." (segment / "*")) ["." "**"]
//! ```
//!
//! - `*` matches exactly one segment.
//! - `**` may only appear last and matches one or more trailing segments.
//!   It never matches zero segments, so `company.acme.**` does not match
//!   a (hypothetical) token `company.acme`.

use std::fmt;

use crate::error::{RegistryError, Result};

use super::{is_valid_segment, Token, MAX_LENGTH, MAX_SEGMENTS, MAX_SEGMENT_LENGTH};

/// One fixed position of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Matches this exact segment.
    Literal(String),
    /// `*`: matches any single segment.
    Any,
}

impl PatternSegment {
    pub fn matches(&self, segment: &str) -> bool {
        match self {
            Self::Literal(lit) => lit == segment,
            Self::Any => true,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(lit) => Some(lit),
            Self::Any => None,
        }
    }
}

/// A parsed, validated pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    fixed: Vec<PatternSegment>,
    trailing: bool,
}

impl Pattern {
    /// Parse a pattern string.
    ///
    /// Fails with [`RegistryError::InvalidPattern`] on any syntax violation.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(RegistryError::InvalidPattern("pattern cannot be empty".into()));
        }
        if raw.len() > MAX_LENGTH {
            return Err(RegistryError::InvalidPattern(format!(
                "pattern exceeds max length {MAX_LENGTH}: {}",
                raw.len()
            )));
        }

        let parts: Vec<&str> = raw.split('.').collect();
        let last = parts.len() - 1;
        let mut fixed = Vec::with_capacity(parts.len());
        let mut trailing = false;

        for (i, part) in parts.iter().enumerate() {
            match *part {
                "**" if i == last && i > 0 => trailing = true,
                "**" => {
                    return Err(RegistryError::InvalidPattern(format!(
                        "'**' is only allowed as the final segment after at least one other: {raw}"
                    )))
                }
                "*" => fixed.push(PatternSegment::Any),
                seg if seg.len() <= MAX_SEGMENT_LENGTH && is_valid_segment(seg) => {
                    fixed.push(PatternSegment::Literal(seg.to_string()))
                }
                seg => {
                    return Err(RegistryError::InvalidPattern(format!(
                        "segment {} is not a valid segment or wildcard: {seg:?}",
                        i + 1
                    )))
                }
            }
        }

        if fixed.len() > MAX_SEGMENTS {
            return Err(RegistryError::InvalidPattern(format!(
                "pattern has {} fixed segments, maximum is {MAX_SEGMENTS}",
                fixed.len()
            )));
        }

        Ok(Self { fixed, trailing })
    }

    /// Fixed (non-`**`) positions, in order.
    pub fn fixed(&self) -> &[PatternSegment] {
        &self.fixed
    }

    /// Whether the pattern ends with `**`.
    pub fn is_trailing(&self) -> bool {
        self.trailing
    }

    /// Whether the pattern contains no wildcard at all.
    pub fn is_exact(&self) -> bool {
        !self.trailing && self.fixed.iter().all(|s| s.as_literal().is_some())
    }

    /// If every position from `from` onwards is a literal and there is no
    /// trailing `**`, return those literals.
    pub fn literal_tail(&self, from: usize) -> Option<Vec<&str>> {
        if self.trailing {
            return None;
        }
        self.fixed
            .get(from..)?
            .iter()
            .map(PatternSegment::as_literal)
            .collect()
    }

    /// Segment-wise left-to-right match.
    pub fn matches(&self, token: &Token) -> bool {
        let segments = token.segments();
        let depth_ok = if self.trailing {
            segments.len() > self.fixed.len()
        } else {
            segments.len() == self.fixed.len()
        };
        depth_ok
            && self
                .fixed
                .iter()
                .zip(segments)
                .all(|(p, s)| p.matches(s))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.fixed.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match seg {
                PatternSegment::Literal(lit) => f.write_str(lit)?,
                PatternSegment::Any => f.write_str("*")?,
            }
        }
        if self.trailing {
            f.write_str(".**")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Pattern {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
