//! Hierarchical identity tokens.
//!
//! A token names "who/what" an entity is as a dotted path of 3 to 10
//! lowercase segments, optionally followed by a semantic version and an
//! uppercase namespace:
//!
//! ```text
//! token      = segment 2*9("." segment) ["@" version] [":" namespace]
//! segment    = LOWER *( LOWER / DIGIT / "-" )
//! namespace  = UPPER *( UPPER / DIGIT )
//! version    = 1*DIGIT "." 1*DIGIT "." 1*DIGIT
//! ```
//!
//! Examples:
//!   - `family.safe.guide`
//!   - `family.safe.guide@1.2.0`
//!   - `company.acme.legal.compliance:SEC`
//!   - `org.example.dept.team.policy@1.0.0:GOV`
//!
//! Identity is the canonical path only. Version and namespace are metadata:
//! two tokens with the same segments compare equal regardless of either.

pub mod namespace;
pub mod pattern;
pub mod semver;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

pub use namespace::{infer_namespace_tier, is_core_domain, NamespaceTier, CORE_DOMAINS};
pub use pattern::{Pattern, PatternSegment};
pub use semver::SemVer;

/// Minimum number of segments in a token.
pub const MIN_SEGMENTS: usize = 3;
/// Maximum number of segments in a token.
pub const MAX_SEGMENTS: usize = 10;
/// Maximum length of a raw token string, in bytes.
pub const MAX_LENGTH: usize = 256;
/// Maximum length of a single segment, in bytes.
pub const MAX_SEGMENT_LENGTH: usize = 32;
/// URI scheme used by [`Token::to_uri`].
pub const URI_SCHEME: &str = "creed";

/// A validated hierarchical identity token.
///
/// Construction always validates; there is no way to obtain a `Token` that
/// violates the grammar or the depth bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token {
    segments: Vec<String>,
    version: Option<SemVer>,
    namespace: Option<String>,
}

impl Token {
    /// Parse and validate a raw token string.
    ///
    /// Fails with [`RegistryError::MalformedToken`] on any grammar violation;
    /// nothing is partially consumed.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(RegistryError::MalformedToken(
                "token cannot be empty".into(),
            ));
        }
        if raw.len() > MAX_LENGTH {
            return Err(RegistryError::MalformedToken(format!(
                "token exceeds max length {MAX_LENGTH}: {}",
                raw.len()
            )));
        }

        let (rest, namespace) = match raw.split_once(':') {
            Some((rest, ns)) => {
                validate_namespace(ns)?;
                (rest, Some(ns.to_string()))
            }
            None => (raw, None),
        };

        let (path, version) = match rest.split_once('@') {
            Some((path, v)) => (path, Some(SemVer::parse(v)?)),
            None => (rest, None),
        };

        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        validate_depth(segments.len())?;
        for (i, seg) in segments.iter().enumerate() {
            validate_segment(seg, i)?;
        }

        Ok(Self {
            segments,
            version,
            namespace,
        })
    }

    /// Build a token directly from segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        validate_depth(segments.len())?;
        for (i, seg) in segments.iter().enumerate() {
            validate_segment(seg, i)?;
        }
        Ok(Self {
            segments,
            version: None,
            namespace: None,
        })
    }

    /// All segments, in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Optional semantic version.
    pub fn version(&self) -> Option<&SemVer> {
        self.version.as_ref()
    }

    /// Optional namespace classification.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// First segment.
    pub fn domain(&self) -> &str {
        &self.segments[0]
    }

    /// Second-to-last segment.
    pub fn approach(&self) -> &str {
        &self.segments[self.segments.len() - 2]
    }

    /// Last segment.
    pub fn role(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Segments strictly between the domain and the approach.
    ///
    /// Empty for 3-segment tokens.
    pub fn path(&self) -> &[String] {
        &self.segments[1..self.segments.len() - 2]
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Canonical form: segments joined by `.`, without version or namespace.
    pub fn canonical(&self) -> String {
        self.segments.join(".")
    }

    /// Full form: `canonical[@version][:namespace]`.
    pub fn full(&self) -> String {
        let mut out = self.canonical();
        if let Some(v) = &self.version {
            out.push('@');
            out.push_str(&v.to_string());
        }
        if let Some(ns) = &self.namespace {
            out.push(':');
            out.push_str(ns);
        }
        out
    }

    /// Render as `creed://host/canonical[@version]`.
    ///
    /// The namespace is a registry-side classification and is not part of
    /// the global identity, so it never appears in the URI.
    pub fn to_uri(&self, registry_host: &str) -> String {
        match &self.version {
            Some(v) => format!("{URI_SCHEME}://{registry_host}/{}@{v}", self.canonical()),
            None => format!("{URI_SCHEME}://{registry_host}/{}", self.canonical()),
        }
    }

    /// Return a copy with the given version.
    pub fn with_version(&self, version: SemVer) -> Self {
        Self {
            segments: self.segments.clone(),
            version: Some(version),
            namespace: self.namespace.clone(),
        }
    }

    /// Return a copy with the given namespace.
    pub fn with_namespace(&self, namespace: &str) -> Result<Self> {
        validate_namespace(namespace)?;
        Ok(Self {
            segments: self.segments.clone(),
            version: self.version.clone(),
            namespace: Some(namespace.to_string()),
        })
    }

    /// Parent token, one segment shorter, or `None` at minimum depth.
    ///
    /// The parent keeps the namespace but drops the version.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= MIN_SEGMENTS {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
            version: None,
            namespace: self.namespace.clone(),
        })
    }

    /// Child token with one more segment. Version is dropped.
    pub fn child(&self, segment: &str) -> Result<Self> {
        if self.segments.len() >= MAX_SEGMENTS {
            return Err(RegistryError::MalformedToken(format!(
                "cannot add segment: max depth {MAX_SEGMENTS}"
            )));
        }
        validate_segment(segment, self.segments.len())?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self {
            segments,
            version: None,
            namespace: self.namespace.clone(),
        })
    }

    /// True iff `self` is a strict, in-order prefix of `other` within the
    /// same domain.
    pub fn is_ancestor_of(&self, other: &Token) -> bool {
        if self.domain() != other.domain() {
            return false;
        }
        self.segments.len() < other.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// True iff `other` is an ancestor of `self`.
    pub fn is_descendant_of(&self, other: &Token) -> bool {
        other.is_ancestor_of(self)
    }

    /// Match against a glob-like pattern string.
    ///
    /// `*` matches exactly one segment; a trailing `**` matches one or more
    /// remaining segments. A pattern that fails to parse matches nothing.
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        Pattern::parse(pattern)
            .map(|p| p.matches(self))
            .unwrap_or(false)
    }
}

// ── Validation ───────────────────────────────────────────────────────────────

fn validate_depth(depth: usize) -> Result<()> {
    if depth < MIN_SEGMENTS {
        return Err(RegistryError::MalformedToken(format!(
            "token requires at least {MIN_SEGMENTS} segments, got {depth}"
        )));
    }
    if depth > MAX_SEGMENTS {
        return Err(RegistryError::MalformedToken(format!(
            "token exceeds maximum {MAX_SEGMENTS} segments, got {depth}"
        )));
    }
    Ok(())
}

/// Check a single segment against `[a-z][a-z0-9-]*`.
pub(crate) fn validate_segment(seg: &str, index: usize) -> Result<()> {
    if seg.is_empty() {
        return Err(RegistryError::MalformedToken(format!(
            "segment {} is empty",
            index + 1
        )));
    }
    if seg.len() > MAX_SEGMENT_LENGTH {
        return Err(RegistryError::MalformedToken(format!(
            "segment {} exceeds max length {MAX_SEGMENT_LENGTH}",
            index + 1
        )));
    }
    if !is_valid_segment(seg) {
        return Err(RegistryError::MalformedToken(format!(
            "segment {} has invalid characters: {seg:?}",
            index + 1
        )));
    }
    Ok(())
}

pub(crate) fn is_valid_segment(seg: &str) -> bool {
    let mut chars = seg.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn validate_namespace(ns: &str) -> Result<()> {
    let mut chars = ns.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {
            chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        }
        _ => false,
    };
    if !valid {
        return Err(RegistryError::MalformedToken(format!(
            "invalid namespace {ns:?}: expected [A-Z][A-Z0-9]*"
        )));
    }
    Ok(())
}

// ── Trait impls ──────────────────────────────────────────────────────────────

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments.hash(state);
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical().cmp(&other.canonical())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full())
    }
}

impl FromStr for Token {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Token {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.full()
    }
}
