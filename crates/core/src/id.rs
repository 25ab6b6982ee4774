//! Strongly-typed identifiers used across the domain.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Composite identity of a course item.
///
/// Structural equality, hashing and ordering make it usable directly as a
/// set/map key. The derived ordering is `code`, then `kind`, then `part`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseId {
    pub code: String,
    pub kind: String,
    pub part: i64,
}

impl CourseId {
    pub fn new(code: impl Into<String>, kind: impl Into<String>, part: i64) -> Self {
        Self {
            code: code.into(),
            kind: kind.into(),
            part,
        }
    }

    /// Lower-case slug (`course-lu3in005-td-1`) safe for URLs and element ids.
    pub fn slug(&self) -> String {
        let raw = format!("course-{}-{}-{}", self.code, self.kind, self.part);
        let mut slug = String::with_capacity(raw.len());
        let mut in_separator = false;
        for c in raw.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
                in_separator = false;
            } else if !in_separator {
                slug.push('-');
                in_separator = true;
            }
        }
        slug
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.code, self.kind, self.part)
    }
}

impl FromStr for CourseId {
    type Err = DomainError;

    /// Parses the `CODE/KIND/PART` rendering produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.splitn(3, '/');
        let (Some(code), Some(kind), Some(part)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(DomainError::format(format!(
                "course id must look like CODE/KIND/PART, got {s:?}"
            )));
        };
        let part = part
            .trim()
            .parse::<i64>()
            .map_err(|e| DomainError::format(format!("invalid part {part:?}: {e}")))?;
        Ok(Self::new(code.trim(), kind.trim(), part))
    }
}

/// Identifier of a pack, assigned by the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackId(i64);

impl PackId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for PackId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<PackId> for i64 {
    fn from(value: PackId) -> Self {
        value.0
    }
}

impl FromStr for PackId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<i64>()
            .map_err(|e| DomainError::format(format!("PackId: {e}")))?;
        Ok(Self(raw))
    }
}
