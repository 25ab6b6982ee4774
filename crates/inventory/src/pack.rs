use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use polybase_core::{CourseId, DomainError, DomainResult, Entity, PackId};

use crate::course::CourseKind;

/// A named bundle of course identities sold or tracked together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pack {
    pub id: PackId,
    pub name: String,
    pub courses: Vec<CourseId>,
}

impl Entity for Pack {
    const NOUN: &'static str = "pack";
    type Id = PackId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Partial update envelope for a pack. A set member list replaces the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialPack {
    pub name: Option<String>,
    pub courses: Option<Vec<CourseId>>,
}

impl PartialPack {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.courses.is_none()
    }
}

/// Trim a pack name; fails if nothing is left.
pub fn validate_pack_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("pack name cannot be empty"));
    }
    Ok(name.to_string())
}

/// A member list must be non-empty and free of duplicates.
pub fn validate_pack_members(courses: &[CourseId]) -> DomainResult<()> {
    if courses.is_empty() {
        return Err(DomainError::validation("pack must contain at least one course"));
    }
    let mut seen = HashSet::with_capacity(courses.len());
    for id in courses {
        if !seen.insert(id) {
            return Err(DomainError::validation(format!("duplicate course in pack: {id}")));
        }
    }
    Ok(())
}

/// Validate a pack about to be created; returns the trimmed name.
pub fn validate_pack(name: &str, courses: &[CourseId]) -> DomainResult<String> {
    let name = validate_pack_name(name)?;
    validate_pack_members(courses)?;
    Ok(name)
}

/// Canonical member order: code, then kind priority, then part.
pub fn member_order(a: &CourseId, b: &CourseId) -> Ordering {
    a.code
        .cmp(&b.code)
        .then_with(|| CourseKind::priority_of(&a.kind).cmp(&CourseKind::priority_of(&b.kind)))
        .then_with(|| a.kind.cmp(&b.kind))
        .then_with(|| a.part.cmp(&b.part))
}

pub fn sort_members(courses: &mut [CourseId]) {
    courses.sort_by(member_order);
}
