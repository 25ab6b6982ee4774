//! Identity and field validation.
//!
//! Pure functions, run before any store access.

use std::sync::LazyLock;

use regex::Regex;

use polybase_core::{CourseId, DomainError, DomainResult};

use crate::course::{Course, CourseKind};

static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9\-{},]+$").expect("code pattern is a valid regex"));

static KIND_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").expect("kind pattern is a valid regex"));

/// Highest part number a course may carry.
pub const MAX_PART: i64 = 999;

/// Check the structural shape of an identity. Returns it unchanged.
pub fn validate_course_id(id: CourseId) -> DomainResult<CourseId> {
    if !CODE_PATTERN.is_match(&id.code) {
        return Err(DomainError::format(format!(
            "invalid code {:?}: only uppercase letters, digits, '-', '{{', '}}' and ',' are allowed",
            id.code
        )));
    }
    if !KIND_PATTERN.is_match(&id.kind) {
        return Err(DomainError::format(format!(
            "invalid kind {:?}: only letters are allowed",
            id.kind
        )));
    }
    Ok(id)
}

/// Normalize and validate a whole course record.
///
/// String fields are trimmed; `kind` must belong to the closed vocabulary.
pub fn validate_course(course: Course) -> DomainResult<Course> {
    let course = validate_course_fields(course)?;
    course.id.kind.parse::<CourseKind>()?;
    Ok(course)
}

/// Like [`validate_course`] but only requires `kind` to be letters.
///
/// Used when an update leaves an already stored kind untouched, so rows
/// written before the vocabulary was closed stay editable.
pub fn validate_course_fields(mut course: Course) -> DomainResult<Course> {
    course.id.code = course.id.code.trim().to_string();
    if course.id.code.is_empty() {
        return Err(DomainError::format("code cannot be empty"));
    }

    course.id.kind = course.id.kind.trim().to_string();
    if course.id.kind.is_empty() {
        return Err(DomainError::format("kind cannot be empty"));
    }

    course.id = validate_course_id(course.id)?;

    if !(1..=MAX_PART).contains(&course.id.part) {
        return Err(DomainError::range(format!(
            "part must be in 1-{MAX_PART}, got {}",
            course.id.part
        )));
    }

    course.name = course.name.trim().to_string();

    validate_quantity(course.quantity, course.total)?;

    Ok(course)
}

/// `0 <= quantity <= total` and `total > 0`.
pub fn validate_quantity(quantity: i64, total: i64) -> DomainResult<()> {
    if quantity < 0 {
        return Err(DomainError::range("quantity cannot be negative"));
    }
    if total <= 0 {
        return Err(DomainError::range("total must be positive"));
    }
    if quantity > total {
        return Err(DomainError::range(format!(
            "quantity ({quantity}) cannot exceed total ({total})"
        )));
    }
    Ok(())
}

/// Saturate `value` into `0..=total`.
pub fn clamp_quantity(value: i64, total: i64) -> i64 {
    value.min(total).max(0)
}
