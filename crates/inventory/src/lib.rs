//! Course-material inventory domain.
//!
//! This crate contains the business rules for courses and packs, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage). The
//! persistence adapter in `polybase-infra` calls into these functions inside
//! its transactions.

pub mod course;
pub mod pack;
pub mod quantity;
pub mod validate;

pub use course::{Course, CourseKind, PartialCourse, Semester};
pub use pack::{Pack, PartialPack};
pub use quantity::{MemberStock, QuantityChange, plan_pack_delta};
pub use validate::{
    clamp_quantity, validate_course, validate_course_fields, validate_course_id, validate_quantity,
};
