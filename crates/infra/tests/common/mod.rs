#![allow(dead_code)]

use std::path::PathBuf;

use polybase_core::CourseId;
use polybase_infra::{AuditLog, SqliteInventory};
use polybase_inventory::{Course, Semester};

pub const ACTOR: &str = "jdoe";

pub async fn inventory() -> SqliteInventory {
    polybase_observability::init();
    SqliteInventory::in_memory(AuditLog::disabled())
        .await
        .expect("failed to open in-memory inventory")
}

/// Inventory whose audit trail goes to a file inside `dir`.
pub async fn audited_inventory(dir: &tempfile::TempDir) -> (SqliteInventory, PathBuf) {
    polybase_observability::init();
    let path = dir.path().join("polybase.log");
    let inventory = SqliteInventory::in_memory(AuditLog::to_file(&path))
        .await
        .expect("failed to open in-memory inventory");
    (inventory, path)
}

pub fn course(code: &str, kind: &str, part: i64, quantity: i64, total: i64) -> Course {
    Course::new(
        CourseId::new(code, kind, part),
        format!("{code} {kind} {part}"),
        quantity,
        total,
        Semester::S1,
    )
}

pub async fn seed(inventory: &SqliteInventory, courses: &[Course]) -> Vec<CourseId> {
    let mut ids = Vec::with_capacity(courses.len());
    for course in courses {
        let created = inventory
            .create_course(ACTOR, course.clone())
            .await
            .expect("seed course");
        ids.push(created.id);
    }
    ids
}

pub fn audit_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
