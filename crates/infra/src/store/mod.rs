//! Persistent inventory store.
//!
//! [`Inventory`] is the seam callers program against; [`SqliteInventory`] is
//! the SQLite implementation. Operations are grouped by concern:
//!
//! - `courses`: create, read, update, delete and list courses
//! - `packs`: create, read, update, delete and list packs
//! - `quantity`: course and pack stock adjustments, visibility

use async_trait::async_trait;

use polybase_core::{CourseId, PackId};
use polybase_inventory::{Course, Pack, PartialCourse, PartialPack, Semester};

use crate::error::InventoryResult;

pub mod courses;
pub mod packs;
pub mod quantity;
pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteInventory;

/// Exact-match filters for [`Inventory::list_courses`]. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub semester: Option<Semester>,
    pub code: Option<String>,
    pub kind: Option<String>,
    pub part: Option<i64>,
}

impl CourseFilter {
    pub fn semester(mut self, semester: Semester) -> Self {
        self.semester = Some(semester);
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn part(mut self, part: i64) -> Self {
        self.part = Some(part);
        self
    }
}

/// Inventory operations.
///
/// Mutating operations take the acting user's name, which lands in the audit
/// log once the change is committed.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn create_course(&self, actor: &str, course: Course) -> InventoryResult<Course>;

    async fn get_course(&self, id: &CourseId) -> InventoryResult<Course>;

    async fn update_course(
        &self,
        actor: &str,
        id: &CourseId,
        partial: PartialCourse,
    ) -> InventoryResult<Course>;

    async fn delete_course(&self, actor: &str, id: &CourseId) -> InventoryResult<()>;

    async fn list_courses(
        &self,
        show_hidden: bool,
        filter: &CourseFilter,
    ) -> InventoryResult<Vec<Course>>;

    /// Shift stock by `delta`, clamped into `0..=total`.
    async fn update_course_quantity(
        &self,
        actor: &str,
        id: &CourseId,
        delta: i64,
    ) -> InventoryResult<Course>;

    async fn update_course_shown(
        &self,
        actor: &str,
        id: &CourseId,
        shown: bool,
    ) -> InventoryResult<Course>;

    async fn create_pack(
        &self,
        actor: &str,
        name: &str,
        courses: Vec<CourseId>,
    ) -> InventoryResult<Pack>;

    async fn get_pack(&self, id: PackId) -> InventoryResult<Pack>;

    async fn update_pack(
        &self,
        actor: &str,
        id: PackId,
        partial: PartialPack,
    ) -> InventoryResult<Pack>;

    async fn delete_pack(&self, actor: &str, id: PackId) -> InventoryResult<()>;

    async fn list_packs(&self) -> InventoryResult<Vec<Pack>>;

    /// Shift every member's stock by `delta` as one all-or-nothing change.
    async fn update_pack_quantity(
        &self,
        actor: &str,
        id: PackId,
        delta: i64,
    ) -> InventoryResult<Pack>;
}

#[async_trait]
impl Inventory for SqliteInventory {
    async fn create_course(&self, actor: &str, course: Course) -> InventoryResult<Course> {
        SqliteInventory::create_course(self, actor, course).await
    }

    async fn get_course(&self, id: &CourseId) -> InventoryResult<Course> {
        SqliteInventory::get_course(self, id).await
    }

    async fn update_course(
        &self,
        actor: &str,
        id: &CourseId,
        partial: PartialCourse,
    ) -> InventoryResult<Course> {
        SqliteInventory::update_course(self, actor, id, partial).await
    }

    async fn delete_course(&self, actor: &str, id: &CourseId) -> InventoryResult<()> {
        SqliteInventory::delete_course(self, actor, id).await
    }

    async fn list_courses(
        &self,
        show_hidden: bool,
        filter: &CourseFilter,
    ) -> InventoryResult<Vec<Course>> {
        SqliteInventory::list_courses(self, show_hidden, filter).await
    }

    async fn update_course_quantity(
        &self,
        actor: &str,
        id: &CourseId,
        delta: i64,
    ) -> InventoryResult<Course> {
        SqliteInventory::update_course_quantity(self, actor, id, delta).await
    }

    async fn update_course_shown(
        &self,
        actor: &str,
        id: &CourseId,
        shown: bool,
    ) -> InventoryResult<Course> {
        SqliteInventory::update_course_shown(self, actor, id, shown).await
    }

    async fn create_pack(
        &self,
        actor: &str,
        name: &str,
        courses: Vec<CourseId>,
    ) -> InventoryResult<Pack> {
        SqliteInventory::create_pack(self, actor, name, courses).await
    }

    async fn get_pack(&self, id: PackId) -> InventoryResult<Pack> {
        SqliteInventory::get_pack(self, id).await
    }

    async fn update_pack(
        &self,
        actor: &str,
        id: PackId,
        partial: PartialPack,
    ) -> InventoryResult<Pack> {
        SqliteInventory::update_pack(self, actor, id, partial).await
    }

    async fn delete_pack(&self, actor: &str, id: PackId) -> InventoryResult<()> {
        SqliteInventory::delete_pack(self, actor, id).await
    }

    async fn list_packs(&self) -> InventoryResult<Vec<Pack>> {
        SqliteInventory::list_packs(self).await
    }

    async fn update_pack_quantity(
        &self,
        actor: &str,
        id: PackId,
        delta: i64,
    ) -> InventoryResult<Pack> {
        SqliteInventory::update_pack_quantity(self, actor, id, delta).await
    }
}
