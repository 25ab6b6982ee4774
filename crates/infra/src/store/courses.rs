//! Course operations (create, read, update, delete, list).

use sqlx::{QueryBuilder, Sqlite};
use tracing::instrument;

use polybase_core::{CourseId, DomainError, Entity};
use polybase_inventory::{
    Course, PartialCourse, validate_course, validate_course_fields, validate_course_id,
};

use super::CourseFilter;
use super::sqlite::{
    CourseRow, SqliteInventory, course_exists, fetch_course, refresh_parts,
};
use crate::audit::AuditVerb;
use crate::error::{InventoryResult, store};

impl SqliteInventory {
    /// Insert a new, visible course and refresh its family's `parts`.
    #[instrument(skip(self, actor, course), fields(actor = %actor, course = %course.id), err)]
    pub async fn create_course(&self, actor: &str, course: Course) -> InventoryResult<Course> {
        let mut course = validate_course(course)?;
        course.shown = true;

        let mut tx = self.begin_write().await?;

        if course_exists(&mut tx, &course.id)
            .await
            .map_err(store("create_course"))?
        {
            return Err(DomainError::conflict(format!("course {} already exists", course.id)).into());
        }

        sqlx::query(
            r#"
            INSERT INTO courses (code, kind, part, parts, name, quantity, total, shown, semester)
            VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&course.id.code)
        .bind(&course.id.kind)
        .bind(course.id.part)
        .bind(&course.name)
        .bind(course.quantity)
        .bind(course.total)
        .bind(course.shown)
        .bind(course.semester.as_str())
        .execute(&mut *tx)
        .await
        .map_err(store("create_course"))?;

        refresh_parts(&mut tx, &course.id.code, &course.id.kind)
            .await
            .map_err(store("refresh_parts"))?;

        let created = fetch_course(&mut tx, &course.id)
            .await
            .map_err(store("create_course"))?
            .ok_or_else(|| DomainError::not_found(format!("course {}", course.id)))?;

        tx.commit().await.map_err(store("commit_transaction"))?;

        self.audit
            .record(actor, AuditVerb::Create, &format!("created {}", created.label()));
        Ok(created)
    }

    /// Read one course. Absence is reported as `NotFound`.
    #[instrument(skip(self), fields(course = %id), err)]
    pub async fn get_course(&self, id: &CourseId) -> InventoryResult<Course> {
        let id = validate_course_id(id.clone())?;

        let mut conn = self.pool.acquire().await.map_err(store("acquire"))?;
        fetch_course(&mut conn, &id)
            .await
            .map_err(store("get_course"))?
            .ok_or_else(|| DomainError::not_found(format!("course {id}")).into())
    }

    /// Merge `partial` onto the stored course and write the validated result.
    ///
    /// A changed identity drags the pack links along and refreshes `parts`
    /// for both the old and the new family.
    #[instrument(skip(self, actor, partial), fields(actor = %actor, course = %id), err)]
    pub async fn update_course(
        &self,
        actor: &str,
        id: &CourseId,
        partial: PartialCourse,
    ) -> InventoryResult<Course> {
        let id = validate_course_id(id.clone())?;
        if partial.is_empty() {
            return Err(DomainError::validation("at least one field must be updated").into());
        }

        let mut tx = self.begin_write().await?;

        let current = fetch_course(&mut tx, &id)
            .await
            .map_err(store("update_course"))?
            .ok_or_else(|| DomainError::conflict(format!("course {id} does not exist")))?;

        let merged = partial.merge_onto(&current);
        let course = if partial.kind.is_some() {
            validate_course(merged)?
        } else {
            validate_course_fields(merged)?
        };
        let renamed = partial.touches_identity() && course.id != id;

        if renamed
            && course_exists(&mut tx, &course.id)
                .await
                .map_err(store("update_course"))?
        {
            return Err(DomainError::conflict(format!("course {} already exists", course.id)).into());
        }

        sqlx::query(
            r#"
            UPDATE courses
            SET code = ?1, kind = ?2, part = ?3, name = ?4,
                quantity = ?5, total = ?6, shown = ?7, semester = ?8
            WHERE code = ?9 AND kind = ?10 AND part = ?11
            "#,
        )
        .bind(&course.id.code)
        .bind(&course.id.kind)
        .bind(course.id.part)
        .bind(&course.name)
        .bind(course.quantity)
        .bind(course.total)
        .bind(course.shown)
        .bind(course.semester.as_str())
        .bind(&id.code)
        .bind(&id.kind)
        .bind(id.part)
        .execute(&mut *tx)
        .await
        .map_err(store("update_course"))?;

        if renamed {
            // No-op when the foreign key already cascaded the rename.
            sqlx::query(
                r#"
                UPDATE pack_courses
                SET course_code = ?1, course_kind = ?2, course_part = ?3
                WHERE course_code = ?4 AND course_kind = ?5 AND course_part = ?6
                "#,
            )
            .bind(&course.id.code)
            .bind(&course.id.kind)
            .bind(course.id.part)
            .bind(&id.code)
            .bind(&id.kind)
            .bind(id.part)
            .execute(&mut *tx)
            .await
            .map_err(store("repoint_pack_courses"))?;
        }

        refresh_parts(&mut tx, &course.id.code, &course.id.kind)
            .await
            .map_err(store("refresh_parts"))?;
        if course.id.code != id.code || course.id.kind != id.kind {
            refresh_parts(&mut tx, &id.code, &id.kind)
                .await
                .map_err(store("refresh_parts"))?;
        }

        let updated = fetch_course(&mut tx, &course.id)
            .await
            .map_err(store("update_course"))?
            .ok_or_else(|| DomainError::not_found(format!("course {}", course.id)))?;

        tx.commit().await.map_err(store("commit_transaction"))?;

        self.audit
            .record(actor, AuditVerb::Update, &format!("updated {}", updated.label()));
        Ok(updated)
    }

    /// Delete a course, its pack links, and refresh the surviving family.
    #[instrument(skip(self, actor), fields(actor = %actor, course = %id), err)]
    pub async fn delete_course(&self, actor: &str, id: &CourseId) -> InventoryResult<()> {
        let id = validate_course_id(id.clone())?;

        let mut tx = self.begin_write().await?;

        if !course_exists(&mut tx, &id)
            .await
            .map_err(store("delete_course"))?
        {
            return Err(DomainError::conflict(format!("course {id} does not exist")).into());
        }

        sqlx::query(
            r#"
            DELETE FROM pack_courses
            WHERE course_code = ?1 AND course_kind = ?2 AND course_part = ?3
            "#,
        )
        .bind(&id.code)
        .bind(&id.kind)
        .bind(id.part)
        .execute(&mut *tx)
        .await
        .map_err(store("remove_pack_courses"))?;

        sqlx::query("DELETE FROM courses WHERE code = ?1 AND kind = ?2 AND part = ?3")
            .bind(&id.code)
            .bind(&id.kind)
            .bind(id.part)
            .execute(&mut *tx)
            .await
            .map_err(store("delete_course"))?;

        refresh_parts(&mut tx, &id.code, &id.kind)
            .await
            .map_err(store("refresh_parts"))?;

        tx.commit().await.map_err(store("commit_transaction"))?;

        self.audit
            .record(actor, AuditVerb::Delete, &format!("deleted course {id}"));
        Ok(())
    }

    /// List courses, newest semester first, then by identity.
    #[instrument(skip(self, filter), err)]
    pub async fn list_courses(
        &self,
        show_hidden: bool,
        filter: &CourseFilter,
    ) -> InventoryResult<Vec<Course>> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT code, kind, part, parts, name, quantity, total, shown, semester \
             FROM courses WHERE 1 = 1",
        );
        if !show_hidden {
            query.push(" AND shown = 1");
        }
        if let Some(semester) = filter.semester {
            query.push(" AND semester = ").push_bind(semester.as_str());
        }
        if let Some(code) = &filter.code {
            query.push(" AND code = ").push_bind(code.clone());
        }
        if let Some(kind) = &filter.kind {
            query.push(" AND kind = ").push_bind(kind.clone());
        }
        if let Some(part) = filter.part {
            query.push(" AND part = ").push_bind(part);
        }
        query.push(" ORDER BY semester DESC, code ASC, kind ASC, part ASC");

        let rows = query
            .build_query_as::<CourseRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(store("list_courses"))?;

        let courses = rows
            .into_iter()
            .map(CourseRow::into_course)
            .collect::<Result<Vec<_>, _>>()
            .map_err(store("list_courses"))?;

        tracing::debug!(count = courses.len(), "listed courses");
        Ok(courses)
    }
}
