//! Pack operations (create, read, update, delete, list).

use std::collections::BTreeMap;

use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

use polybase_core::{CourseId, DomainError, PackId};
use polybase_inventory::pack::{
    sort_members, validate_pack, validate_pack_members, validate_pack_name,
};
use polybase_inventory::{Pack, PartialPack, validate_course_id};

use super::sqlite::{SqliteInventory, course_exists, fetch_pack, insert_links, pack_exists};
use crate::audit::AuditVerb;
use crate::error::{InventoryResult, store};

#[derive(Debug, FromRow)]
struct PackRow {
    id: i64,
    name: String,
}

#[derive(Debug, FromRow)]
struct LinkRow {
    pack_id: i64,
    course_code: String,
    course_kind: String,
    course_part: i64,
}

/// Validate every member identity and return them in normalized form.
fn validated_members(courses: Vec<CourseId>) -> InventoryResult<Vec<CourseId>> {
    let courses = courses
        .into_iter()
        .map(validate_course_id)
        .collect::<Result<Vec<_>, _>>()?;
    validate_pack_members(&courses)?;
    Ok(courses)
}

/// Every member must already exist as a course.
async fn ensure_members_exist(
    conn: &mut SqliteConnection,
    courses: &[CourseId],
) -> InventoryResult<()> {
    for id in courses {
        if !course_exists(conn, id).await.map_err(store("check_pack_member"))? {
            return Err(DomainError::conflict(format!("course {id} does not exist")).into());
        }
    }
    Ok(())
}

impl SqliteInventory {
    #[instrument(skip(self, actor, courses), fields(actor = %actor, members = courses.len()), err)]
    pub async fn create_pack(
        &self,
        actor: &str,
        name: &str,
        courses: Vec<CourseId>,
    ) -> InventoryResult<Pack> {
        let courses = validated_members(courses)?;
        let name = validate_pack(name, &courses)?;

        let mut tx = self.begin_write().await?;

        ensure_members_exist(&mut tx, &courses).await?;

        let id = sqlx::query("INSERT INTO packs (name) VALUES (?1)")
            .bind(&name)
            .execute(&mut *tx)
            .await
            .map_err(store("create_pack"))?
            .last_insert_rowid();
        let id = PackId::new(id);

        insert_links(&mut tx, id, &courses)
            .await
            .map_err(store("insert_pack_courses"))?;

        let pack = fetch_pack(&mut tx, id)
            .await
            .map_err(store("create_pack"))?
            .ok_or_else(|| DomainError::not_found(format!("pack {id}")))?;

        tx.commit().await.map_err(store("commit_transaction"))?;

        self.audit.record(
            actor,
            AuditVerb::CreatePack,
            &format!("created pack {id} with {} courses", pack.courses.len()),
        );
        Ok(pack)
    }

    #[instrument(skip(self), fields(pack = %id), err)]
    pub async fn get_pack(&self, id: PackId) -> InventoryResult<Pack> {
        let mut conn = self.pool.acquire().await.map_err(store("acquire"))?;
        fetch_pack(&mut conn, id)
            .await
            .map_err(store("get_pack"))?
            .ok_or_else(|| DomainError::not_found(format!("pack {id}")).into())
    }

    /// Rename a pack and/or replace its member list.
    #[instrument(skip(self, actor, partial), fields(actor = %actor, pack = %id), err)]
    pub async fn update_pack(
        &self,
        actor: &str,
        id: PackId,
        partial: PartialPack,
    ) -> InventoryResult<Pack> {
        if partial.is_empty() {
            return Err(DomainError::validation("at least one field must be updated").into());
        }
        let name = partial.name.as_deref().map(validate_pack_name).transpose()?;
        let courses = partial.courses.map(validated_members).transpose()?;

        let mut tx = self.begin_write().await?;

        if !pack_exists(&mut tx, id).await.map_err(store("update_pack"))? {
            return Err(DomainError::conflict(format!("pack {id} does not exist")).into());
        }

        if let Some(name) = &name {
            sqlx::query("UPDATE packs SET name = ?1 WHERE id = ?2")
                .bind(name)
                .bind(id.as_i64())
                .execute(&mut *tx)
                .await
                .map_err(store("update_pack"))?;
        }

        if let Some(courses) = &courses {
            ensure_members_exist(&mut tx, courses).await?;

            sqlx::query("DELETE FROM pack_courses WHERE pack_id = ?1")
                .bind(id.as_i64())
                .execute(&mut *tx)
                .await
                .map_err(store("remove_pack_courses"))?;

            insert_links(&mut tx, id, courses)
                .await
                .map_err(store("insert_pack_courses"))?;
        }

        let pack = fetch_pack(&mut tx, id)
            .await
            .map_err(store("update_pack"))?
            .ok_or_else(|| DomainError::not_found(format!("pack {id}")))?;

        tx.commit().await.map_err(store("commit_transaction"))?;

        self.audit
            .record(actor, AuditVerb::UpdatePack, &format!("updated pack {id}"));
        Ok(pack)
    }

    #[instrument(skip(self, actor), fields(actor = %actor, pack = %id), err)]
    pub async fn delete_pack(&self, actor: &str, id: PackId) -> InventoryResult<()> {
        let mut tx = self.begin_write().await?;

        if !pack_exists(&mut tx, id).await.map_err(store("delete_pack"))? {
            return Err(DomainError::conflict(format!("pack {id} does not exist")).into());
        }

        sqlx::query("DELETE FROM pack_courses WHERE pack_id = ?1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(store("remove_pack_courses"))?;

        sqlx::query("DELETE FROM packs WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(store("delete_pack"))?;

        tx.commit().await.map_err(store("commit_transaction"))?;

        self.audit
            .record(actor, AuditVerb::DeletePack, &format!("deleted pack {id}"));
        Ok(())
    }

    /// All packs by ascending id, each with its members in canonical order.
    #[instrument(skip(self), err)]
    pub async fn list_packs(&self) -> InventoryResult<Vec<Pack>> {
        // One read transaction so packs and links come from the same snapshot.
        let mut tx = self.pool.begin().await.map_err(store("begin_transaction"))?;

        let packs = sqlx::query_as::<_, PackRow>("SELECT id, name FROM packs ORDER BY id")
            .fetch_all(&mut *tx)
            .await
            .map_err(store("list_packs"))?;

        let links = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT pc.pack_id, pc.course_code, pc.course_kind, pc.course_part
            FROM pack_courses pc
            JOIN courses c ON c.code = pc.course_code
              AND c.kind = pc.course_kind
              AND c.part = pc.course_part
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(store("list_pack_courses"))?;

        tx.commit().await.map_err(store("commit_transaction"))?;

        let mut members: BTreeMap<i64, Vec<CourseId>> = BTreeMap::new();
        for link in links {
            members
                .entry(link.pack_id)
                .or_default()
                .push(CourseId::new(link.course_code, link.course_kind, link.course_part));
        }

        let packs: Vec<Pack> = packs
            .into_iter()
            .map(|row| {
                let mut courses = members.remove(&row.id).unwrap_or_default();
                sort_members(&mut courses);
                Pack {
                    id: PackId::new(row.id),
                    name: row.name,
                    courses,
                }
            })
            .collect();

        tracing::debug!(count = packs.len(), "listed packs");
        Ok(packs)
    }
}
