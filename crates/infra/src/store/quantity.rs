//! Stock adjustments and visibility.
//!
//! ## Pack quantity updates
//!
//! [`SqliteInventory::update_pack_quantity`] runs in two phases inside one
//! write transaction. It reads every member's stock and plans the change with
//! [`plan_pack_delta`]. Only a fully successful plan is written; a failed plan
//! drops the transaction and leaves every member untouched.

use tracing::instrument;

use polybase_core::{CourseId, DomainError, PackId};
use polybase_inventory::{Course, Pack, clamp_quantity, plan_pack_delta, validate_course_id};

use super::sqlite::{
    SqliteInventory, fetch_course, fetch_member_stock, fetch_pack, pack_exists,
};
use crate::audit::AuditVerb;
use crate::error::{InventoryResult, store};

impl SqliteInventory {
    /// Shift a course's stock by `delta`, clamped into `0..=total`.
    #[instrument(skip(self, actor), fields(actor = %actor, course = %id), err)]
    pub async fn update_course_quantity(
        &self,
        actor: &str,
        id: &CourseId,
        delta: i64,
    ) -> InventoryResult<Course> {
        let id = validate_course_id(id.clone())?;

        let mut tx = self.begin_write().await?;

        let current = fetch_course(&mut tx, &id)
            .await
            .map_err(store("update_course_quantity"))?
            .ok_or_else(|| DomainError::not_found(format!("course {id}")))?;

        let quantity = clamp_quantity(current.quantity.saturating_add(delta), current.total);

        sqlx::query("UPDATE courses SET quantity = ?1 WHERE code = ?2 AND kind = ?3 AND part = ?4")
            .bind(quantity)
            .bind(&id.code)
            .bind(&id.kind)
            .bind(id.part)
            .execute(&mut *tx)
            .await
            .map_err(store("update_course_quantity"))?;

        let updated = fetch_course(&mut tx, &id)
            .await
            .map_err(store("update_course_quantity"))?
            .ok_or_else(|| DomainError::not_found(format!("course {id}")))?;

        tx.commit().await.map_err(store("commit_transaction"))?;

        tracing::debug!(before = current.quantity, after = updated.quantity, "course quantity updated");
        self.audit.record(
            actor,
            AuditVerb::UpdateQuantity,
            &format!("updated quantity of course {id}"),
        );
        Ok(updated)
    }

    #[instrument(skip(self, actor), fields(actor = %actor, course = %id), err)]
    pub async fn update_course_shown(
        &self,
        actor: &str,
        id: &CourseId,
        shown: bool,
    ) -> InventoryResult<Course> {
        let id = validate_course_id(id.clone())?;

        let mut tx = self.begin_write().await?;

        let result =
            sqlx::query("UPDATE courses SET shown = ?1 WHERE code = ?2 AND kind = ?3 AND part = ?4")
                .bind(shown)
                .bind(&id.code)
                .bind(&id.kind)
                .bind(id.part)
                .execute(&mut *tx)
                .await
                .map_err(store("update_course_shown"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("course {id}")).into());
        }

        let updated = fetch_course(&mut tx, &id)
            .await
            .map_err(store("update_course_shown"))?
            .ok_or_else(|| DomainError::not_found(format!("course {id}")))?;

        tx.commit().await.map_err(store("commit_transaction"))?;

        self.audit.record(
            actor,
            AuditVerb::UpdateVisibility,
            &format!("updated visibility of course {id}"),
        );
        Ok(updated)
    }

    /// Shift every member of a pack by `delta` as a single change.
    ///
    /// Decreases floor each member at zero. An increase that would push any
    /// member past its total fails with a range error and changes nothing.
    #[instrument(skip(self, actor), fields(actor = %actor, pack = %id), err)]
    pub async fn update_pack_quantity(
        &self,
        actor: &str,
        id: PackId,
        delta: i64,
    ) -> InventoryResult<Pack> {
        let mut tx = self.begin_write().await?;

        if !pack_exists(&mut tx, id)
            .await
            .map_err(store("update_pack_quantity"))?
        {
            return Err(DomainError::not_found(format!("pack {id}")).into());
        }

        let members = fetch_member_stock(&mut tx, id)
            .await
            .map_err(store("read_pack_stock"))?;
        let plan = plan_pack_delta(&members, delta)?;

        for change in plan.iter().filter(|c| c.delta != 0) {
            sqlx::query(
                r#"
                UPDATE courses
                SET quantity = quantity + ?1
                WHERE code = ?2 AND kind = ?3 AND part = ?4
                "#,
            )
            .bind(change.delta)
            .bind(&change.id.code)
            .bind(&change.id.kind)
            .bind(change.id.part)
            .execute(&mut *tx)
            .await
            .map_err(store("update_pack_quantity"))?;
        }

        let pack = fetch_pack(&mut tx, id)
            .await
            .map_err(store("update_pack_quantity"))?
            .ok_or_else(|| DomainError::not_found(format!("pack {id}")))?;

        tx.commit().await.map_err(store("commit_transaction"))?;

        if plan.is_empty() {
            tracing::debug!("pack has no members, nothing to update");
        } else {
            self.audit.record(
                actor,
                AuditVerb::UpdatePackQuantity,
                &format!("updated quantities for pack {id} by {delta}"),
            );
        }
        Ok(pack)
    }
}
