//! Pack-wide quantity planning.
//!
//! A pack quantity change is decided in full before anything is written:
//! [`plan_pack_delta`] either returns one effective delta per member or an
//! error, and the caller applies the plan in the same transaction.

use polybase_core::{CourseId, DomainError, DomainResult};

/// Stock of one pack member, as read inside the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberStock {
    pub id: CourseId,
    pub quantity: i64,
    pub total: i64,
}

/// Delta to apply to one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityChange {
    pub id: CourseId,
    pub delta: i64,
}

/// Compute the per-member effective deltas for a pack-wide `delta`.
///
/// Decreases floor at zero per member. Increases are all-or-nothing: if any
/// member would exceed its total the whole plan fails with a range error.
pub fn plan_pack_delta(members: &[MemberStock], delta: i64) -> DomainResult<Vec<QuantityChange>> {
    let mut plan = Vec::with_capacity(members.len());
    for member in members {
        let target = member.quantity.saturating_add(delta);
        let effective = if delta < 0 && target < 0 {
            -member.quantity
        } else if delta > 0 && target > member.total {
            return Err(DomainError::range(format!(
                "quantity would exceed total for course {} ({} + {} > {})",
                member.id, member.quantity, delta, member.total
            )));
        } else {
            delta
        };
        plan.push(QuantityChange {
            id: member.id.clone(),
            delta: effective,
        });
    }
    Ok(plan)
}
