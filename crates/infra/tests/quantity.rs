mod common;

use polybase_core::{CourseId, DomainError, PackId};
use polybase_infra::SqliteInventory;
use polybase_inventory::{PartialCourse, PartialPack};

use common::{ACTOR, audit_lines, audited_inventory, course, inventory, seed};

async fn quantities(inventory: &SqliteInventory, ids: &[CourseId]) -> Vec<i64> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        out.push(inventory.get_course(id).await.unwrap().quantity);
    }
    out
}

#[tokio::test]
async fn course_quantity_saturates_at_zero() {
    let inventory = inventory().await;
    let ids = seed(&inventory, &[course("LU3IN005", "TD", 1, 20, 50)]).await;

    let updated = inventory
        .update_course_quantity(ACTOR, &ids[0], -999_999)
        .await
        .unwrap();
    assert_eq!(updated.quantity, 0);
}

#[tokio::test]
async fn course_quantity_saturates_at_total() {
    let inventory = inventory().await;
    let ids = seed(&inventory, &[course("LU3IN005", "TD", 1, 20, 50)]).await;

    let updated = inventory
        .update_course_quantity(ACTOR, &ids[0], i64::MAX)
        .await
        .unwrap();
    assert_eq!(updated.quantity, 50);

    let updated = inventory
        .update_course_quantity(ACTOR, &ids[0], -5)
        .await
        .unwrap();
    assert_eq!(updated.quantity, 45);
}

#[tokio::test]
async fn quantity_and_visibility_of_missing_course_are_not_found() {
    let inventory = inventory().await;
    let id = CourseId::new("CS101", "TD", 1);

    let err = inventory
        .update_course_quantity(ACTOR, &id, 1)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = inventory
        .update_course_shown(ACTOR, &id, false)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn visibility_toggles() {
    let inventory = inventory().await;
    let ids = seed(&inventory, &[course("CS101", "TD", 1, 1, 5)]).await;

    assert!(!inventory.update_course_shown(ACTOR, &ids[0], false).await.unwrap().shown);
    assert!(inventory.update_course_shown(ACTOR, &ids[0], true).await.unwrap().shown);
}

#[tokio::test]
async fn pack_increase_past_one_total_changes_nothing() {
    let inventory = inventory().await;
    let ids = seed(
        &inventory,
        &[course("A", "TD", 1, 20, 25), course("B", "TD", 1, 15, 50)],
    )
    .await;
    let pack = inventory.create_pack(ACTOR, "Pack", ids.clone()).await.unwrap();

    let err = inventory
        .update_pack_quantity(ACTOR, pack.id, 7)
        .await
        .unwrap_err();
    assert!(matches!(err.domain(), Some(DomainError::Range(_))));
    assert_eq!(quantities(&inventory, &ids).await, vec![20, 15]);
}

#[tokio::test]
async fn pack_increase_within_totals_applies_to_every_member() {
    let inventory = inventory().await;
    let ids = seed(
        &inventory,
        &[course("A", "TD", 1, 20, 25), course("B", "TD", 1, 15, 50)],
    )
    .await;
    let pack = inventory.create_pack(ACTOR, "Pack", ids.clone()).await.unwrap();

    inventory
        .update_pack_quantity(ACTOR, pack.id, 5)
        .await
        .unwrap();
    assert_eq!(quantities(&inventory, &ids).await, vec![25, 20]);
}

#[tokio::test]
async fn pack_decrease_floors_each_member() {
    let inventory = inventory().await;
    let ids = seed(
        &inventory,
        &[course("A", "TD", 1, 3, 25), course("B", "TD", 1, 15, 50)],
    )
    .await;
    let pack = inventory.create_pack(ACTOR, "Pack", ids.clone()).await.unwrap();

    inventory
        .update_pack_quantity(ACTOR, pack.id, -10)
        .await
        .unwrap();
    assert_eq!(quantities(&inventory, &ids).await, vec![0, 5]);
}

#[tokio::test]
async fn pack_quantity_on_missing_pack_is_not_found() {
    let inventory = inventory().await;
    let err = inventory
        .update_pack_quantity(ACTOR, PackId::new(3), 1)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn emptied_pack_quantity_update_is_a_silent_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let (inventory, log) = audited_inventory(&dir).await;
    let ids = seed(&inventory, &[course("A", "TD", 1, 1, 5)]).await;
    let pack = inventory.create_pack(ACTOR, "Pack", ids.clone()).await.unwrap();
    inventory.delete_course(ACTOR, &ids[0]).await.unwrap();
    let before = audit_lines(&log).len();

    let updated = inventory
        .update_pack_quantity(ACTOR, pack.id, 2)
        .await
        .unwrap();
    assert!(updated.courses.is_empty());
    assert_eq!(audit_lines(&log).len(), before);
}

#[tokio::test]
async fn committed_mutations_are_audited_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let (inventory, log) = audited_inventory(&dir).await;

    let ids = seed(&inventory, &[course("A", "TD", 1, 2, 5)]).await;
    inventory
        .update_course_quantity(ACTOR, &ids[0], 1)
        .await
        .unwrap();
    inventory
        .update_course_shown(ACTOR, &ids[0], false)
        .await
        .unwrap();
    inventory
        .update_course(
            ACTOR,
            &ids[0],
            PartialCourse {
                name: Some("Algorithmique".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let pack = inventory.create_pack(ACTOR, "Pack", ids.clone()).await.unwrap();
    inventory
        .update_pack(
            ACTOR,
            pack.id,
            PartialPack {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    inventory
        .update_pack_quantity(ACTOR, pack.id, -1)
        .await
        .unwrap();
    inventory.delete_pack(ACTOR, pack.id).await.unwrap();
    inventory.delete_course(ACTOR, &ids[0]).await.unwrap();

    let lines = audit_lines(&log);
    let expected = [
        "[jdoe] CREATE: created course A/TD/1".to_string(),
        "[jdoe] UPDATE QUANTITY: updated quantity of course A/TD/1".to_string(),
        "[jdoe] UPDATE VISIBILITY: updated visibility of course A/TD/1".to_string(),
        "[jdoe] UPDATE: updated course A/TD/1".to_string(),
        format!("[jdoe] CREATE PACK: created pack {} with 1 courses", pack.id),
        format!("[jdoe] UPDATE PACK: updated pack {}", pack.id),
        format!("[jdoe] UPDATE PACK QUANTITY: updated quantities for pack {} by -1", pack.id),
        format!("[jdoe] DELETE PACK: deleted pack {}", pack.id),
        "[jdoe] DELETE: deleted course A/TD/1".to_string(),
    ];
    assert_eq!(lines.len(), expected.len(), "{lines:#?}");
    for (line, suffix) in lines.iter().zip(&expected) {
        assert!(line.ends_with(suffix.as_str()), "{line:?} should end with {suffix:?}");
    }
}

#[tokio::test]
async fn failed_mutations_leave_no_audit_entry() {
    let dir = tempfile::tempdir().unwrap();
    let (inventory, log) = audited_inventory(&dir).await;
    let ids = seed(&inventory, &[course("A", "TD", 1, 20, 25)]).await;
    let pack = inventory.create_pack(ACTOR, "Pack", ids.clone()).await.unwrap();
    let before = audit_lines(&log).len();

    assert!(inventory.update_pack_quantity(ACTOR, pack.id, 6).await.is_err());
    assert!(
        inventory
            .create_course(ACTOR, course("A", "TD", 1, 1, 5))
            .await
            .is_err()
    );
    assert_eq!(audit_lines(&log).len(), before);
}
