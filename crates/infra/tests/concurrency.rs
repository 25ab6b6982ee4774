mod common;

use polybase_core::CourseId;
use polybase_infra::{Config, SqliteInventory};

use common::{ACTOR, course};

async fn file_inventory(dir: &tempfile::TempDir) -> SqliteInventory {
    polybase_observability::init();
    let mut config = Config::default();
    config.database.path = dir.path().join("polybase.db");
    config.audit.path = dir.path().join("polybase.log").display().to_string();
    SqliteInventory::from_config(&config).await.unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_quantity_updates_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = file_inventory(&dir).await;
    let id = inventory
        .create_course(ACTOR, course("CS101", "TD", 1, 0, 100))
        .await
        .unwrap()
        .id;

    let mut handles = Vec::new();
    for _ in 0..50 {
        let inventory = inventory.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            inventory.update_course_quantity(ACTOR, &id, 1).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(inventory.get_course(&id).await.unwrap().quantity, 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_of_one_family_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = file_inventory(&dir).await;

    let mut handles = Vec::new();
    for part in 1..=30 {
        let inventory = inventory.clone();
        handles.push(tokio::spawn(async move {
            inventory
                .create_course(ACTOR, course("CS101", "TD", part, 1, 5))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for part in [1, 15, 30] {
        let stored = inventory
            .get_course(&CourseId::new("CS101", "TD", part))
            .await
            .unwrap();
        assert_eq!(stored.parts, 30);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_pack_increases_respect_every_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = file_inventory(&dir).await;
    let a = inventory
        .create_course(ACTOR, course("A", "TD", 1, 0, 10))
        .await
        .unwrap()
        .id;
    let b = inventory
        .create_course(ACTOR, course("B", "TD", 1, 0, 40))
        .await
        .unwrap()
        .id;
    let pack = inventory
        .create_pack(ACTOR, "Pack", vec![a.clone(), b.clone()])
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let inventory = inventory.clone();
        handles.push(tokio::spawn(async move {
            inventory.update_pack_quantity(ACTOR, pack.id, 1).await
        }));
    }
    let mut applied = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => applied += 1,
            Err(err) => assert!(err.domain().is_some(), "unexpected store error: {err}"),
        }
    }

    assert_eq!(applied, 10);
    assert_eq!(inventory.get_course(&a).await.unwrap().quantity, 10);
    assert_eq!(inventory.get_course(&b).await.unwrap().quantity, 10);
}
