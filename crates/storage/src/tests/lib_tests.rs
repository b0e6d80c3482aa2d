use super::*;

fn control(main_id: &str) -> Control {
    Control::new(main_id, "Enforce MFA", "Identity", "Global")
}

#[tokio::test]
async fn stores_and_lists_controls() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(
        storage.insert_control(&control("2")).await.expect("insert"),
        InsertOutcome::Inserted
    );
    storage.insert_control(&control("1")).await.expect("insert");

    let controls = storage.list_controls().await.expect("list");
    assert_eq!(controls.len(), 2);
    assert_eq!(controls[0], control("2"));
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn duplicate_ids_are_rejected_ignoring_case() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.insert_control(&control("ac-1")).await.expect("insert");

    let outcome = storage
        .insert_control(&control("AC-1"))
        .await
        .expect("insert");
    assert_eq!(outcome, InsertOutcome::Duplicate);
    assert_eq!(storage.list_controls().await.expect("list").len(), 1);
}

#[tokio::test]
async fn get_control_returns_none_for_unknown_id() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.insert_control(&control("7")).await.expect("insert");

    assert_eq!(
        storage.get_control("7").await.expect("get"),
        Some(control("7"))
    );
    assert_eq!(storage.get_control("8").await.expect("get"), None);
}

#[tokio::test]
async fn update_applies_only_provided_fields() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.insert_control(&control("3")).await.expect("insert");

    let patch = ControlPatch {
        scope: Some("Regional".into()),
        ..ControlPatch::default()
    };
    let outcome = storage.update_control("3", &patch).await.expect("update");
    assert_eq!(outcome, UpdateOutcome::Updated);

    let stored = storage.get_control("3").await.expect("get").expect("row");
    assert_eq!(stored.scope, "Regional");
    assert_eq!(stored.main_description, "Enforce MFA");
}

#[tokio::test]
async fn update_reports_missing_and_conflicting_ids() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.insert_control(&control("1")).await.expect("insert");
    storage.insert_control(&control("2")).await.expect("insert");

    let missing = storage
        .update_control("9", &ControlPatch::from(control("9")))
        .await
        .expect("update");
    assert_eq!(missing, UpdateOutcome::NotFound);

    let rename_onto_taken = ControlPatch {
        main_id: Some("2".into()),
        ..ControlPatch::default()
    };
    let conflict = storage
        .update_control("1", &rename_onto_taken)
        .await
        .expect("update");
    assert_eq!(conflict, UpdateOutcome::Conflict);
    assert!(storage.get_control("1").await.expect("get").is_some());
}

#[tokio::test]
async fn rename_moves_control_to_new_id() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.insert_control(&control("1")).await.expect("insert");

    let rename = ControlPatch {
        main_id: Some("10".into()),
        ..ControlPatch::default()
    };
    let outcome = storage.update_control("1", &rename).await.expect("update");
    assert_eq!(outcome, UpdateOutcome::Updated);
    assert!(storage.get_control("1").await.expect("get").is_none());
    assert!(storage.get_control("10").await.expect("get").is_some());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.insert_control(&control("4")).await.expect("insert");

    assert!(storage.delete_control("4").await.expect("delete"));
    assert!(!storage.delete_control("4").await.expect("delete"));
    assert!(storage.list_controls().await.expect("list").is_empty());
}
