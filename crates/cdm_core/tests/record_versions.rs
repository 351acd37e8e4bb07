use cdm_core::db::open_db_in_memory;
use cdm_core::model::kind::Relation;
use cdm_core::{EntityKind, Meta, RecordRepository, RepoError, SqliteRecordRepository};
use rusqlite::Connection;
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

fn epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

fn link_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM record_links;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn latest_insert_wins_for_a_uuid() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let uuid = Uuid::new_v4();

    let first = repo
        .insert_record(EntityKind::Model, &Meta::new(uuid, "v1"), "{}")
        .unwrap();
    let second = repo
        .insert_record(EntityKind::Model, &Meta::new(uuid, "v2"), "{}")
        .unwrap();
    assert!(second > first);

    let current = repo.current_version(EntityKind::Model, uuid).unwrap().unwrap();
    assert_eq!(current.seq, second);
    assert_eq!(current.meta.name, "v2");

    let versions = repo.list_versions(EntityKind::Model, uuid).unwrap();
    assert_eq!(
        versions.iter().map(|record| record.seq).collect::<Vec<_>>(),
        vec![first, second]
    );
}

#[test]
fn kinds_do_not_share_versions() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let uuid = Uuid::new_v4();

    repo.insert_record(EntityKind::DiagramElement, &Meta::new(uuid, "A"), "{}")
        .unwrap();

    assert!(repo.exists(EntityKind::DiagramElement, uuid).unwrap());
    assert!(!repo.exists(EntityKind::InputOutputValue, uuid).unwrap());
    assert!(repo
        .current_version(EntityKind::InputOutputValue, uuid)
        .unwrap()
        .is_none());
}

#[test]
fn meta_columns_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let mut meta = Meta::fresh("Adder");
    meta.summary = "sums two inputs".to_string();
    meta.documentation = Some(json!({ "markdown": "# Adder" }));
    meta.version = "0.1".to_string();
    meta.draft = true;
    meta.creator = "analyst".to_string();
    meta.created_date = Some("2025-04-29T12:31:37-04:00".to_string());

    repo.insert_record(EntityKind::Model, &meta, r#"{"$schema":"Placeholder"}"#)
        .unwrap();

    let stored = repo
        .current_version(EntityKind::Model, meta.uuid)
        .unwrap()
        .unwrap();
    assert_eq!(stored.meta, meta);
    assert_eq!(stored.body, r#"{"$schema":"Placeholder"}"#);
    assert!(stored.recorded_at > 0);
}

#[test]
fn recorded_at_keeps_millisecond_precision() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let uuid = Uuid::new_v4();

    let before = epoch_ms();
    repo.insert_record(EntityKind::Model, &Meta::new(uuid, "M"), "{}")
        .unwrap();
    let after = epoch_ms();

    let stored = repo.current_version(EntityKind::Model, uuid).unwrap().unwrap();
    assert!(stored.recorded_at >= before);
    assert!(stored.recorded_at <= after);
}

#[test]
fn recorded_at_column_default_is_in_milliseconds() {
    let conn = open_db_in_memory().unwrap();
    let before = epoch_ms();
    conn.execute(
        "INSERT INTO records (uuid, kind) VALUES (?1, 'model');",
        [Uuid::new_v4().to_string()],
    )
    .unwrap();
    let after = epoch_ms();

    let recorded_at: i64 = conn
        .query_row("SELECT recorded_at FROM records;", [], |row| row.get(0))
        .unwrap();
    assert!(recorded_at >= before - 1);
    assert!(recorded_at <= after + 1);
}

#[test]
fn list_current_by_kind_returns_one_row_per_uuid() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let older = Uuid::new_v4();
    let newer = Uuid::new_v4();

    repo.insert_record(EntityKind::Model, &Meta::new(older, "older v1"), "{}")
        .unwrap();
    repo.insert_record(EntityKind::Model, &Meta::new(newer, "newer"), "{}")
        .unwrap();
    repo.insert_record(EntityKind::Model, &Meta::new(older, "older v2"), "{}")
        .unwrap();
    repo.insert_record(EntityKind::Diagram, &Meta::fresh("diagram"), "{}")
        .unwrap();

    let current = repo.list_current_by_kind(EntityKind::Model, 10).unwrap();
    let names = current
        .iter()
        .map(|record| record.meta.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["older v2", "newer"]);

    assert_eq!(repo.list_current_by_kind(EntityKind::Model, 1).unwrap().len(), 1);
}

#[test]
fn owned_children_follow_position_and_latest_copy_per_uuid() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let parent = repo
        .insert_record(EntityKind::Diagram, &Meta::fresh("D"), "{}")
        .unwrap();
    let b_uuid = Uuid::new_v4();
    let b = repo
        .insert_record(EntityKind::DiagramElement, &Meta::new(b_uuid, "B"), "{}")
        .unwrap();
    let a = repo
        .insert_record(EntityKind::DiagramElement, &Meta::fresh("A"), "{}")
        .unwrap();
    let b_again = repo
        .insert_record(EntityKind::DiagramElement, &Meta::new(b_uuid, "B v2"), "{}")
        .unwrap();

    repo.link_child(parent, Relation::DiagramElements, 0, b).unwrap();
    repo.link_child(parent, Relation::DiagramElements, 1, a).unwrap();
    repo.link_child(parent, Relation::DiagramElements, 2, b_again)
        .unwrap();

    let children = repo
        .owned_children(parent, Relation::DiagramElements)
        .unwrap();
    let names = children
        .iter()
        .map(|record| record.meta.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["A", "B v2"]);
    assert!(repo
        .owned_children(parent, Relation::DiagramDependencies)
        .unwrap()
        .is_empty());
}

#[test]
fn owned_children_reject_wrong_kind() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let parent = repo
        .insert_record(EntityKind::Diagram, &Meta::fresh("D"), "{}")
        .unwrap();
    let control = repo
        .insert_record(EntityKind::Control, &Meta::fresh("C"), "{}")
        .unwrap();
    repo.link_child(parent, Relation::DiagramElements, 0, control)
        .unwrap();

    let err = repo
        .owned_children(parent, Relation::DiagramElements)
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn delete_versions_drops_links_but_keeps_children() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let model = Uuid::new_v4();
    let parent = repo
        .insert_record(EntityKind::Model, &Meta::new(model, "M"), "{}")
        .unwrap();
    let diagram = Meta::fresh("D");
    let child = repo
        .insert_record(EntityKind::Diagram, &diagram, "{}")
        .unwrap();
    repo.link_child(parent, Relation::ModelDiagrams, 0, child)
        .unwrap();

    assert_eq!(repo.delete_versions(EntityKind::Model, model).unwrap(), 1);

    assert!(!repo.exists(EntityKind::Model, model).unwrap());
    assert!(repo.exists(EntityKind::Diagram, diagram.uuid).unwrap());
    assert_eq!(link_count(&conn), 0);
}

#[test]
fn failed_transaction_rolls_back_every_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let meta = Meta::fresh("M");

    let result: Result<(), RepoError> = repo.in_transaction(|repo| {
        repo.insert_record(EntityKind::Model, &meta, "{}")?;
        Err(RepoError::InvalidData("abort".to_string()))
    });

    assert!(result.is_err());
    assert!(!repo.exists(EntityKind::Model, meta.uuid).unwrap());
}

#[test]
fn sequence_numbers_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let uuid = Uuid::new_v4();
    let first = repo
        .insert_record(EntityKind::Model, &Meta::new(uuid, "M"), "{}")
        .unwrap();
    repo.delete_versions(EntityKind::Model, uuid).unwrap();

    let second = repo
        .insert_record(EntityKind::Model, &Meta::new(uuid, "M"), "{}")
        .unwrap();
    assert!(second > first);
}
