//! Integration test for the review store lifecycle.
//!
//! Exercises: open_db, migrate, detect_or_create_session, replace_site_documents,
//! load_site_documents, load_document_review_state, toggle_document_reviewed,
//! update_session_timestamp.

use lineage_core::{db, group_lineages};
use lineage_core::types::LineageDocument;

fn temp_db_path() -> String {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.keep().join("test.db");
    path.to_string_lossy().to_string()
}

fn sample_documents() -> Vec<LineageDocument> {
    vec![
        LineageDocument {
            name: Some("Formulary 2025".to_owned()),
            url: Some("https://example.org/formulary-2025.pdf".to_owned()),
            checksum: Some("c3".to_owned()),
            last_collected_at: Some(1_735_689_600),
            ..LineageDocument::new("3", "L1", Some("2"), true)
        },
        LineageDocument::new("1", "L1", None, false),
        LineageDocument::new("2", "L1", Some("1"), false),
        LineageDocument::new("b1", "L2", None, true),
    ]
}

#[tokio::test]
async fn full_session_lifecycle() {
    let path = temp_db_path();
    let conn = db::open_db(&path).await.unwrap();

    let version: i64 = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(db.query_row(
                "SELECT MAX(version) FROM schema_version",
                [],
                |r| r.get(0),
            )?)
        })
        .await
        .unwrap();
    assert_eq!(version, 1, "schema_version should be 1");

    let journal: String = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(
                db.query_row("PRAGMA journal_mode", [], |r| r.get(0))?,
            )
        })
        .await
        .unwrap();
    assert_eq!(journal, "wal", "journal_mode should be wal");

    let pk_count: i64 = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(db.query_row(
                "SELECT COUNT(*) FROM pragma_table_info('document_review_state') WHERE pk > 0",
                [],
                |r| r.get(0),
            )?)
        })
        .await
        .unwrap();
    assert_eq!(pk_count, 2, "document_review_state should have composite PK");

    // Create, then resume.
    let session = db::detect_or_create_session(&conn, "site-42").await.unwrap();
    assert!(!session.id.is_empty(), "session ID should be non-empty UUID");
    assert_eq!(session.site_id, "site-42");

    let resumed = db::detect_or_create_session(&conn, "site-42").await.unwrap();
    assert_eq!(resumed.id, session.id, "should resume same session");

    let other = db::detect_or_create_session(&conn, "site-7").await.unwrap();
    assert_ne!(other.id, session.id, "different site = new session");

    // Document snapshot round trip keeps import order and metadata.
    let written = db::replace_site_documents(&conn, "site-42", sample_documents())
        .await
        .unwrap();
    assert_eq!(written, 4);

    let loaded = db::load_site_documents(&conn, "site-42").await.unwrap();
    assert_eq!(loaded, sample_documents(), "snapshot should round-trip in order");
    assert!(db::load_site_documents(&conn, "site-7").await.unwrap().is_empty());

    // Replacing the snapshot drops documents that are no longer listed.
    let written = db::replace_site_documents(
        &conn,
        "site-42",
        vec![LineageDocument::new("only", "L9", None, true)],
    )
    .await
    .unwrap();
    assert_eq!(written, 1);
    let loaded = db::load_site_documents(&conn, "site-42").await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "only");

    // Review flags.
    let states = db::load_document_review_state(&conn, &session.id).await.unwrap();
    assert!(states.is_empty(), "no documents reviewed yet");

    let reviewed = db::toggle_document_reviewed(&conn, &session.id, "3").await.unwrap();
    assert!(reviewed, "first toggle should set reviewed=true");
    let reviewed = db::toggle_document_reviewed(&conn, &session.id, "3").await.unwrap();
    assert!(!reviewed, "second toggle should set reviewed=false");
    let reviewed = db::toggle_document_reviewed(&conn, &session.id, "3").await.unwrap();
    assert!(reviewed);
    let reviewed = db::toggle_document_reviewed(&conn, &session.id, "2").await.unwrap();
    assert!(reviewed);

    let states = db::load_document_review_state(&conn, &session.id).await.unwrap();
    assert_eq!(states.len(), 2);
    let three = states.iter().find(|s| s.document_id == "3").unwrap();
    assert!(three.reviewed);
    assert!(three.reviewed_at.is_some(), "reviewed_at set when reviewed");

    db::update_session_timestamp(&conn, &session.id).await.unwrap();

    // Persistence across connections.
    let conn2 = db::open_db(&path).await.unwrap();
    let states2 = db::load_document_review_state(&conn2, &session.id).await.unwrap();
    assert_eq!(states2.len(), 2, "review state should persist across connections");
}

#[tokio::test]
async fn repeated_ids_are_stored_in_import_order() {
    let path = temp_db_path();
    let conn = db::open_db(&path).await.unwrap();

    db::replace_site_documents(&conn, "s", sample_documents()).await.unwrap();

    // The same id in two lineages, as left behind when a document moves.
    let moved = vec![
        LineageDocument::new("x", "A", None, true),
        LineageDocument::new("y", "B", None, false),
        LineageDocument::new("x", "B", Some("y"), true),
    ];
    let stored = db::replace_site_documents(&conn, "s", moved).await.unwrap();
    assert_eq!(stored, 3);

    let loaded = db::load_site_documents(&conn, "s").await.unwrap();
    let keys: Vec<(&str, &str)> = loaded
        .iter()
        .map(|d| (d.id.as_str(), d.lineage_id.as_str()))
        .collect();
    assert_eq!(keys, [("x", "A"), ("y", "B"), ("x", "B")]);

    let groups = group_lineages(&loaded);
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g.is_complete()));
    assert_eq!(groups[1].documents.len(), 2);
}

#[tokio::test]
async fn migration_handles_legacy_db() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("legacy.db").to_string_lossy().to_string();

    // An unversioned database with an older sessions layout.
    {
        let db = rusqlite::Connection::open(&path).unwrap();
        db.execute_batch(
            "CREATE TABLE sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                repo_path TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            INSERT INTO sessions (repo_path, created_at) VALUES ('/old', '2024-01-01');",
        )
        .unwrap();
    }

    let conn = db::open_db(&path).await.unwrap();

    let session = db::detect_or_create_session(&conn, "site-1").await.unwrap();
    assert!(!session.id.is_empty());

    let count: i64 = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(
                db.query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0))?,
            )
        })
        .await
        .unwrap();
    assert_eq!(count, 1, "only the new session should exist");
}

#[tokio::test]
async fn unreadable_schema_version_fails_without_dropping_tables() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("odd.db").to_string_lossy().to_string();

    {
        let db = rusqlite::Connection::open(&path).unwrap();
        db.execute_batch(
            "CREATE TABLE schema_version (label TEXT);
             CREATE TABLE sessions (id TEXT PRIMARY KEY);
             INSERT INTO sessions (id) VALUES ('keep-me');",
        )
        .unwrap();
    }

    assert!(db::open_db(&path).await.is_err());

    let db = rusqlite::Connection::open(&path).unwrap();
    let kept: String = db
        .query_row("SELECT id FROM sessions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(kept, "keep-me");
}
