//! Background loads of a site's documents and review flags.
//!
//! A load reads the stored snapshot and the session's review flags through
//! the shared `tokio_rusqlite::Connection`, groups the documents, and reports
//! back over the event channel as `AppEvent::Loaded` or `AppEvent::LoadFailed`.
//!
//! `import_snapshot` runs the one-off `--import` step before the first load.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use lineage_core::{db, group_lineages, import, LineageGroup};
use tokio::sync::mpsc::UnboundedSender;
use tokio_rusqlite::Connection;

use crate::event::AppEvent;

/// Result of one load, ready to be applied to `AppState`.
#[derive(Debug)]
pub struct LoadResult {
    /// Groups in first-appearance order, all expanded.
    pub groups: Vec<LineageGroup>,
    /// Ids of documents marked reviewed in the current session.
    pub reviewed: HashSet<String>,
    /// Total number of documents in the snapshot.
    pub document_count: usize,
}

/// Spawns a load task for `site_id` within `session_id`.
pub fn spawn_load(
    conn: Connection,
    site_id: String,
    session_id: String,
    tx: UnboundedSender<AppEvent>,
) {
    tokio::spawn(async move {
        let event = match load(&conn, &site_id, &session_id).await {
            Ok(result) => AppEvent::Loaded(Box::new(result)),
            Err(e) => {
                tracing::error!(site_id, error = %e, "load failed");
                AppEvent::LoadFailed(e.to_string())
            }
        };
        let _ = tx.send(event);
    });
}

/// Loads and groups the snapshot for `site_id`.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if either query fails.
pub async fn load(
    conn: &Connection,
    site_id: &str,
    session_id: &str,
) -> Result<LoadResult, tokio_rusqlite::Error> {
    let documents = db::load_site_documents(conn, site_id).await?;
    let reviewed = db::load_document_review_state(conn, session_id)
        .await?
        .into_iter()
        .filter(|s| s.reviewed)
        .map(|s| s.document_id)
        .collect();

    let groups = group_lineages(&documents);
    let defects = groups.iter().filter(|g| !g.is_complete()).count();
    tracing::info!(
        site_id,
        documents = documents.len(),
        groups = groups.len(),
        defects,
        "loaded site snapshot"
    );

    Ok(LoadResult {
        groups,
        reviewed,
        document_count: documents.len(),
    })
}

/// Reads the JSON document list at `path` and stores it as the snapshot
/// for `site_id`. Returns the number of documents stored.
///
/// # Errors
///
/// Fails with the import path in context if the file cannot be read or
/// parsed, or if the store rejects the write.
pub async fn import_snapshot(conn: &Connection, site_id: &str, path: &Path) -> anyhow::Result<usize> {
    let documents = import::read_documents(path)
        .with_context(|| format!("importing {}", path.display()))?;
    let stored = db::replace_site_documents(conn, site_id, documents)
        .await
        .with_context(|| format!("storing documents from {}", path.display()))?;
    tracing::info!(site_id, stored, path = %path.display(), "imported snapshot");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_core::LineageDocument;

    #[tokio::test]
    async fn load_groups_snapshot_and_collects_reviewed_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.db");
        let conn = db::open_db(path.to_str().unwrap()).await.unwrap();

        let docs = vec![
            LineageDocument::new("v2", "L", Some("v1"), true),
            LineageDocument::new("v1", "L", None, false),
            LineageDocument::new("m1", "M", None, true),
        ];
        db::replace_site_documents(&conn, "site", docs).await.unwrap();
        let session = db::detect_or_create_session(&conn, "site").await.unwrap();
        db::toggle_document_reviewed(&conn, &session.id, "v1").await.unwrap();

        let result = load(&conn, "site", &session.id).await.unwrap();

        assert_eq!(result.document_count, 3);
        assert_eq!(result.groups.len(), 2);
        let ids: Vec<&str> = result.groups[0].documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["v1", "v2"]);
        assert!(result.reviewed.contains("v1"));
        assert!(!result.reviewed.contains("v2"));
    }

    #[tokio::test]
    async fn toggle_saved_while_load_in_flight_is_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.db");
        let conn = db::open_db(path.to_str().unwrap()).await.unwrap();
        let docs = vec![LineageDocument::new("a", "L", None, true)];
        db::replace_site_documents(&conn, "site", docs).await.unwrap();
        let session = db::detect_or_create_session(&conn, "site").await.unwrap();

        let mut state = crate::app::AppState::new("site");
        state.apply_load(load(&conn, "site", &session.id).await.unwrap());

        state.loading = true;
        let in_flight = load(&conn, "site", &session.id).await.unwrap();
        let reviewed = db::toggle_document_reviewed(&conn, &session.id, "a").await.unwrap();
        state.set_reviewed("a".to_owned(), reviewed);
        state.apply_load(in_flight);

        assert!(reviewed);
        assert_eq!(state.is_reviewed("a"), reviewed);
    }

    #[tokio::test]
    async fn import_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::open_db(dir.path().join("reviews.db").to_str().unwrap())
            .await
            .unwrap();
        let bad = dir.path().join("broken.json");
        std::fs::write(&bad, "[{\"id\": ").unwrap();

        let err = import_snapshot(&conn, "site", &bad).await.unwrap_err();

        assert!(format!("{err:#}").contains("broken.json"), "{err:#}");
    }

    #[tokio::test]
    async fn import_stores_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::open_db(dir.path().join("reviews.db").to_str().unwrap())
            .await
            .unwrap();
        let file = dir.path().join("docs.json");
        std::fs::write(
            &file,
            r#"[{"id": "1", "lineageId": "L", "isCurrentVersion": true}]"#,
        )
        .unwrap();

        assert_eq!(import_snapshot(&conn, "site", &file).await.unwrap(), 1);
        assert_eq!(db::load_site_documents(&conn, "site").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn spawned_load_reports_through_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.db");
        let conn = db::open_db(path.to_str().unwrap()).await.unwrap();
        let session = db::detect_or_create_session(&conn, "empty").await.unwrap();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        spawn_load(conn, "empty".to_owned(), session.id, tx);

        match rx.recv().await {
            Some(AppEvent::Loaded(result)) => {
                assert!(result.groups.is_empty());
                assert_eq!(result.document_count, 0);
            }
            other => panic!("expected Loaded, got {other:?}"),
        }
    }
}
