use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::types::{DocumentReviewState, LineageDocument, ReviewSession};

/// Opens (or creates) the SQLite database at `path`, configures WAL mode,
/// and applies schema migrations via the `schema_version` table.
///
/// This function is the single entry point for all database connections.
/// It sets `busy_timeout` via the `Connection` method (not a PRAGMA string) to
/// ensure the setting takes effect regardless of pragma caching.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the file cannot be opened, WAL configuration
/// fails, or schema DDL fails.
pub async fn open_db(path: &str) -> Result<Connection, tokio_rusqlite::Error> {
    let conn = Connection::open(path).await?;

    conn.call(|db| {
        db.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )?;
        db.busy_timeout(Duration::from_secs(5))?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;

    // Checkpoint any leftover WAL from a previous run.
    conn.call(|db| {
        db.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;

    conn.call(|db| {
        crate::schema::migrate(db)?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;

    tracing::debug!(path, "database ready");
    Ok(conn)
}

/// Returns the current Unix timestamp in seconds.
fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Finds the most recent session for `site_id`, or creates one.
///
/// On resume: updates `updated_at` to the current time via `BEGIN IMMEDIATE`.
/// On create: generates a new UUID v4, inserts the session via `BEGIN IMMEDIATE`.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the query or write transaction fails.
pub async fn detect_or_create_session(
    conn: &Connection,
    site_id: &str,
) -> Result<ReviewSession, tokio_rusqlite::Error> {
    let site_id = site_id.to_owned();

    conn.call(move |db| {
        let existing: Option<ReviewSession> = db
            .query_row(
                "SELECT id, site_id, created_at, updated_at
                 FROM sessions
                 WHERE site_id = ?1
                 ORDER BY updated_at DESC
                 LIMIT 1",
                rusqlite::params![&site_id],
                |r| {
                    Ok(ReviewSession {
                        id: r.get(0)?,
                        site_id: r.get(1)?,
                        created_at: r.get(2)?,
                        updated_at: r.get(3)?,
                    })
                },
            )
            .optional()?;

        let now = now_secs();
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let session = match existing {
            Some(mut session) => {
                tx.execute(
                    "UPDATE sessions SET updated_at = ?1 WHERE id = ?2",
                    rusqlite::params![now, &session.id],
                )?;
                session.updated_at = now;
                session
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                tx.execute(
                    "INSERT INTO sessions (id, site_id, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?3)",
                    rusqlite::params![&id, &site_id, now],
                )?;
                ReviewSession {
                    id,
                    site_id,
                    created_at: now,
                    updated_at: now,
                }
            }
        };
        tx.commit()?;
        Ok::<_, rusqlite::Error>(session)
    })
    .await
}

/// Replaces the stored document snapshot for `site_id` with `documents`.
///
/// Delete and insert run in one `BEGIN IMMEDIATE` transaction, so readers see
/// either the old snapshot or the new one. Documents are inserted in slice
/// order; [`load_site_documents`] returns them in that same order.
///
/// Returns the number of documents written.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the transaction fails. Repeated ids are
/// stored as given.
pub async fn replace_site_documents(
    conn: &Connection,
    site_id: &str,
    documents: Vec<LineageDocument>,
) -> Result<usize, tokio_rusqlite::Error> {
    let site_id = site_id.to_owned();

    conn.call(move |db| {
        let now = now_secs();
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute(
            "DELETE FROM documents WHERE site_id = ?1",
            rusqlite::params![&site_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO documents (
                     site_id, seq, id, lineage_id, previous_id, is_current_version,
                     name, url, document_type, checksum,
                     first_collected_at, last_collected_at, text, imported_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            )?;
            for (seq, doc) in documents.iter().enumerate() {
                stmt.execute(rusqlite::params![
                    &site_id,
                    seq as i64,
                    &doc.id,
                    &doc.lineage_id,
                    &doc.previous_id,
                    doc.is_current_version,
                    &doc.name,
                    &doc.url,
                    &doc.document_type,
                    &doc.checksum,
                    doc.first_collected_at,
                    doc.last_collected_at,
                    &doc.text,
                    now,
                ])?;
            }
        }
        tx.commit()?;
        Ok::<_, rusqlite::Error>(documents.len())
    })
    .await
}

/// Loads the stored document snapshot for `site_id` in import order.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the query fails.
pub async fn load_site_documents(
    conn: &Connection,
    site_id: &str,
) -> Result<Vec<LineageDocument>, tokio_rusqlite::Error> {
    let site_id = site_id.to_owned();

    conn.call(move |db| {
        let mut stmt = db.prepare(
            "SELECT id, lineage_id, previous_id, is_current_version,
                    name, url, document_type, checksum,
                    first_collected_at, last_collected_at, text
             FROM documents
             WHERE site_id = ?1
             ORDER BY seq",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![&site_id], |r| {
                Ok(LineageDocument {
                    id: r.get(0)?,
                    lineage_id: r.get(1)?,
                    previous_id: r.get(2)?,
                    is_current_version: r.get(3)?,
                    name: r.get(4)?,
                    url: r.get(5)?,
                    document_type: r.get(6)?,
                    checksum: r.get(7)?,
                    first_collected_at: r.get(8)?,
                    last_collected_at: r.get(9)?,
                    text: r.get(10)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok::<_, rusqlite::Error>(rows)
    })
    .await
}

/// Loads the reviewed state for all documents within `session_id`.
///
/// Documents with no row in `document_review_state` are absent from the
/// result (treated as unreviewed).
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the query fails.
pub async fn load_document_review_state(
    conn: &Connection,
    session_id: &str,
) -> Result<Vec<DocumentReviewState>, tokio_rusqlite::Error> {
    let session_id = session_id.to_owned();

    conn.call(move |db| {
        let mut stmt = db.prepare(
            "SELECT session_id, document_id, reviewed, reviewed_at
             FROM document_review_state
             WHERE session_id = ?1",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![&session_id], |r| {
                Ok(DocumentReviewState {
                    session_id: r.get(0)?,
                    document_id: r.get(1)?,
                    reviewed: r.get(2)?,
                    reviewed_at: r.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok::<_, rusqlite::Error>(rows)
    })
    .await
}

/// Toggles the reviewed flag for `document_id` within `session_id`.
///
/// Uses an upsert (`INSERT ... ON CONFLICT DO UPDATE`) inside `BEGIN IMMEDIATE`.
/// Sets `reviewed_at` to now when transitioning to reviewed; clears it on untoggle.
///
/// Returns the new reviewed state.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the upsert transaction fails.
pub async fn toggle_document_reviewed(
    conn: &Connection,
    session_id: &str,
    document_id: &str,
) -> Result<bool, tokio_rusqlite::Error> {
    let session_id = session_id.to_owned();
    let document_id = document_id.to_owned();

    conn.call(move |db| {
        let now = now_secs();
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let current: bool = tx
            .query_row(
                "SELECT reviewed FROM document_review_state
                 WHERE session_id = ?1 AND document_id = ?2",
                rusqlite::params![&session_id, &document_id],
                |r| r.get::<_, bool>(0),
            )
            .optional()?
            .unwrap_or(false);

        let new_state = !current;
        let reviewed_at: Option<i64> = new_state.then_some(now);

        tx.execute(
            "INSERT INTO document_review_state (session_id, document_id, reviewed, reviewed_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(session_id, document_id)
             DO UPDATE SET reviewed = excluded.reviewed,
                           reviewed_at = excluded.reviewed_at",
            rusqlite::params![&session_id, &document_id, new_state, reviewed_at],
        )?;
        tx.commit()?;
        Ok::<_, rusqlite::Error>(new_state)
    })
    .await
}

/// Updates the `updated_at` timestamp for `session_id` to the current time.
///
/// Called on quit so `detect_or_create_session` resumes this session next time.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the `BEGIN IMMEDIATE` transaction fails.
pub async fn update_session_timestamp(
    conn: &Connection,
    session_id: &str,
) -> Result<(), tokio_rusqlite::Error> {
    let session_id = session_id.to_owned();

    conn.call(move |db| {
        let now = now_secs();
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute(
            "UPDATE sessions SET updated_at = ?1 WHERE id = ?2",
            rusqlite::params![now, &session_id],
        )?;
        tx.commit()?;
        Ok::<_, rusqlite::Error>(())
    })
    .await
}
