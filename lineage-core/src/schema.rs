/// DDL to create the schema_version tracking table.
///
/// Applied unconditionally on every DB open (before checking the version),
/// using `IF NOT EXISTS` so it is safe to run multiple times.
pub const SCHEMA_VERSION_DDL: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL
    ) STRICT;
";

/// Drops tables left behind by an unversioned database.
///
/// A database without a `schema_version` row predates migrations; its tables
/// cannot be trusted to match v1 and are rebuilt from scratch.
const DROP_UNVERSIONED_SQL: &str = "
    DROP TABLE IF EXISTS document_review_state;
    DROP TABLE IF EXISTS documents;
    DROP TABLE IF EXISTS sessions;
";

/// DDL for the full v1 schema.
///
/// Contains three tables:
/// - `sessions`: one row per review session, keyed by UUID v4 text, scoped to a site.
/// - `documents`: the latest imported document snapshot per site, keyed by
///   import position `seq`. Ids are not unique here: grouping decides what a
///   repeated id means, and relies on `seq` order for its tie-breaks.
/// - `document_review_state`: per-document reviewed flag within a session.
///
/// All tables use `STRICT` mode for type enforcement.
pub const SCHEMA_V1_SQL: &str = "
    CREATE TABLE IF NOT EXISTS sessions (
        id          TEXT    PRIMARY KEY,
        site_id     TEXT    NOT NULL,
        created_at  INTEGER NOT NULL,
        updated_at  INTEGER NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS documents (
        site_id            TEXT    NOT NULL,
        seq                INTEGER NOT NULL,
        id                 TEXT    NOT NULL,
        lineage_id         TEXT    NOT NULL,
        previous_id        TEXT,
        is_current_version INTEGER NOT NULL DEFAULT 0,
        name               TEXT,
        url                TEXT,
        document_type      TEXT,
        checksum           TEXT,
        first_collected_at INTEGER,
        last_collected_at  INTEGER,
        text               TEXT,
        imported_at        INTEGER NOT NULL,
        PRIMARY KEY (site_id, seq)
    ) STRICT;

    CREATE INDEX IF NOT EXISTS documents_by_lineage
        ON documents (site_id, lineage_id);

    CREATE TABLE IF NOT EXISTS document_review_state (
        session_id  TEXT    NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
        document_id TEXT    NOT NULL,
        reviewed    INTEGER NOT NULL DEFAULT 0,
        reviewed_at INTEGER,
        PRIMARY KEY (session_id, document_id)
    ) STRICT;
";

/// Runs forward-only schema migration to migrate the DB to the latest version.
///
/// Idempotent: safe to call on every startup.
///
/// 1. Creates the `schema_version` table if it does not exist.
/// 2. Reads the current version (`0` if the table is empty).
/// 3. If the version is below 1, drops unversioned leftovers, applies
///    `SCHEMA_V1_SQL` inside a `BEGIN IMMEDIATE` transaction and records
///    `version = 1`.
///
/// # Errors
///
/// Returns `rusqlite::Error` if the DDL fails or the version row cannot be read.
pub fn migrate(db: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    db.execute_batch(SCHEMA_VERSION_DDL)?;

    let version: i64 = db
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )?;

    if version < 1 {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute_batch(DROP_UNVERSIONED_SQL)?;
        tx.execute_batch(SCHEMA_V1_SQL)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        tx.commit()?;
        tracing::info!(from = version, to = 1, "applied schema migration");
    }

    Ok(())
}
