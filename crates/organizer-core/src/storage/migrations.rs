//! Database schema migrations for the organizer.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 3;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v3(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Current schema version, 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// v1: users, tasks, schedules, subscriptions, emergency stops.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            username   TEXT NOT NULL UNIQUE,
            email      TEXT NOT NULL,
            motivation TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id                   TEXT PRIMARY KEY,
            user_id              INTEGER NOT NULL REFERENCES users(id),
            description          TEXT NOT NULL,
            complexity           TEXT NOT NULL,
            estimated_minutes    INTEGER,
            status               TEXT NOT NULL DEFAULT 'pending',
            clarification_asked  INTEGER NOT NULL DEFAULT 0,
            clarification_answer TEXT,
            created_at           TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS schedules (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    INTEGER NOT NULL REFERENCES users(id),
            date       TEXT NOT NULL,
            plan_json  TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (user_id, date)
        );

        CREATE TABLE IF NOT EXISTS subscriptions (
            user_id         INTEGER PRIMARY KEY REFERENCES users(id),
            active          INTEGER NOT NULL DEFAULT 0,
            start_date      TEXT,
            end_date        TEXT,
            penalty_amount  REAL NOT NULL DEFAULT 0.0,
            confirmed_terms INTEGER NOT NULL DEFAULT 0,
            confirmed_email INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS emergency_stops (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id   INTEGER NOT NULL REFERENCES users(id),
            stop_time TEXT NOT NULL,
            reason    TEXT NOT NULL DEFAULT '',
            resumed   INTEGER NOT NULL DEFAULT 0
        );",
    )?;
    set_schema_version(conn, 1)
}

/// v2: indexes for the per-user lookups every command performs.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_tasks_user_status ON tasks(user_id, status);
         CREATE INDEX IF NOT EXISTS idx_tasks_user_created ON tasks(user_id, created_at);
         CREATE INDEX IF NOT EXISTS idx_emergency_stops_user_resumed
             ON emergency_stops(user_id, resumed);",
    )?;
    set_schema_version(conn, 2)
}

/// v3: one account per email address.
fn migrate_v3(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email);")?;
    set_schema_version(conn, 3)
}
