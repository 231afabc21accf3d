//! SQLite-based storage for users, tasks, schedules and incentive records.
//!
//! Timestamps are stored as RFC 3339 text in UTC with fixed microsecond
//! precision so they sort lexically. Schedules are stored as the JSON
//! interval list, one row per (user, date).

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::{data_dir, migrations, AccountStore, ScheduleStore, TaskStore};
use crate::account::{EmergencyStop, Subscription, User};
use crate::error::{CoreError, DatabaseError, Result, ValidationError};
use crate::schedule::{Schedule, ScheduleInterval};
use crate::task::{ComplexityTier, Task, TaskStatus};

const DATE_FORMAT: &str = "%Y-%m-%d";

const TASK_COLUMNS: &str = "id, user_id, description, complexity, estimated_minutes, status,
     clarification_asked, clarification_answer, created_at";

// === Helper Functions ===

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

/// Parse an RFC 3339 column into UTC
fn parse_datetime(column: usize, value: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}

fn parse_optional_datetime(
    column: usize,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    value.map(|v| parse_datetime(column, &v)).transpose()
}

/// Build a Task from a row selected with [`TASK_COLUMNS`]
fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
    let complexity: String = row.get(3)?;
    let status: String = row.get(5)?;
    let created_at: String = row.get(8)?;

    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        description: row.get(2)?,
        complexity: complexity
            .parse::<ComplexityTier>()
            .map_err(|e| conversion_error(3, e))?,
        estimated_minutes: row.get(4)?,
        status: status
            .parse::<TaskStatus>()
            .map_err(|e| conversion_error(5, e))?,
        clarification_asked: row.get(6)?,
        clarification_answer: row.get(7)?,
        created_at: parse_datetime(8, &created_at)?,
    })
}

fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let created_at: String = row.get(4)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        motivation: row.get(3)?,
        created_at: parse_datetime(4, &created_at)?,
    })
}

fn row_to_subscription(row: &rusqlite::Row) -> Result<Subscription, rusqlite::Error> {
    Ok(Subscription {
        user_id: row.get(0)?,
        active: row.get(1)?,
        start_date: parse_optional_datetime(2, row.get(2)?)?,
        end_date: parse_optional_datetime(3, row.get(3)?)?,
        penalty_amount: row.get(4)?,
        confirmed_terms: row.get(5)?,
        confirmed_email: row.get(6)?,
    })
}

fn row_to_emergency_stop(row: &rusqlite::Row) -> Result<EmergencyStop, rusqlite::Error> {
    let stop_time: String = row.get(2)?;
    Ok(EmergencyStop {
        id: row.get(0)?,
        user_id: row.get(1)?,
        stop_time: parse_datetime(2, &stop_time)?,
        reason: row.get(3)?,
        resumed: row.get(4)?,
    })
}

/// Message for a UNIQUE violation on the users table, if `err` is one.
fn duplicate_user_message(err: &rusqlite::Error) -> Option<&'static str> {
    match err {
        rusqlite::Error::SqliteFailure(code, message)
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            if message.as_deref().is_some_and(|m| m.contains("users.email")) {
                Some("email already registered")
            } else {
                Some("username already taken")
            }
        }
        _ => None,
    }
}

/// SQLite database backing every store trait.
pub struct OrganizerDb {
    conn: Connection,
}

impl OrganizerDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/organizer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("organizer.db"))
    }

    /// Open (or create) the database at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    fn query_tasks(&self, sql: &str, user_id: i64) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let tasks = stmt
            .query_map(params![user_id], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }
}

impl TaskStore for OrganizerDb {
    fn insert_task(&self, task: &Task) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tasks (id, user_id, description, complexity, estimated_minutes, status,
                                clarification_asked, clarification_answer, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                task.id,
                task.user_id,
                task.description,
                task.complexity.as_str(),
                task.estimated_minutes,
                task.status.as_str(),
                task.clarification_asked,
                task.clarification_answer,
                format_datetime(&task.created_at),
            ],
        )?;
        Ok(())
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    fn update_task(&self, task: &Task) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET description = ?2, complexity = ?3, estimated_minutes = ?4, status = ?5,
                 clarification_asked = ?6, clarification_answer = ?7
             WHERE id = ?1",
            params![
                task.id,
                task.description,
                task.complexity.as_str(),
                task.estimated_minutes,
                task.status.as_str(),
                task.clarification_asked,
                task.clarification_answer,
            ],
        )?;
        if changed == 0 {
            return Err(CoreError::NotFound {
                kind: "task",
                id: task.id.clone(),
            });
        }
        Ok(())
    }

    fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY rowid DESC"
            ),
            user_id,
        )
    }

    fn pending_tasks(&self, user_id: i64) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 AND status = 'pending'
                 ORDER BY rowid ASC"
            ),
            user_id,
        )
    }
}

impl ScheduleStore for OrganizerDb {
    fn load_schedule(&self, user_id: i64, date: NaiveDate) -> Result<Option<Schedule>> {
        let plan_json: Option<String> = self
            .conn
            .query_row(
                "SELECT plan_json FROM schedules WHERE user_id = ?1 AND date = ?2",
                params![user_id, date.format(DATE_FORMAT).to_string()],
                |row| row.get(0),
            )
            .optional()?;

        plan_json
            .map(|json| -> Result<Schedule> {
                let intervals: Vec<ScheduleInterval> =
                    serde_json::from_str(&json).map_err(|e| DatabaseError::CorruptValue {
                        column: "plan_json".into(),
                        message: e.to_string(),
                    })?;
                Ok(Schedule {
                    user_id,
                    date,
                    intervals,
                })
            })
            .transpose()
    }

    fn replace_schedule(&self, schedule: &Schedule, tasks: &[Task]) -> Result<()> {
        let plan_json = serde_json::to_string(&schedule.intervals)?;
        let tx = self.conn.unchecked_transaction()?;

        for task in tasks {
            tx.execute(
                "UPDATE tasks SET estimated_minutes = ?1 WHERE id = ?2 AND user_id = ?3",
                params![task.estimated_minutes, task.id, schedule.user_id],
            )?;
        }

        tx.execute(
            "INSERT INTO schedules (user_id, date, plan_json, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (user_id, date)
             DO UPDATE SET plan_json = excluded.plan_json, created_at = excluded.created_at",
            params![
                schedule.user_id,
                schedule.date.format(DATE_FORMAT).to_string(),
                plan_json,
                format_datetime(&Utc::now()),
            ],
        )?;

        tx.commit()?;
        Ok(())
    }
}

impl AccountStore for OrganizerDb {
    fn create_user(&self, username: &str, email: &str, created_at: DateTime<Utc>) -> Result<User> {
        let inserted = self.conn.execute(
            "INSERT INTO users (username, email, motivation, created_at) VALUES (?1, ?2, '', ?3)",
            params![username, email, format_datetime(&created_at)],
        );
        if let Err(e) = inserted {
            return Err(match duplicate_user_message(&e) {
                Some(message) => ValidationError::Duplicate(message.into()).into(),
                None => e.into(),
            });
        }

        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
            motivation: String::new(),
            created_at,
        })
    }

    fn find_user(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, email, motivation, created_at FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn set_motivation(&self, user_id: i64, motivation: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE users SET motivation = ?2 WHERE id = ?1",
            params![user_id, motivation],
        )?;
        if changed == 0 {
            return Err(CoreError::NotFound {
                kind: "user",
                id: user_id.to_string(),
            });
        }
        Ok(())
    }

    fn subscription(&self, user_id: i64) -> Result<Option<Subscription>> {
        let subscription = self
            .conn
            .query_row(
                "SELECT user_id, active, start_date, end_date, penalty_amount,
                        confirmed_terms, confirmed_email
                 FROM subscriptions WHERE user_id = ?1",
                params![user_id],
                row_to_subscription,
            )
            .optional()?;
        Ok(subscription)
    }

    fn save_subscription(&self, subscription: &Subscription) -> Result<()> {
        self.conn.execute(
            "INSERT INTO subscriptions (user_id, active, start_date, end_date, penalty_amount,
                                        confirmed_terms, confirmed_email)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (user_id) DO UPDATE SET
                 active = excluded.active,
                 start_date = excluded.start_date,
                 end_date = excluded.end_date,
                 penalty_amount = excluded.penalty_amount,
                 confirmed_terms = excluded.confirmed_terms,
                 confirmed_email = excluded.confirmed_email",
            params![
                subscription.user_id,
                subscription.active,
                subscription.start_date.as_ref().map(format_datetime),
                subscription.end_date.as_ref().map(format_datetime),
                subscription.penalty_amount,
                subscription.confirmed_terms,
                subscription.confirmed_email,
            ],
        )?;
        Ok(())
    }

    fn active_emergency_stop(&self, user_id: i64) -> Result<Option<EmergencyStop>> {
        let stop = self
            .conn
            .query_row(
                "SELECT id, user_id, stop_time, reason, resumed FROM emergency_stops
                 WHERE user_id = ?1 AND resumed = 0
                 ORDER BY id ASC LIMIT 1",
                params![user_id],
                row_to_emergency_stop,
            )
            .optional()?;
        Ok(stop)
    }

    fn insert_emergency_stop(
        &self,
        user_id: i64,
        reason: &str,
        stop_time: DateTime<Utc>,
    ) -> Result<EmergencyStop> {
        self.conn.execute(
            "INSERT INTO emergency_stops (user_id, stop_time, reason, resumed)
             VALUES (?1, ?2, ?3, 0)",
            params![user_id, format_datetime(&stop_time), reason],
        )?;
        Ok(EmergencyStop {
            id: self.conn.last_insert_rowid(),
            user_id,
            stop_time,
            reason: reason.to_string(),
            resumed: false,
        })
    }

    fn mark_resumed(&self, stop_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE emergency_stops SET resumed = 1 WHERE id = ?1",
            params![stop_id],
        )?;
        Ok(())
    }
}
