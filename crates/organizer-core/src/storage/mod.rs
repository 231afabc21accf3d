mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, SubscriptionConfig};
pub use database::OrganizerDb;

use chrono::{DateTime, NaiveDate, Utc};
use std::path::PathBuf;

use crate::account::{EmergencyStop, Subscription, User};
use crate::error::{ConfigError, Result};
use crate::schedule::Schedule;
use crate::task::Task;

/// Returns the data directory, creating it if needed.
///
/// `ORGANIZER_DATA_DIR` overrides the location entirely. Otherwise the
/// directory is `~/.config/forest-organizer/`, or
/// `~/.config/forest-organizer-dev/` when `ORGANIZER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("ORGANIZER_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("ORGANIZER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("forest-organizer-dev")
            } else {
                base_dir.join("forest-organizer")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// Per-user task storage.
pub trait TaskStore {
    fn insert_task(&self, task: &Task) -> Result<()>;
    fn get_task(&self, id: &str) -> Result<Option<Task>>;
    fn update_task(&self, task: &Task) -> Result<()>;
    /// All of a user's tasks, most recently inserted first.
    fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>>;
    /// A user's pending tasks in insertion order.
    fn pending_tasks(&self, user_id: i64) -> Result<Vec<Task>>;
}

/// One schedule per (user, date).
pub trait ScheduleStore {
    fn load_schedule(&self, user_id: i64, date: NaiveDate) -> Result<Option<Schedule>>;
    /// Replace the (user, date) schedule and write back the tasks' refreshed
    /// estimates as a single atomic change.
    fn replace_schedule(&self, schedule: &Schedule, tasks: &[Task]) -> Result<()>;
}

/// Users, subscriptions and emergency stops.
pub trait AccountStore {
    fn create_user(&self, username: &str, email: &str, created_at: DateTime<Utc>) -> Result<User>;
    fn find_user(&self, username: &str) -> Result<Option<User>>;
    fn set_motivation(&self, user_id: i64, motivation: &str) -> Result<()>;
    fn subscription(&self, user_id: i64) -> Result<Option<Subscription>>;
    fn save_subscription(&self, subscription: &Subscription) -> Result<()>;
    /// The user's unresumed stop, if any.
    fn active_emergency_stop(&self, user_id: i64) -> Result<Option<EmergencyStop>>;
    fn insert_emergency_stop(
        &self,
        user_id: i64,
        reason: &str,
        stop_time: DateTime<Utc>,
    ) -> Result<EmergencyStop>;
    fn mark_resumed(&self, stop_id: i64) -> Result<()>;
}
