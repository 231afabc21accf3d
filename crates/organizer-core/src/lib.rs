//! # Forest Organizer Core Library
//!
//! Business logic for a personal task organizer. All operations are exposed
//! through the [`Organizer`] service so that the CLI (or any other front end)
//! stays a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Classifier**: keyword heuristics mapping a task description to a
//!   complexity tier, with a clarification flag for ambiguous descriptions
//! - **Scheduler**: pure day planner carving pending tasks into work and
//!   break intervals
//! - **Storage**: SQLite-backed stores and TOML-based configuration
//! - **Organizer**: application service wiring the above together
//!
//! ## Key Components
//!
//! - [`ComplexityClassifier`]: description → tier
//! - [`ScheduleBuilder`]: tasks + `now` → intervals
//! - [`OrganizerDb`]: task, schedule and account persistence
//! - [`Config`]: application configuration management

pub mod account;
pub mod classifier;
pub mod error;
pub mod organizer;
pub mod schedule;
pub mod scheduler;
pub mod storage;
pub mod task;

pub use account::{EmergencyStop, PenaltyStatus, Subscription, User};
pub use classifier::{resolve_clarification, Classification, ComplexityClassifier, KeywordConfig};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use organizer::{ActivationRequest, Dashboard, Organizer, RebuildOutcome};
pub use schedule::{Schedule, ScheduleInterval};
pub use scheduler::{ScheduleBuilder, SchedulerConfig};
pub use storage::{AccountStore, Config, OrganizerDb, ScheduleStore, TaskStore};
pub use task::{ComplexityTier, Task, TaskStatus};
