//! Task types: complexity tiers, status lifecycle and the task record itself.
//!
//! The core only ever writes two fields of a [`Task`]: `complexity` (at
//! creation or clarification) and `estimated_minutes` (on every schedule
//! rebuild). Identity and persistence belong to the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Complexity tier assigned to a task.
///
/// Drives both the duration estimate and the per-session cap used by the
/// schedule builder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    Low,
    Medium,
    High,
}

impl ComplexityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityTier::Low => "low",
            ComplexityTier::Medium => "medium",
            ComplexityTier::High => "high",
        }
    }
}

impl Default for ComplexityTier {
    fn default() -> Self {
        ComplexityTier::Medium
    }
}

impl fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplexityTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(ComplexityTier::Low),
            "medium" => Ok(ComplexityTier::Medium),
            "high" => Ok(ComplexityTier::High),
            other => Err(ValidationError::InvalidValue {
                field: "complexity".into(),
                message: format!("unknown tier '{other}'"),
            }),
        }
    }
}

/// Task status.
///
/// Valid transitions:
/// - PENDING → COMPLETED
/// - PENDING → CANCELLED
///
/// Both COMPLETED and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Check if a transition is valid.
    pub fn can_transition_to(&self, to: &TaskStatus) -> bool {
        match self {
            TaskStatus::Pending => matches!(to, TaskStatus::Completed | TaskStatus::Cancelled),
            TaskStatus::Completed | TaskStatus::Cancelled => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            other => Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: format!("unknown status '{other}'"),
            }),
        }
    }
}

/// A user's task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Owning user
    pub user_id: i64,
    /// Free-text description, never empty
    pub description: String,
    pub complexity: ComplexityTier,
    /// Minutes assigned by the last schedule rebuild
    pub estimated_minutes: Option<u32>,
    pub status: TaskStatus,
    /// Set when the classifier could not decide with confidence
    pub clarification_asked: bool,
    /// Raw answer the user gave to the clarification prompt
    pub clarification_answer: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a pending task with a fresh id.
    pub fn new(
        user_id: i64,
        description: impl Into<String>,
        complexity: ComplexityTier,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            description: description.into(),
            complexity,
            estimated_minutes: None,
            status: TaskStatus::Pending,
            clarification_asked: false,
            clarification_answer: None,
            created_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Move the task to `to`, rejecting transitions out of terminal states.
    pub fn transition_to(&mut self, to: TaskStatus) -> Result<(), ValidationError> {
        if !self.status.can_transition_to(&to) {
            return Err(ValidationError::InvalidTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }
}
