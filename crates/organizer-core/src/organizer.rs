//! Application service tying the classifier and scheduler to storage.
//!
//! [`Organizer`] is constructed once with a store and the loaded config and
//! passed to whatever front end drives it. Every operation names the acting
//! user explicitly; there is no session state.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::account::{EmergencyStop, PenaltyStatus, Subscription, User};
use crate::classifier::{resolve_clarification, ComplexityClassifier};
use crate::error::{CoreError, Result, ValidationError};
use crate::schedule::Schedule;
use crate::scheduler::ScheduleBuilder;
use crate::storage::{AccountStore, Config, ScheduleStore, TaskStore};
use crate::task::{Task, TaskStatus};

/// Result of a rebuild request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// A fresh schedule was stored, replacing any earlier one for the day
    Built(Schedule),
    /// The user has no pending tasks; nothing was written
    NothingToSchedule,
}

/// Summary shown on the user's home screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub username: String,
    pub motivation: String,
    pub pending_tasks: usize,
    pub penalty: PenaltyStatus,
}

/// Subscription activation form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActivationRequest {
    /// Falls back to the configured default penalty
    pub penalty: Option<f64>,
    pub confirmed_terms: bool,
    pub confirmed_email: bool,
}

/// The organizer application.
pub struct Organizer<S> {
    store: S,
    config: Config,
    classifier: ComplexityClassifier,
    builder: ScheduleBuilder,
}

impl<S> Organizer<S>
where
    S: TaskStore + ScheduleStore + AccountStore,
{
    pub fn new(store: S, config: Config) -> Self {
        let classifier = ComplexityClassifier::with_keywords(config.classifier.clone());
        let builder = ScheduleBuilder::with_config(config.scheduler.clone());
        Self {
            store,
            config,
            classifier,
            builder,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // === Users ===

    pub fn register_user(&self, username: &str, email: &str, now: DateTime<Utc>) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "username".into(),
                message: "must not be empty".into(),
            }
            .into());
        }
        if self.store.find_user(username)?.is_some() {
            tracing::warn!(username, "registration rejected: name taken");
            return Err(ValidationError::Duplicate("username already taken".into()).into());
        }

        let user = self.store.create_user(username, email.trim(), now)?;
        tracing::info!(user_id = user.id, username, "user registered");
        Ok(user)
    }

    /// Look up a user by name.
    pub fn user(&self, username: &str) -> Result<User> {
        self.store
            .find_user(username)?
            .ok_or_else(|| CoreError::NotFound {
                kind: "user",
                id: username.to_string(),
            })
    }

    pub fn set_motivation(&self, user: &User, motivation: &str) -> Result<()> {
        self.store.set_motivation(user.id, motivation)?;
        tracing::info!(user_id = user.id, "motivation saved");
        Ok(())
    }

    pub fn dashboard(&self, user: &User) -> Result<Dashboard> {
        let stored = self.user(&user.username)?;
        Ok(Dashboard {
            pending_tasks: self.store.pending_tasks(user.id)?.len(),
            penalty: self.penalty_status(user)?,
            username: stored.username,
            motivation: stored.motivation,
        })
    }

    // === Tasks ===

    /// Classify and store a new pending task.
    pub fn add_task(&self, user: &User, description: &str, now: DateTime<Utc>) -> Result<Task> {
        if description.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "description".into(),
                message: "must not be empty".into(),
            }
            .into());
        }

        let classification = self.classifier.classify(description);
        let mut task = Task::new(user.id, description, classification.tier, now);
        task.clarification_asked = classification.needs_clarification;
        self.store.insert_task(&task)?;

        tracing::info!(
            task_id = %task.id,
            tier = %task.complexity,
            needs_clarification = task.clarification_asked,
            "task added"
        );
        Ok(task)
    }

    /// Apply the user's answer to a pending clarification.
    pub fn clarify(&self, user: &User, task_id: &str, answer: &str) -> Result<Task> {
        let mut task = self.owned_task(user, task_id)?;
        if !task.clarification_asked {
            return Err(ValidationError::InvalidValue {
                field: "clarification".into(),
                message: format!("task {task_id} has no open clarification"),
            }
            .into());
        }

        task.complexity = resolve_clarification(answer);
        task.clarification_asked = false;
        task.clarification_answer = Some(answer.to_string());
        self.store.update_task(&task)?;

        tracing::info!(task_id, tier = %task.complexity, "clarification applied");
        Ok(task)
    }

    pub fn complete_task(&self, user: &User, task_id: &str) -> Result<Task> {
        self.change_status(user, task_id, TaskStatus::Completed)
    }

    pub fn cancel_task(&self, user: &User, task_id: &str) -> Result<Task> {
        self.change_status(user, task_id, TaskStatus::Cancelled)
    }

    /// All of the user's tasks, newest first.
    pub fn list_tasks(&self, user: &User) -> Result<Vec<Task>> {
        self.store.list_tasks(user.id)
    }

    fn change_status(&self, user: &User, task_id: &str, to: TaskStatus) -> Result<Task> {
        let mut task = self.owned_task(user, task_id)?;
        task.transition_to(to)?;
        self.store.update_task(&task)?;
        tracing::info!(task_id, status = %to, "task status changed");
        Ok(task)
    }

    fn owned_task(&self, user: &User, task_id: &str) -> Result<Task> {
        let task = self
            .store
            .get_task(task_id)?
            .ok_or_else(|| CoreError::NotFound {
                kind: "task",
                id: task_id.to_string(),
            })?;
        if task.user_id != user.id {
            tracing::warn!(task_id, user_id = user.id, "rejected access to foreign task");
            return Err(CoreError::Forbidden("not your task".into()));
        }
        Ok(task)
    }

    // === Schedule ===

    /// Rebuild today's schedule from a snapshot of the user's pending tasks.
    ///
    /// `now` is local wall-clock time; the schedule is stored under its date.
    pub fn rebuild_schedule(&self, user: &User, now: NaiveDateTime) -> Result<RebuildOutcome> {
        let mut tasks = self.store.pending_tasks(user.id)?;
        let intervals = match self.builder.build_schedule(&mut tasks, now) {
            Ok(intervals) => intervals,
            Err(ValidationError::EmptyCollection(_)) => {
                tracing::info!(user_id = user.id, "no pending tasks to schedule");
                return Ok(RebuildOutcome::NothingToSchedule);
            }
            Err(e) => return Err(e.into()),
        };

        let schedule = Schedule {
            user_id: user.id,
            date: now.date(),
            intervals,
        };
        self.store.replace_schedule(&schedule, &tasks)?;

        tracing::info!(
            user_id = user.id,
            date = %schedule.date,
            intervals = schedule.intervals.len(),
            "schedule rebuilt"
        );
        Ok(RebuildOutcome::Built(schedule))
    }

    pub fn schedule_for(&self, user: &User, date: NaiveDate) -> Result<Option<Schedule>> {
        self.store.load_schedule(user.id, date)
    }

    // === Subscription ===

    pub fn activate_subscription(
        &self,
        user: &User,
        request: &ActivationRequest,
        now: DateTime<Utc>,
    ) -> Result<Subscription> {
        if !request.confirmed_terms || !request.confirmed_email {
            tracing::warn!(user_id = user.id, "activation without confirmations");
            return Err(ValidationError::InvalidValue {
                field: "confirmation".into(),
                message: "terms must be confirmed".into(),
            }
            .into());
        }

        let penalty = request
            .penalty
            .unwrap_or(self.config.subscription.default_penalty);
        if !penalty.is_finite() || penalty < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "penalty".into(),
                message: format!("must be a non-negative amount, got {penalty}"),
            }
            .into());
        }

        let mut subscription = self
            .store
            .subscription(user.id)?
            .unwrap_or_else(|| Subscription {
                user_id: user.id,
                active: false,
                start_date: None,
                end_date: None,
                penalty_amount: 0.0,
                confirmed_terms: false,
                confirmed_email: false,
            });
        subscription.activate(penalty, now);
        self.store.save_subscription(&subscription)?;

        tracing::info!(user_id = user.id, penalty, "subscription activated");
        Ok(subscription)
    }

    /// Returns the deactivated subscription, or `None` if none was active.
    pub fn deactivate_subscription(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<Option<Subscription>> {
        let Some(mut subscription) = self.store.subscription(user.id)? else {
            return Ok(None);
        };
        if !subscription.deactivate(now) {
            return Ok(None);
        }
        self.store.save_subscription(&subscription)?;
        tracing::info!(user_id = user.id, "subscription deactivated");
        Ok(Some(subscription))
    }

    pub fn subscription_status(&self, user: &User) -> Result<Option<Subscription>> {
        self.store.subscription(user.id)
    }

    // === Emergency stop ===

    /// Suspend penalties. An existing unresumed stop is returned unchanged.
    pub fn emergency_stop(
        &self,
        user: &User,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<EmergencyStop> {
        if let Some(active) = self.store.active_emergency_stop(user.id)? {
            return Ok(active);
        }
        let stop = self.store.insert_emergency_stop(user.id, reason, now)?;
        tracing::info!(user_id = user.id, stop_id = stop.id, "emergency stop engaged");
        Ok(stop)
    }

    /// Lift the active stop. Returns `None` when nothing was stopped.
    pub fn emergency_resume(&self, user: &User) -> Result<Option<EmergencyStop>> {
        let Some(mut stop) = self.store.active_emergency_stop(user.id)? else {
            return Ok(None);
        };
        self.store.mark_resumed(stop.id)?;
        stop.resumed = true;
        tracing::info!(user_id = user.id, stop_id = stop.id, "work resumed");
        Ok(Some(stop))
    }

    pub fn active_emergency_stop(&self, user: &User) -> Result<Option<EmergencyStop>> {
        self.store.active_emergency_stop(user.id)
    }

    pub fn penalty_status(&self, user: &User) -> Result<PenaltyStatus> {
        let subscription = self.store.subscription(user.id)?;
        let stop = self.store.active_emergency_stop(user.id)?;
        Ok(PenaltyStatus::evaluate(subscription.as_ref(), stop.as_ref()))
    }
}
