//! User accounts and the incentive features attached to them.
//!
//! A subscription carries a penalty amount the user agrees to "pay" for
//! missed tasks. An emergency stop suspends penalties until the user resumes.
//! Nothing here ever moves money; [`PenaltyStatus`] only reports what would
//! apply.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Free-text reason the user keeps going
    pub motivation: String,
    pub created_at: DateTime<Utc>,
}

/// Penalty subscription. At most one record per user; reactivation reuses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: i64,
    pub active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub penalty_amount: f64,
    pub confirmed_terms: bool,
    pub confirmed_email: bool,
}

impl Subscription {
    /// Start (or restart) the subscription at `now`.
    pub fn activate(&mut self, penalty_amount: f64, now: DateTime<Utc>) {
        self.active = true;
        self.start_date = Some(now);
        self.end_date = None;
        self.penalty_amount = penalty_amount;
        self.confirmed_terms = true;
        self.confirmed_email = true;
    }

    /// Stop the subscription at `now`. Returns false if it was not active.
    pub fn deactivate(&mut self, now: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.end_date = Some(now);
        true
    }
}

/// A request to pause all penalties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyStop {
    pub id: i64,
    pub user_id: i64,
    pub stop_time: DateTime<Utc>,
    pub reason: String,
    pub resumed: bool,
}

/// What penalty would currently apply to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyStatus {
    pub subscription_active: bool,
    pub penalty_amount: f64,
    pub penalties_suspended: bool,
    pub effective_penalty: f64,
}

impl PenaltyStatus {
    pub fn evaluate(subscription: Option<&Subscription>, active_stop: Option<&EmergencyStop>) -> Self {
        let subscription_active = subscription.is_some_and(|s| s.active);
        let penalty_amount = subscription
            .filter(|s| s.active)
            .map_or(0.0, |s| s.penalty_amount);
        let penalties_suspended = active_stop.is_some_and(|s| !s.resumed);
        let effective_penalty = if subscription_active && !penalties_suspended {
            penalty_amount
        } else {
            0.0
        };

        Self {
            subscription_active,
            penalty_amount,
            penalties_suspended,
            effective_penalty,
        }
    }
}
