//! Day schedule builder.
//!
//! Turns a snapshot of a user's tasks into a flat list of work and break
//! intervals for a single day:
//! - Estimates each pending task's duration from its complexity tier
//! - Orders tasks high → medium → low, keeping input order within a tier
//! - Anchors the day at 09:00, or a few minutes after `now` if later
//! - Splits each task into capped work sessions separated by short breaks,
//!   leaving a silent gap between tasks

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::ValidationError;
use crate::schedule::ScheduleInterval;
use crate::task::{ComplexityTier, Task};

/// Upper bound for a tier estimate (one working day).
pub const MAX_ESTIMATE_MINUTES: u32 = 8 * 60;
/// Upper bound for a single work session.
pub const MAX_SESSION_MINUTES: u32 = 4 * 60;
/// Upper bound for breaks, gaps and the start lead.
pub const MAX_PAUSE_MINUTES: u32 = 2 * 60;

/// Scheduler configuration. All durations are in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Estimate for high-complexity tasks
    #[serde(default = "default_high_minutes")]
    pub high_minutes: u32,
    /// Estimate for medium-complexity tasks
    #[serde(default = "default_medium_minutes")]
    pub medium_minutes: u32,
    /// Estimate for low-complexity tasks
    #[serde(default = "default_low_minutes")]
    pub low_minutes: u32,
    /// Longest single work session for low-complexity tasks
    #[serde(default = "default_low_session_cap")]
    pub low_session_cap: u32,
    /// Longest single work session for everything else
    #[serde(default = "default_session_cap")]
    pub session_cap: u32,
    /// Break between sessions of the same task
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
    /// Idle time between two different tasks
    #[serde(default = "default_task_gap_minutes")]
    pub task_gap_minutes: u32,
    /// The day never starts before this hour
    #[serde(default = "default_day_start_hour")]
    pub day_start_hour: u32,
    /// Lead time added to `now` when the day has already started
    #[serde(default = "default_start_lead_minutes")]
    pub start_lead_minutes: u32,
}

fn default_high_minutes() -> u32 {
    90
}
fn default_medium_minutes() -> u32 {
    45
}
fn default_low_minutes() -> u32 {
    15
}
fn default_low_session_cap() -> u32 {
    25
}
fn default_session_cap() -> u32 {
    45
}
fn default_break_minutes() -> u32 {
    5
}
fn default_task_gap_minutes() -> u32 {
    10
}
fn default_day_start_hour() -> u32 {
    9
}
fn default_start_lead_minutes() -> u32 {
    5
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            high_minutes: default_high_minutes(),
            medium_minutes: default_medium_minutes(),
            low_minutes: default_low_minutes(),
            low_session_cap: default_low_session_cap(),
            session_cap: default_session_cap(),
            break_minutes: default_break_minutes(),
            task_gap_minutes: default_task_gap_minutes(),
            day_start_hour: default_day_start_hour(),
            start_lead_minutes: default_start_lead_minutes(),
        }
    }
}

impl SchedulerConfig {
    /// Estimated total work for a tier.
    pub fn estimate_minutes(&self, tier: ComplexityTier) -> u32 {
        match tier {
            ComplexityTier::High => self.high_minutes,
            ComplexityTier::Medium => self.medium_minutes,
            ComplexityTier::Low => self.low_minutes,
        }
    }

    /// Longest single work session for a tier. Never below one minute.
    pub fn session_cap_for(&self, tier: ComplexityTier) -> u32 {
        let cap = match tier {
            ComplexityTier::Low => self.low_session_cap,
            ComplexityTier::Medium | ComplexityTier::High => self.session_cap,
        };
        cap.max(1)
    }

    /// Check every field against its allowed range.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidValue`] naming the first field out of range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let checks: [(&str, u32, RangeInclusive<u32>); 9] = [
            ("high_minutes", self.high_minutes, 1..=MAX_ESTIMATE_MINUTES),
            ("medium_minutes", self.medium_minutes, 1..=MAX_ESTIMATE_MINUTES),
            ("low_minutes", self.low_minutes, 1..=MAX_ESTIMATE_MINUTES),
            ("low_session_cap", self.low_session_cap, 1..=MAX_SESSION_MINUTES),
            ("session_cap", self.session_cap, 1..=MAX_SESSION_MINUTES),
            ("break_minutes", self.break_minutes, 0..=MAX_PAUSE_MINUTES),
            ("task_gap_minutes", self.task_gap_minutes, 0..=MAX_PAUSE_MINUTES),
            ("day_start_hour", self.day_start_hour, 0..=23),
            ("start_lead_minutes", self.start_lead_minutes, 0..=MAX_PAUSE_MINUTES),
        ];
        for (field, value, range) in checks {
            if !range.contains(&value) {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: format!(
                        "{value} is outside {}..={}",
                        range.start(),
                        range.end()
                    ),
                });
            }
        }
        Ok(())
    }

    fn day_start(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.day_start_hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN)
    }
}

/// Builds a day's interval list from pending tasks.
#[derive(Debug, Clone, Default)]
pub struct ScheduleBuilder {
    config: SchedulerConfig,
}

impl ScheduleBuilder {
    /// Create a builder with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Build the schedule for the day containing `now` (local wall-clock time).
    ///
    /// Only pending tasks are considered. Each one gets its `estimated_minutes`
    /// overwritten from its tier before carving.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyCollection`] when no task is pending.
    pub fn build_schedule(
        &self,
        tasks: &mut [Task],
        now: NaiveDateTime,
    ) -> Result<Vec<ScheduleInterval>, ValidationError> {
        let mut pending: Vec<&mut Task> = tasks.iter_mut().filter(|t| t.is_pending()).collect();
        if pending.is_empty() {
            return Err(ValidationError::EmptyCollection("pending tasks".into()));
        }

        for task in pending.iter_mut() {
            task.estimated_minutes = Some(self.config.estimate_minutes(task.complexity));
        }

        // sort_by_key is stable, so input order survives within a tier
        pending.sort_by_key(|t| {
            (
                t.complexity != ComplexityTier::High,
                t.complexity != ComplexityTier::Medium,
            )
        });

        let mut cursor = self.start_anchor(now);
        let mut intervals = Vec::new();
        let last = pending.len() - 1;

        for (index, task) in pending.iter().enumerate() {
            let cap = self.config.session_cap_for(task.complexity);
            let mut remaining = self.config.estimate_minutes(task.complexity);

            while remaining > 0 {
                let session = cap.min(remaining);
                let end = cursor + Duration::minutes(session.into());
                intervals.push(ScheduleInterval::Work {
                    task_id: task.id.clone(),
                    desc: task.description.clone(),
                    start: cursor.time(),
                    end: end.time(),
                });
                remaining -= session;
                cursor = end;

                if remaining > 0 {
                    let break_end = cursor + Duration::minutes(self.config.break_minutes.into());
                    intervals.push(ScheduleInterval::Break {
                        start: cursor.time(),
                        end: break_end.time(),
                    });
                    cursor = break_end;
                }
            }

            if index != last {
                cursor += Duration::minutes(self.config.task_gap_minutes.into());
            }
        }

        tracing::debug!(
            tasks = pending.len(),
            intervals = intervals.len(),
            "built day schedule"
        );
        Ok(intervals)
    }

    /// First minute of the schedule: the day-start hour if `now` is earlier,
    /// otherwise `now` plus the lead time. Seconds are dropped.
    pub fn start_anchor(&self, now: NaiveDateTime) -> NaiveDateTime {
        if now.hour() < self.config.day_start_hour {
            now.date().and_time(self.config.day_start())
        } else {
            truncate_to_minute(now) + Duration::minutes(self.config.start_lead_minutes.into())
        }
    }
}

fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.date()
        .and_hms_opt(t.hour(), t.minute(), 0)
        .unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use chrono::{NaiveDate, Utc};
    use proptest::prelude::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn make_task(id: &str, tier: ComplexityTier) -> Task {
        let mut task = Task::new(1, format!("Task {id}"), tier, Utc::now());
        task.id = id.to_string();
        task
    }

    fn work_order(intervals: &[ScheduleInterval]) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        for id in intervals.iter().filter_map(ScheduleInterval::task_id) {
            if order.last().map(String::as_str) != Some(id) {
                order.push(id.to_string());
            }
        }
        order
    }

    #[test]
    fn empty_input_is_rejected() {
        let builder = ScheduleBuilder::new();
        let err = builder.build_schedule(&mut [], at(10, 0)).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyCollection(_)));
    }

    #[test]
    fn only_finished_tasks_is_empty_input() {
        let mut done = make_task("done", ComplexityTier::High);
        done.status = TaskStatus::Completed;
        let mut gone = make_task("gone", ComplexityTier::Low);
        gone.status = TaskStatus::Cancelled;

        let result = ScheduleBuilder::new().build_schedule(&mut [done, gone], at(10, 0));
        assert!(result.is_err());
    }

    #[test]
    fn early_morning_anchors_at_nine() {
        let builder = ScheduleBuilder::new();
        assert_eq!(builder.start_anchor(at(7, 30)), at(9, 0));
        assert_eq!(builder.start_anchor(at(0, 0)), at(9, 0));
    }

    #[test]
    fn daytime_anchors_five_minutes_out() {
        let builder = ScheduleBuilder::new();
        assert_eq!(builder.start_anchor(at(14, 10)), at(14, 15));
        assert_eq!(builder.start_anchor(at(9, 0)), at(9, 5));
    }

    #[test]
    fn anchor_drops_seconds() {
        let now = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_milli_opt(14, 10, 59, 500)
            .unwrap();
        assert_eq!(ScheduleBuilder::new().start_anchor(now), at(14, 15));
    }

    #[test]
    fn single_low_task_is_one_session() {
        let mut tasks = vec![make_task("bread", ComplexityTier::Low)];
        let intervals = ScheduleBuilder::new()
            .build_schedule(&mut tasks, at(14, 10))
            .unwrap();

        assert_eq!(
            intervals,
            vec![ScheduleInterval::Work {
                task_id: "bread".into(),
                desc: "Task bread".into(),
                start: hm(14, 15),
                end: hm(14, 30),
            }]
        );
        assert_eq!(tasks[0].estimated_minutes, Some(15));
    }

    #[test]
    fn lone_high_task_splits_around_one_break() {
        let mut tasks = vec![make_task("thesis", ComplexityTier::High)];
        let intervals = ScheduleBuilder::new()
            .build_schedule(&mut tasks, at(7, 30))
            .unwrap();

        let spans: Vec<(bool, NaiveTime, NaiveTime)> = intervals
            .iter()
            .map(|i| (i.is_work(), i.start(), i.end()))
            .collect();
        assert_eq!(
            spans,
            vec![
                (true, hm(9, 0), hm(9, 45)),
                (false, hm(9, 45), hm(9, 50)),
                (true, hm(9, 50), hm(10, 35)),
            ]
        );
    }

    #[test]
    fn tasks_are_ordered_by_tier() {
        let mut tasks = vec![
            make_task("T2", ComplexityTier::Low),
            make_task("T3", ComplexityTier::Medium),
            make_task("T1", ComplexityTier::High),
        ];
        let intervals = ScheduleBuilder::new()
            .build_schedule(&mut tasks, at(10, 0))
            .unwrap();
        assert_eq!(work_order(&intervals), vec!["T1", "T3", "T2"]);
    }

    #[test]
    fn gap_separates_tasks_but_is_not_emitted() {
        let mut tasks = vec![
            make_task("a", ComplexityTier::Medium),
            make_task("b", ComplexityTier::Low),
        ];
        let intervals = ScheduleBuilder::new()
            .build_schedule(&mut tasks, at(7, 0))
            .unwrap();

        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].end(), hm(9, 45));
        assert_eq!(intervals[1].start(), hm(9, 55));
        assert!(intervals.iter().all(ScheduleInterval::is_work));
    }

    #[test]
    fn estimates_are_overwritten_on_every_build() {
        let mut task = make_task("a", ComplexityTier::Medium);
        task.estimated_minutes = Some(500);
        let mut tasks = vec![task];
        ScheduleBuilder::new()
            .build_schedule(&mut tasks, at(10, 0))
            .unwrap();
        assert_eq!(tasks[0].estimated_minutes, Some(45));
    }

    #[test]
    fn finished_tasks_keep_their_estimate() {
        let mut done = make_task("done", ComplexityTier::High);
        done.status = TaskStatus::Completed;
        done.estimated_minutes = Some(7);
        let mut tasks = vec![done, make_task("open", ComplexityTier::Low)];

        let intervals = ScheduleBuilder::new()
            .build_schedule(&mut tasks, at(10, 0))
            .unwrap();
        assert_eq!(tasks[0].estimated_minutes, Some(7));
        assert_eq!(work_order(&intervals), vec!["open"]);
    }

    #[test]
    fn custom_config_changes_session_shape() {
        let builder = ScheduleBuilder::with_config(SchedulerConfig {
            low_minutes: 60,
            low_session_cap: 25,
            break_minutes: 10,
            ..SchedulerConfig::default()
        });
        let mut tasks = vec![make_task("a", ComplexityTier::Low)];
        let intervals = builder.build_schedule(&mut tasks, at(7, 0)).unwrap();

        let lengths: Vec<i64> = intervals.iter().map(|i| i.duration_minutes()).collect();
        assert_eq!(lengths, vec![25, 10, 25, 10, 10]);
    }

    #[test]
    fn zero_cap_is_clamped_to_one_minute() {
        let builder = ScheduleBuilder::with_config(SchedulerConfig {
            low_minutes: 2,
            low_session_cap: 0,
            ..SchedulerConfig::default()
        });
        let mut tasks = vec![make_task("a", ComplexityTier::Low)];
        let intervals = builder.build_schedule(&mut tasks, at(7, 0)).unwrap();
        assert_eq!(intervals.iter().filter(|i| i.is_work()).count(), 2);
    }

    #[test]
    fn late_evening_schedule_wraps_past_midnight() {
        let now = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(23, 50, 30)
            .unwrap();
        let mut tasks = vec![
            make_task("a", ComplexityTier::High),
            make_task("b", ComplexityTier::Low),
        ];
        let intervals = ScheduleBuilder::new().build_schedule(&mut tasks, now).unwrap();

        let spans: Vec<(Option<&str>, NaiveTime, NaiveTime)> = intervals
            .iter()
            .map(|i| (i.task_id(), i.start(), i.end()))
            .collect();
        assert_eq!(
            spans,
            vec![
                (Some("a"), hm(23, 55), hm(0, 40)),
                (None, hm(0, 40), hm(0, 45)),
                (Some("a"), hm(0, 45), hm(1, 30)),
                (Some("b"), hm(1, 40), hm(1, 55)),
            ]
        );
        assert_eq!(intervals[0].duration_minutes(), 45);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SchedulerConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_fields() {
        let huge_estimate = SchedulerConfig {
            high_minutes: 3_000_000,
            ..SchedulerConfig::default()
        };
        assert!(matches!(
            huge_estimate.validate(),
            Err(ValidationError::InvalidValue { field, .. }) if field == "high_minutes"
        ));

        let late_start = SchedulerConfig {
            day_start_hour: 24,
            ..SchedulerConfig::default()
        };
        assert!(late_start.validate().is_err());

        let zero_cap = SchedulerConfig {
            session_cap: 0,
            ..SchedulerConfig::default()
        };
        assert!(zero_cap.validate().is_err());

        let no_break = SchedulerConfig {
            break_minutes: 0,
            ..SchedulerConfig::default()
        };
        assert!(no_break.validate().is_ok());
    }

    fn tier_strategy() -> impl Strategy<Value = ComplexityTier> {
        prop_oneof![
            Just(ComplexityTier::Low),
            Just(ComplexityTier::Medium),
            Just(ComplexityTier::High),
        ]
    }

    proptest! {
        // Anchors before 09:00 and at most 8 tasks keep the day well before midnight.
        #[test]
        fn schedule_invariants_hold(
            tiers in proptest::collection::vec(tier_strategy(), 1..8),
            hour in 0u32..9,
            minute in 0u32..60,
        ) {
            let config = SchedulerConfig::default();
            let mut tasks: Vec<Task> = tiers
                .iter()
                .enumerate()
                .map(|(i, tier)| make_task(&format!("t{i}"), *tier))
                .collect();
            let intervals = ScheduleBuilder::new()
                .build_schedule(&mut tasks, at(hour, minute))
                .unwrap();

            prop_assert!(!intervals.is_empty());
            for pair in intervals.windows(2) {
                prop_assert!(pair[0].start() <= pair[1].start());
                prop_assert!(pair[0].end() <= pair[1].start());
            }

            for task in &tasks {
                let cap = i64::from(config.session_cap_for(task.complexity));
                let sessions: Vec<i64> = intervals
                    .iter()
                    .filter(|i| i.task_id() == Some(task.id.as_str()))
                    .map(ScheduleInterval::duration_minutes)
                    .collect();
                prop_assert!(sessions.iter().all(|m| *m >= 1 && *m <= cap));
                prop_assert_eq!(
                    sessions.iter().sum::<i64>(),
                    i64::from(config.estimate_minutes(task.complexity))
                );
                prop_assert_eq!(
                    task.estimated_minutes,
                    Some(config.estimate_minutes(task.complexity))
                );
            }

            for interval in intervals.iter().filter(|i| !i.is_work()) {
                prop_assert_eq!(interval.duration_minutes(), 5);
            }
        }

        #[test]
        fn order_is_tiered_and_stable(
            tiers in proptest::collection::vec(tier_strategy(), 1..8),
        ) {
            let mut tasks: Vec<Task> = tiers
                .iter()
                .enumerate()
                .map(|(i, tier)| make_task(&format!("t{i}"), *tier))
                .collect();
            let intervals = ScheduleBuilder::new()
                .build_schedule(&mut tasks, at(8, 0))
                .unwrap();

            let rank = |tier: ComplexityTier| match tier {
                ComplexityTier::High => 0,
                ComplexityTier::Medium => 1,
                ComplexityTier::Low => 2,
            };
            let mut expected: Vec<(usize, String)> = tiers
                .iter()
                .enumerate()
                .map(|(i, tier)| (rank(*tier), format!("t{i}")))
                .collect();
            expected.sort_by_key(|(r, _)| *r);
            let expected: Vec<String> = expected.into_iter().map(|(_, id)| id).collect();

            prop_assert_eq!(work_order(&intervals), expected);
        }
    }
}
