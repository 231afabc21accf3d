//! Integration tests for the add → clarify → rebuild workflow.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use organizer_core::{
    ComplexityTier, Config, Organizer, OrganizerDb, RebuildOutcome, ScheduleInterval, TaskStore,
    User,
};

fn local(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn setup() -> (Organizer<OrganizerDb>, User) {
    let organizer = Organizer::new(OrganizerDb::open_memory().unwrap(), Config::default());
    let created = Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0).unwrap();
    let user = organizer
        .register_user("lena", "lena@example.com", created)
        .unwrap();
    (organizer, user)
}

fn built(outcome: RebuildOutcome) -> Vec<ScheduleInterval> {
    match outcome {
        RebuildOutcome::Built(schedule) => schedule.intervals,
        RebuildOutcome::NothingToSchedule => panic!("expected a schedule"),
    }
}

#[test]
fn mixed_day_follows_tier_order() {
    let (organizer, user) = setup();
    let created = Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0).unwrap();
    let bread = organizer.add_task(&user, "купить хлеб", created).unwrap();
    let slides = organizer
        .add_task(&user, "слайды для встречи", created + chrono::Duration::seconds(1))
        .unwrap();
    let report = organizer
        .add_task(&user, "годовой отчёт", created + chrono::Duration::seconds(2))
        .unwrap();
    assert_eq!(slides.complexity, ComplexityTier::Medium);

    let intervals = built(organizer.rebuild_schedule(&user, local(7, 30)).unwrap());

    let expected = vec![
        ScheduleInterval::Work {
            task_id: report.id.clone(),
            desc: "годовой отчёт".into(),
            start: hm(9, 0),
            end: hm(9, 45),
        },
        ScheduleInterval::Break {
            start: hm(9, 45),
            end: hm(9, 50),
        },
        ScheduleInterval::Work {
            task_id: report.id.clone(),
            desc: "годовой отчёт".into(),
            start: hm(9, 50),
            end: hm(10, 35),
        },
        ScheduleInterval::Work {
            task_id: slides.id.clone(),
            desc: "слайды для встречи".into(),
            start: hm(10, 45),
            end: hm(11, 30),
        },
        ScheduleInterval::Work {
            task_id: bread.id.clone(),
            desc: "купить хлеб".into(),
            start: hm(11, 40),
            end: hm(11, 55),
        },
    ];
    assert_eq!(intervals, expected);

    let stored = organizer.store().get_task(&report.id).unwrap().unwrap();
    assert_eq!(stored.estimated_minutes, Some(90));
    let stored = organizer.store().get_task(&bread.id).unwrap().unwrap();
    assert_eq!(stored.estimated_minutes, Some(15));
}

#[test]
fn afternoon_rebuild_starts_after_lead_time() {
    let (organizer, user) = setup();
    organizer
        .add_task(&user, "позвонить бабушке", Utc::now())
        .unwrap();

    let intervals = built(organizer.rebuild_schedule(&user, local(14, 10)).unwrap());
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].start(), hm(14, 15));
    assert_eq!(intervals[0].end(), hm(14, 30));
}

#[test]
fn rebuild_replaces_the_days_schedule() {
    let (organizer, user) = setup();
    let task = organizer.add_task(&user, "купить хлеб", Utc::now()).unwrap();

    built(organizer.rebuild_schedule(&user, local(10, 0)).unwrap());
    organizer.complete_task(&user, &task.id).unwrap();
    organizer
        .add_task(&user, "дипломный проект", Utc::now())
        .unwrap();
    let second = built(organizer.rebuild_schedule(&user, local(12, 0)).unwrap());

    let stored = organizer
        .schedule_for(&user, local(12, 0).date())
        .unwrap()
        .unwrap();
    assert_eq!(stored.intervals, second);
    assert!(stored
        .intervals
        .iter()
        .all(|i| i.task_id() != Some(task.id.as_str())));

    let rows: i64 = organizer
        .store()
        .conn()
        .query_row("SELECT COUNT(*) FROM schedules", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn clarified_task_is_scheduled_with_new_tier() {
    let (organizer, user) = setup();
    let task = organizer
        .add_task(&user, "разобраться с бумагами на столе", Utc::now())
        .unwrap();
    assert!(task.clarification_asked);
    organizer.clarify(&user, &task.id, "whatever").unwrap();

    let intervals = built(organizer.rebuild_schedule(&user, local(8, 0)).unwrap());
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].duration_minutes(), 15);
}

#[test]
fn finished_tasks_leave_nothing_to_schedule() {
    let (organizer, user) = setup();
    let task = organizer.add_task(&user, "купить хлеб", Utc::now()).unwrap();
    organizer.cancel_task(&user, &task.id).unwrap();

    assert_eq!(
        organizer.rebuild_schedule(&user, local(10, 0)).unwrap(),
        RebuildOutcome::NothingToSchedule
    );
}

#[test]
fn stored_plan_uses_hh_mm_shape() {
    let (organizer, user) = setup();
    organizer.add_task(&user, "купить хлеб", Utc::now()).unwrap();
    built(organizer.rebuild_schedule(&user, local(14, 10)).unwrap());

    let plan_json: String = organizer
        .store()
        .conn()
        .query_row("SELECT plan_json FROM schedules", [], |r| r.get(0))
        .unwrap();
    let plan: serde_json::Value = serde_json::from_str(&plan_json).unwrap();
    assert_eq!(plan[0]["type"], "work");
    assert_eq!(plan[0]["desc"], "купить хлеб");
    assert_eq!(plan[0]["start"], "14:15");
    assert_eq!(plan[0]["end"], "14:30");
}

#[test]
fn late_rebuild_is_stored_under_its_own_date() {
    let (organizer, user) = setup();
    let created = Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0).unwrap();
    let report = organizer.add_task(&user, "годовой отчёт", created).unwrap();

    let now = NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_hms_opt(23, 50, 30)
        .unwrap();
    let intervals = built(organizer.rebuild_schedule(&user, now).unwrap());
    assert_eq!(intervals.first().map(ScheduleInterval::start), Some(hm(23, 55)));
    assert_eq!(intervals.last().map(ScheduleInterval::end), Some(hm(1, 30)));
    assert_eq!(intervals[0].task_id(), Some(report.id.as_str()));

    let stored = organizer
        .schedule_for(&user, now.date())
        .unwrap()
        .expect("schedule stored under the rebuild date");
    assert_eq!(stored.date, now.date());
    assert_eq!(stored.intervals, intervals);

    let next_day = now.date().succ_opt().unwrap();
    assert!(organizer.schedule_for(&user, next_day).unwrap().is_none());
}
