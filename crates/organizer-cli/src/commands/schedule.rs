use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Subcommand;
use organizer_core::RebuildOutcome;

use super::{current_user, open_organizer, CommandResult};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Rebuild today's schedule from pending tasks
    Rebuild {
        /// Local time to plan from, e.g. 2026-03-02T07:30:00 (default: now)
        #[arg(long)]
        at: Option<NaiveDateTime>,
    },
    /// Show a stored schedule
    Show {
        /// Day to show, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(action: ScheduleAction, user: Option<&str>) -> CommandResult {
    let organizer = open_organizer()?;
    let user = current_user(&organizer, user)?;

    match action {
        ScheduleAction::Rebuild { at } => {
            let now = at.unwrap_or_else(|| Local::now().naive_local());
            match organizer.rebuild_schedule(&user, now)? {
                RebuildOutcome::Built(schedule) => {
                    println!("{}", serde_json::to_string_pretty(&schedule.intervals)?);
                }
                RebuildOutcome::NothingToSchedule => println!("No tasks to schedule"),
            }
        }
        ScheduleAction::Show { date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            match organizer.schedule_for(&user, date)? {
                Some(schedule) => println!("{}", serde_json::to_string_pretty(&schedule.intervals)?),
                None => println!("No schedule for {date}: run `schedule rebuild`"),
            }
        }
    }
    Ok(())
}
