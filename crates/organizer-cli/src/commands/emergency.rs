use chrono::Utc;
use clap::Subcommand;

use super::{current_user, open_organizer, CommandResult};

#[derive(Subcommand)]
pub enum EmergencyAction {
    /// Show whether penalties are suspended
    Status,
    /// Suspend all penalties
    Stop {
        /// Why you need to stop
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Resume work and penalties
    Resume,
}

pub fn run(action: EmergencyAction, user: Option<&str>) -> CommandResult {
    let organizer = open_organizer()?;
    let user = current_user(&organizer, user)?;

    match action {
        EmergencyAction::Status => match organizer.active_emergency_stop(&user)? {
            Some(stop) => println!("{}", serde_json::to_string_pretty(&stop)?),
            None => println!("No emergency stop active"),
        },
        EmergencyAction::Stop { reason } => {
            let stop = organizer.emergency_stop(&user, &reason, Utc::now())?;
            println!("Emergency stop active since {}. Penalties suspended.", stop.stop_time);
        }
        EmergencyAction::Resume => match organizer.emergency_resume(&user)? {
            Some(_) => println!("Work resumed. Rebuild your schedule when ready."),
            None => println!("No emergency stop active"),
        },
    }
    Ok(())
}
