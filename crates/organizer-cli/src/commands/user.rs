//! User account commands for CLI.

use chrono::Utc;
use clap::Subcommand;

use super::{current_user, open_organizer, CommandResult};

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a new user
    Register {
        /// Unique user name
        username: String,
        /// Contact email
        email: String,
    },
    /// Show the current user's dashboard
    Show,
    /// Set the current user's motivation text
    Motivation {
        /// Why you keep going
        text: String,
    },
}

pub fn run(action: UserAction, user: Option<&str>) -> CommandResult {
    let organizer = open_organizer()?;

    match action {
        UserAction::Register { username, email } => {
            let created = organizer.register_user(&username, &email, Utc::now())?;
            println!("User registered: {}", created.username);
        }
        UserAction::Show => {
            let user = current_user(&organizer, user)?;
            let dashboard = organizer.dashboard(&user)?;
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
        UserAction::Motivation { text } => {
            let user = current_user(&organizer, user)?;
            organizer.set_motivation(&user, &text)?;
            println!("Motivation saved");
        }
    }
    Ok(())
}
