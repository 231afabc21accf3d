//! Task management commands for CLI.

use chrono::Utc;
use clap::{Subcommand, ValueEnum};

use super::{current_user, open_organizer, CommandResult};

/// Answer to a clarification prompt.
#[derive(Clone, Copy, ValueEnum)]
pub enum Answer {
    /// Needs deep focus
    Deep,
    /// Quick and simple
    Simple,
}

impl Answer {
    fn as_str(self) -> &'static str {
        match self {
            Answer::Deep => "deep",
            Answer::Simple => "simple",
        }
    }
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task; complexity is estimated from the description
    Add {
        /// Task description
        description: String,
    },
    /// List all tasks, newest first
    List {
        /// Only show pending tasks
        #[arg(long)]
        pending: bool,
    },
    /// Answer a clarification prompt
    Clarify {
        /// Task ID
        id: String,
        answer: Answer,
    },
    /// Mark a task completed
    Complete {
        /// Task ID
        id: String,
    },
    /// Cancel a task
    Cancel {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction, user: Option<&str>) -> CommandResult {
    let organizer = open_organizer()?;
    let user = current_user(&organizer, user)?;

    match action {
        TaskAction::Add { description } => {
            let task = organizer.add_task(&user, &description, Utc::now())?;
            if task.clarification_asked {
                eprintln!("Complexity unclear: run `task clarify {} deep|simple`", task.id);
            }
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { pending } => {
            let tasks: Vec<_> = organizer
                .list_tasks(&user)?
                .into_iter()
                .filter(|t| !pending || t.is_pending())
                .collect();
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Clarify { id, answer } => {
            let task = organizer.clarify(&user, &id, answer.as_str())?;
            println!("Complexity set to {}", task.complexity);
        }
        TaskAction::Complete { id } => {
            organizer.complete_task(&user, &id)?;
            println!("Task completed: {id}");
        }
        TaskAction::Cancel { id } => {
            organizer.cancel_task(&user, &id)?;
            println!("Task cancelled: {id}");
        }
    }
    Ok(())
}
