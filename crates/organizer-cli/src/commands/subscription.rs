//! Penalty subscription commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use organizer_core::ActivationRequest;

use super::{current_user, open_organizer, CommandResult};

#[derive(Subcommand)]
pub enum SubscriptionAction {
    /// Show subscription and current penalty
    Status,
    /// Activate (or reactivate) the subscription
    Activate {
        /// Penalty amount per missed task (default from config)
        #[arg(long)]
        penalty: Option<f64>,
        /// Accept the subscription terms
        #[arg(long)]
        accept_terms: bool,
        /// Confirm the contact email
        #[arg(long)]
        confirm_email: bool,
    },
    /// Deactivate the subscription
    Deactivate,
}

pub fn run(action: SubscriptionAction, user: Option<&str>) -> CommandResult {
    let organizer = open_organizer()?;
    let user = current_user(&organizer, user)?;

    match action {
        SubscriptionAction::Status => {
            let subscription = organizer.subscription_status(&user)?;
            let penalty = organizer.penalty_status(&user)?;
            let status = serde_json::json!({
                "subscription": subscription,
                "penalty": penalty,
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        SubscriptionAction::Activate {
            penalty,
            accept_terms,
            confirm_email,
        } => {
            let request = ActivationRequest {
                penalty,
                confirmed_terms: accept_terms,
                confirmed_email: confirm_email,
            };
            let subscription = organizer.activate_subscription(&user, &request, Utc::now())?;
            println!(
                "Subscription activated with penalty {:.2}",
                subscription.penalty_amount
            );
        }
        SubscriptionAction::Deactivate => match organizer.deactivate_subscription(&user, Utc::now())? {
            Some(_) => println!("Subscription deactivated"),
            None => println!("No active subscription"),
        },
    }
    Ok(())
}
