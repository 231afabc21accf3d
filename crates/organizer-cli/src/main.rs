use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "organizer-cli", version, about = "Forest organizer CLI")]
struct Cli {
    /// Acting user
    #[arg(long, global = true, env = "ORGANIZER_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User accounts and motivation
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Daily schedule
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Penalty subscription
    Subscription {
        #[command(subcommand)]
        action: commands::subscription::SubscriptionAction,
    },
    /// Emergency stop for penalties
    Emergency {
        #[command(subcommand)]
        action: commands::emergency::EmergencyAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::User { .. } => "user",
            Commands::Task { .. } => "task",
            Commands::Schedule { .. } => "schedule",
            Commands::Subscription { .. } => "subscription",
            Commands::Emergency { .. } => "emergency",
            Commands::Config { .. } => "config",
            Commands::Completions { .. } => "completions",
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("ORGANIZER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let user = cli.user;
    tracing::debug!(command = cli.command.name(), user = ?user, "dispatching command");

    let result = match cli.command {
        Commands::User { action } => commands::user::run(action, user.as_deref()),
        Commands::Task { action } => commands::task::run(action, user.as_deref()),
        Commands::Schedule { action } => commands::schedule::run(action, user.as_deref()),
        Commands::Subscription { action } => commands::subscription::run(action, user.as_deref()),
        Commands::Emergency { action } => commands::emergency::run(action, user.as_deref()),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "organizer-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
