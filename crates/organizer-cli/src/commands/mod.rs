pub mod config;
pub mod emergency;
pub mod schedule;
pub mod subscription;
pub mod task;
pub mod user;

use organizer_core::{Config, Organizer, OrganizerDb, User};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open the on-disk store with the saved configuration.
pub fn open_organizer() -> Result<Organizer<OrganizerDb>, Box<dyn std::error::Error>> {
    let db = OrganizerDb::open()?;
    Ok(Organizer::new(db, Config::load_or_default()))
}

/// Resolve the `--user` flag to a stored user.
pub fn current_user(
    organizer: &Organizer<OrganizerDb>,
    user: Option<&str>,
) -> Result<User, Box<dyn std::error::Error>> {
    let name = user.ok_or("no user selected: pass --user or set ORGANIZER_USER")?;
    Ok(organizer.user(name)?)
}
