mod churches;
mod players;
mod teams;

pub use churches::churches_availability;
pub use players::get_player;
pub use teams::confirm_team;
pub use teams::get_team;
pub use teams::list_teams;
pub use teams::reject_team;
