mod bounded_text;
mod church_name;
mod contact_email;
mod new_player;
mod new_team;
mod phone_number;
mod player_id;
mod team_id;

pub use bounded_text::BoundedText;
pub use church_name::ChurchName;
pub use contact_email::ContactEmail;
pub use new_player::NewPlayer;
pub use new_team::Contact;
pub use new_team::NewTeam;
pub use phone_number::PhoneNumber;
pub use player_id::PlayerId;
pub use team_id::TeamId;
