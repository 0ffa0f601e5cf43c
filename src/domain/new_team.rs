use super::BoundedText;
use super::ChurchName;
use super::ContactEmail;
use super::NewPlayer;
use super::PhoneNumber;

/// A single captain/vice-captain contact block.
pub struct Contact {
    pub name: BoundedText,
    pub phone: PhoneNumber,
    pub whatsapp: PhoneNumber,
    pub email: ContactEmail,
}

/// A fully validated submission, ready for the registration coordinator.
/// Constructing one (via `decode`) guarantees every invariant already holds:
/// 11–15 players, bounded field lengths, syntactically valid emails.
pub struct NewTeam {
    pub team_name: BoundedText,
    pub church_name: ChurchName,
    pub captain: Contact,
    pub vice_captain: Contact,
    pub players: Vec<NewPlayer>,
    pub has_pastor_letter: bool,
    pub has_payment_receipt: bool,
    pub has_group_photo: bool,
}
