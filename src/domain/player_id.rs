use std::fmt;

use super::TeamId;

/// `<teamId>-P<NN>`, derived from the team id and the player's 1-based
/// position within the submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(
        team_id: &TeamId,
        position: u8,
    ) -> Self {
        Self(format!("{team_id}-P{position:02}"))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PlayerId {
    fn as_ref(&self) -> &str { &self.0 }
}

impl From<PlayerId> for String {
    fn from(value: PlayerId) -> Self { value.0 }
}
