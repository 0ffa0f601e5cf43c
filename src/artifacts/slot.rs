use std::fmt;

use super::ArtifactMime;
use crate::domain::TeamId;

/// The named position an artifact occupies in a submission. Player-scoped
/// slots carry the player's 1-based position so the object key
/// stays stable across re-uploads of the same submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    PastorLetter,
    PaymentReceipt,
    GroupPhoto,
    PlayerAadhar(u8),
    PlayerSubscription(u8),
}

impl Slot {
    /// MIME types legal for this slot.
    pub fn allowed_mimes(&self) -> &'static [ArtifactMime] {
        use ArtifactMime::*;
        match self {
            Self::PastorLetter | Self::PaymentReceipt => {
                &[Jpeg, Png, Gif, WebP, Jxl, Pdf]
            }
            Self::GroupPhoto => &[Jpeg, Png],
            Self::PlayerAadhar(_) | Self::PlayerSubscription(_) => &[Pdf],
        }
    }

    /// The stable key component used for object-store paths.
    pub fn key(&self) -> String {
        match self {
            Self::PastorLetter => "pastor_letter".to_string(),
            Self::PaymentReceipt => "payment_receipt".to_string(),
            Self::GroupPhoto => "group_photo".to_string(),
            Self::PlayerAadhar(pos) => format!("P{pos:02}_aadhar"),
            Self::PlayerSubscription(pos) => format!("P{pos:02}_subscription"),
        }
    }

    /// Full object path under a namespace (`pending`/`confirmed`/`rejected`).
    pub fn object_path(
        &self,
        namespace: &str,
        team_id: &TeamId,
        mime: ArtifactMime,
    ) -> String {
        match self {
            Self::PastorLetter | Self::PaymentReceipt | Self::GroupPhoto => format!(
                "{namespace}/{team_id}/{}.{}",
                self.key(),
                mime.extension()
            ),
            Self::PlayerAadhar(_) | Self::PlayerSubscription(_) => format!(
                "{namespace}/{team_id}/{team_id}-{}.{}",
                self.key(),
                mime.extension()
            ),
        }
    }

    /// The field path reported in validation errors.
    pub fn field_path(&self) -> String {
        match self {
            Self::PastorLetter => "pastorLetter".to_string(),
            Self::PaymentReceipt => "paymentReceipt".to_string(),
            Self::GroupPhoto => "groupPhoto".to_string(),
            Self::PlayerAadhar(pos) => format!("players[{}].aadharFile", pos - 1),
            Self::PlayerSubscription(pos) => format!("players[{}].subscriptionFile", pos - 1),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::Slot;
    use crate::artifacts::ArtifactMime;
    use crate::domain::TeamId;

    #[test]
    fn team_level_object_path() {
        let team_id = TeamId::new("ICCT", 1);
        let path = Slot::PastorLetter.object_path("pending", &team_id, ArtifactMime::Pdf);
        assert_eq!(path, "pending/ICCT-001/pastor_letter.pdf");
    }

    #[test]
    fn player_level_object_path_embeds_position() {
        let team_id = TeamId::new("ICCT", 1);
        let path = Slot::PlayerAadhar(3).object_path("pending", &team_id, ArtifactMime::Pdf);
        assert_eq!(path, "pending/ICCT-001/ICCT-001-P03_aadhar.pdf");
    }

    #[test]
    fn group_photo_disallows_pdf() {
        assert!(!Slot::GroupPhoto.allowed_mimes().contains(&ArtifactMime::Pdf));
    }
}
