use super::BoundedText;

/// A validated player within a submission, before a `PlayerId` has been
/// assigned (that requires the team's allocated `TeamId`, which doesn't
/// exist yet at decode time). `has_aadhar_file`/`has_subscription_file`
/// record whether an artifact was submitted for this player; the decoded
/// bytes live alongside in the sibling `Vec<ArtifactUpload>`, keyed by slot.
pub struct NewPlayer {
    pub name: BoundedText,
    pub role: Option<BoundedText>,
    pub has_aadhar_file: bool,
    pub has_subscription_file: bool,
}
