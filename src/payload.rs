//! Parses and validates a registration submission, decoding embedded
//! artifacts along the way. Pure, in-memory; no I/O beyond the input buffer.

use serde::Deserialize;

use crate::artifacts::decode_artifact;
use crate::artifacts::ArtifactUpload;
use crate::artifacts::Slot;
use crate::domain::BoundedText;
use crate::domain::ChurchName;
use crate::domain::ContactEmail;
use crate::domain::Contact;
use crate::domain::NewPlayer;
use crate::domain::NewTeam;
use crate::domain::PhoneNumber;

pub const MIN_PLAYERS: usize = 11;
pub const MAX_PLAYERS: usize = 15;

/// A single validation failure, carrying the dotted field path the error
/// envelope reports to the caller.
#[derive(Debug, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContact {
    #[serde(alias = "name")]
    name: String,
    #[serde(alias = "phone")]
    phone: String,
    #[serde(alias = "whatsapp")]
    whatsapp: String,
    #[serde(alias = "email")]
    email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayer {
    name: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default, alias = "aadhar_file")]
    aadhar_file: Option<String>,
    #[serde(default, alias = "subscription_file")]
    subscription_file: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubmission {
    #[serde(alias = "church_name")]
    church_name: String,
    #[serde(alias = "team_name")]
    team_name: String,
    captain: RawContact,
    #[serde(alias = "vice_captain")]
    vice_captain: RawContact,
    players: Vec<RawPlayer>,
    #[serde(default, alias = "pastor_letter")]
    pastor_letter: Option<String>,
    #[serde(default, alias = "payment_receipt")]
    payment_receipt: Option<String>,
    #[serde(default, alias = "group_photo")]
    group_photo: Option<String>,
}

/// Decode and validate a submission. On success, returns the validated team
/// plus every decoded artifact.
pub fn decode(raw: RawSubmission) -> Result<(NewTeam, Vec<ArtifactUpload>), ValidationError> {
    let team_name = BoundedText::parse(raw.team_name, 1, 200)
        .map_err(|e| ValidationError::new("teamName", e))?;
    let church_name =
        ChurchName::parse(raw.church_name).map_err(|e| ValidationError::new("churchName", e))?;

    let captain = parse_contact("captain", raw.captain)?;
    let vice_captain = parse_contact("viceCaptain", raw.vice_captain)?;

    if raw.players.len() < MIN_PLAYERS || raw.players.len() > MAX_PLAYERS {
        return Err(ValidationError::new(
            "players",
            format!(
                "must submit between {MIN_PLAYERS} and {MAX_PLAYERS} players, got {}",
                raw.players.len()
            ),
        ));
    }

    let mut artifacts = Vec::new();
    let mut players = Vec::with_capacity(raw.players.len());
    for (i, raw_player) in raw.players.into_iter().enumerate() {
        let position = (i + 1) as u8;
        let field = format!("players[{i}]");

        let name = BoundedText::parse(raw_player.name, 1, 150)
            .map_err(|e| ValidationError::new(format!("{field}.name"), e))?;
        let role = raw_player
            .role
            .map(|r| BoundedText::parse(r, 1, 20))
            .transpose()
            .map_err(|e| ValidationError::new(format!("{field}.role"), e))?;

        let has_aadhar_file = raw_player.aadhar_file.is_some();
        let has_subscription_file = raw_player.subscription_file.is_some();

        if let Some(raw_file) = raw_player.aadhar_file {
            artifacts.push(decode_slot(Slot::PlayerAadhar(position), &raw_file)?);
        }
        if let Some(raw_file) = raw_player.subscription_file {
            artifacts.push(decode_slot(Slot::PlayerSubscription(position), &raw_file)?);
        }

        players.push(NewPlayer { name, role, has_aadhar_file, has_subscription_file });
    }

    let has_pastor_letter = raw.pastor_letter.is_some();
    let has_payment_receipt = raw.payment_receipt.is_some();
    let has_group_photo = raw.group_photo.is_some();

    if let Some(raw_file) = raw.pastor_letter {
        artifacts.push(decode_slot(Slot::PastorLetter, &raw_file)?);
    }
    if let Some(raw_file) = raw.payment_receipt {
        artifacts.push(decode_slot(Slot::PaymentReceipt, &raw_file)?);
    }
    if let Some(raw_file) = raw.group_photo {
        artifacts.push(decode_slot(Slot::GroupPhoto, &raw_file)?);
    }

    let team = NewTeam {
        team_name,
        church_name,
        captain,
        vice_captain,
        players,
        has_pastor_letter,
        has_payment_receipt,
        has_group_photo,
    };

    Ok((team, artifacts))
}

fn parse_contact(
    prefix: &str,
    raw: RawContact,
) -> Result<Contact, ValidationError> {
    let name =
        BoundedText::parse(raw.name, 1, 150).map_err(|e| ValidationError::new(format!("{prefix}.name"), e))?;
    let phone = PhoneNumber::parse(raw.phone, 7, 20)
        .map_err(|e| ValidationError::new(format!("{prefix}.phone"), e))?;
    let whatsapp = PhoneNumber::parse(raw.whatsapp, 10, 20)
        .map_err(|e| ValidationError::new(format!("{prefix}.whatsapp"), e))?;
    let email =
        ContactEmail::parse(raw.email).map_err(|e| ValidationError::new(format!("{prefix}.email"), e))?;
    Ok(Contact { name, phone, whatsapp, email })
}

fn decode_slot(
    slot: Slot,
    raw: &str,
) -> Result<ArtifactUpload, ValidationError> {
    decode_artifact(slot, raw).map_err(|e| ValidationError::new(slot.field_path(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::decode;
    use super::RawSubmission;

    fn valid_player_json(name: &str) -> serde_json::Value {
        serde_json::json!({ "name": name })
    }

    fn valid_submission_json(player_count: usize) -> serde_json::Value {
        let players: Vec<_> = (0..player_count)
            .map(|i| valid_player_json(&format!("Player {i}")))
            .collect();
        serde_json::json!({
            "churchName": "Grace Church",
            "teamName": "Warriors",
            "captain": {
                "name": "John Doe",
                "phone": "9876543210",
                "whatsapp": "9876543210",
                "email": "john@example.com",
            },
            "viceCaptain": {
                "name": "Jane Doe",
                "phone": "9876543211",
                "whatsapp": "9876543211",
                "email": "jane@example.com",
            },
            "players": players,
        })
    }

    #[test]
    fn eleven_players_is_valid() {
        let raw: RawSubmission = serde_json::from_value(valid_submission_json(11)).unwrap();
        assert!(decode(raw).is_ok());
    }

    #[test]
    fn fifteen_players_is_valid() {
        let raw: RawSubmission = serde_json::from_value(valid_submission_json(15)).unwrap();
        assert!(decode(raw).is_ok());
    }

    #[test]
    fn ten_players_is_rejected() {
        let raw: RawSubmission = serde_json::from_value(valid_submission_json(10)).unwrap();
        let err = decode(raw).unwrap_err();
        assert_eq!(err.field, "players");
    }

    #[test]
    fn sixteen_players_is_rejected() {
        let raw: RawSubmission = serde_json::from_value(valid_submission_json(16)).unwrap();
        assert!(decode(raw).is_err());
    }

    #[test]
    fn snake_case_field_names_are_accepted() {
        let mut body = valid_submission_json(11);
        let obj = body.as_object_mut().unwrap();
        let church = obj.remove("churchName").unwrap();
        obj.insert("church_name".to_string(), church);
        let team = obj.remove("teamName").unwrap();
        obj.insert("team_name".to_string(), team);

        let raw: RawSubmission = serde_json::from_value(body).unwrap();
        assert!(decode(raw).is_ok());
    }

    #[test]
    fn invalid_captain_email_is_rejected_with_field_path() {
        let mut body = valid_submission_json(11);
        body["captain"]["email"] = serde_json::json!("not-an-email");
        let raw: RawSubmission = serde_json::from_value(body).unwrap();
        let err = decode(raw).unwrap_err();
        assert_eq!(err.field, "captain.email");
    }
}
