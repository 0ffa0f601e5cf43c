use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::Digest;
use sha2::Sha256;

use super::ArtifactMime;
use super::Slot;

pub const MAX_ARTIFACT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("not valid base64")]
    InvalidBase64,
    #[error("could not determine a MIME type for this artifact")]
    UnknownMime,
    #[error("artifact exceeds the maximum size of {MAX_ARTIFACT_BYTES} bytes")]
    TooLarge,
    #[error("declared MIME type {declared} does not match file contents")]
    MimeMismatch { declared: ArtifactMime },
    #[error("MIME type {mime} is not allowed for this slot")]
    MimeNotAllowed { mime: ArtifactMime },
}

/// A decoded artifact ready for upload, plus the bookkeeping the uploader
/// and coordinator need.
#[derive(Clone)]
pub struct ArtifactUpload {
    pub slot: Slot,
    pub bytes: Vec<u8>,
    pub mime: ArtifactMime,
    pub sha256: String,
}

/// Decode a single artifact field for `slot`. `raw` is either a data URI
/// (`data:<mime>;base64,<payload>`) or bare base64. Performs no I/O: this is
/// pure in-memory validation.
pub fn decode_artifact(
    slot: Slot,
    raw: &str,
) -> Result<ArtifactUpload, DecodeError> {
    let (declared_mime, payload) = split_data_uri(raw);

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| DecodeError::InvalidBase64)?;

    if bytes.len() > MAX_ARTIFACT_BYTES {
        return Err(DecodeError::TooLarge);
    }

    let mime = match declared_mime.and_then(ArtifactMime::from_str) {
        Some(mime) => mime,
        // no usable declared MIME in the data URI; fall back to sniffing
        None => sniff(&bytes).ok_or(DecodeError::UnknownMime)?,
    };

    if !mime.matches_magic_bytes(&bytes) {
        return Err(DecodeError::MimeMismatch { declared: mime });
    }

    if !slot.allowed_mimes().contains(&mime) {
        return Err(DecodeError::MimeNotAllowed { mime });
    }

    let sha256 = hex::encode(Sha256::digest(&bytes));

    Ok(ArtifactUpload { slot, bytes, mime, sha256 })
}

/// Split a `data:<mime>;base64,<payload>` URI into its declared MIME (if
/// any) and the base64 payload. Bare base64 (no `data:` prefix) is passed
/// through unchanged with no declared MIME.
fn split_data_uri(raw: &str) -> (Option<&str>, &str) {
    let Some(rest) = raw.strip_prefix("data:") else {
        return (None, raw);
    };
    let Some((header, payload)) = rest.split_once(',') else {
        return (None, raw);
    };
    let mime = header.strip_suffix(";base64").unwrap_or(header);
    (Some(mime), payload)
}

fn sniff(bytes: &[u8]) -> Option<ArtifactMime> {
    [
        ArtifactMime::Png,
        ArtifactMime::Jpeg,
        ArtifactMime::Gif,
        ArtifactMime::WebP,
        ArtifactMime::Jxl,
        ArtifactMime::Pdf,
    ]
    .into_iter()
    .find(|mime| mime.matches_magic_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::decode_artifact;
    use super::DecodeError;
    use super::MAX_ARTIFACT_BYTES;
    use crate::artifacts::Slot;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn data_uri(
        mime: &str,
        bytes: &[u8],
    ) -> String {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;
        format!("data:{mime};base64,{}", STANDARD.encode(bytes))
    }

    #[test]
    fn valid_png_group_photo() {
        let uri = data_uri("image/png", &PNG_HEADER);
        let artifact = decode_artifact(Slot::GroupPhoto, &uri).unwrap();
        assert_eq!(artifact.mime.to_string(), "image/png");
    }

    #[test]
    fn mismatched_magic_bytes_rejected() {
        // declared png, but the bytes are a PDF
        let uri = data_uri("image/png", b"%PDF-1.4 not actually a png");
        let err = decode_artifact(Slot::GroupPhoto, &uri).unwrap_err();
        assert!(matches!(err, DecodeError::MimeMismatch { .. }));
    }

    #[test]
    fn pdf_rejected_for_group_photo() {
        let uri = data_uri("application/pdf", b"%PDF-1.4");
        let err = decode_artifact(Slot::GroupPhoto, &uri).unwrap_err();
        assert!(matches!(err, DecodeError::MimeNotAllowed { .. }));
    }

    #[test]
    fn exactly_max_size_is_accepted() {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.resize(MAX_ARTIFACT_BYTES, 0);
        let uri = data_uri("image/png", &bytes);
        assert!(decode_artifact(Slot::GroupPhoto, &uri).is_ok());
    }

    #[test]
    fn one_byte_over_max_size_is_rejected() {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.resize(MAX_ARTIFACT_BYTES + 1, 0);
        let uri = data_uri("image/png", &bytes);
        assert!(matches!(
            decode_artifact(Slot::GroupPhoto, &uri),
            Err(DecodeError::TooLarge)
        ));
    }

    #[test]
    fn bare_base64_without_data_uri_prefix_is_sniffed() {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;
        let bare = STANDARD.encode(PNG_HEADER);
        let artifact = decode_artifact(Slot::GroupPhoto, &bare).unwrap();
        assert_eq!(artifact.mime.to_string(), "image/png");
    }
}
