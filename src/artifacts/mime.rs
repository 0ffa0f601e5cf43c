use std::fmt;

/// The MIME types the submission pipeline recognizes for any artifact slot.
/// Not every variant is legal for every slot; see `Slot::allowed_mimes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactMime {
    Jpeg,
    Png,
    Gif,
    WebP,
    Jxl,
    Pdf,
}

impl ArtifactMime {
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::WebP),
            "image/jxl" => Some(Self::Jxl),
            "application/pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Recover the MIME from a file extension, the inverse of `extension`.
    /// Used to reconstruct which MIME an artifact was stored as from its
    /// persisted object-store URL.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::WebP),
            "jxl" => Some(Self::Jxl),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::WebP => "webp",
            Self::Jxl => "jxl",
            Self::Pdf => "pdf",
        }
    }

    /// Sniff the declared MIME against magic bytes at the start of the
    /// decoded payload. A declared type whose magic bytes don't match is a
    /// validation failure.
    pub fn matches_magic_bytes(
        &self,
        bytes: &[u8],
    ) -> bool {
        match self {
            Self::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Png => bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
            Self::Gif => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
            Self::WebP => {
                bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP"
            }
            // JPEG XL has two legal signatures: the bare codestream and the ISOBMFF container.
            Self::Jxl => {
                bytes.starts_with(&[0xFF, 0x0A])
                    || bytes.starts_with(&[
                        0x00, 0x00, 0x00, 0x0C, b'J', b'X', b'L', b' ', 0x0D, 0x0A, 0x87, 0x0A,
                    ])
            }
            Self::Pdf => bytes.starts_with(b"%PDF-"),
        }
    }
}

impl fmt::Display for ArtifactMime {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Jxl => "image/jxl",
            Self::Pdf => "application/pdf",
        };
        write!(f, "{s}")
    }
}
