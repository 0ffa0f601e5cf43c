use unicode_normalization::UnicodeNormalization;

use super::BoundedText;

/// A church name, bounded like any other free-text field but additionally
/// exposing a normalized form (NFC + trim + lowercase) for quota comparisons.
/// Casing is preserved in the stored value; only the quota check compares
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct ChurchName(BoundedText);

impl ChurchName {
    pub fn parse(text: String) -> Result<Self, String> {
        BoundedText::parse(text, 1, 200).map(Self)
    }

    /// NFC-normalized, trimmed, lowercased form used only for quota
    /// comparisons; the original casing is never discarded from storage.
    pub fn normalized(&self) -> String { normalize(self.0.as_ref()) }
}

impl AsRef<str> for ChurchName {
    fn as_ref(&self) -> &str { self.0.as_ref() }
}

impl From<ChurchName> for String {
    fn from(value: ChurchName) -> Self { value.0.into() }
}

pub fn normalize(raw: &str) -> String { raw.trim().nfc().collect::<String>().to_lowercase() }

#[cfg(test)]
mod tests {
    use super::normalize;
    use super::ChurchName;

    #[test]
    fn casing_and_whitespace_do_not_affect_normalized_form() {
        let a = ChurchName::parse("  Grace Church ".to_string()).unwrap();
        let b = ChurchName::parse("grace church".to_string()).unwrap();
        assert_eq!(a.normalized(), b.normalized());
    }

    #[test]
    fn original_casing_is_preserved() {
        let a = ChurchName::parse("Grace Church".to_string()).unwrap();
        assert_eq!(a.as_ref(), "Grace Church");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("Grace Church");
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }
}
