use unicode_segmentation::UnicodeSegmentation;

/// A trimmed, non-empty string whose grapheme length falls within `[min, max]`.
/// Used for every free-text field (team/church/player names, captain role,
/// etc.) that the submission schema bounds by length alone.
#[derive(Debug, Clone)]
pub struct BoundedText(String);

impl BoundedText {
    pub fn parse(
        text: String,
        min: usize,
        max: usize,
    ) -> Result<Self, String> {
        let len = text.graphemes(true).count();
        if len < min || len > max {
            return Err(format!(
                "must be between {min} and {max} characters, got {len}"
            ));
        }
        if min > 0 && text.trim().is_empty() {
            return Err("must not be blank".to_string());
        }
        Ok(Self(text))
    }
}

impl AsRef<str> for BoundedText {
    fn as_ref(&self) -> &str { &self.0 }
}

impl From<BoundedText> for String {
    fn from(value: BoundedText) -> Self { value.0 }
}

#[cfg(test)]
mod tests {
    use claims::assert_err;
    use claims::assert_ok;

    use super::BoundedText;

    #[test]
    fn within_bounds_ok() {
        assert_ok!(BoundedText::parse("a".repeat(150), 1, 150));
        assert_ok!(BoundedText::parse("john".to_string(), 1, 150));
    }

    #[test]
    fn too_long() {
        assert_err!(BoundedText::parse("a".repeat(151), 1, 150));
    }

    #[test]
    fn too_short() {
        assert_err!(BoundedText::parse("".to_string(), 1, 150));
    }
}
