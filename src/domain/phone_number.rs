/// A phone/WhatsApp number: digits with an optional leading `+`, length
/// bounded by the caller (`[7, 20]` for phone, `[10, 20]` for WhatsApp).
#[derive(Debug, Clone)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(
        raw: String,
        min: usize,
        max: usize,
    ) -> Result<Self, String> {
        let len = raw.len();
        if len < min || len > max {
            return Err(format!(
                "must be between {min} and {max} characters, got {len}"
            ));
        }
        let digits = raw.strip_prefix('+').unwrap_or(&raw);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("not a valid phone number: {raw:?}"));
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str { &self.0 }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self { value.0 }
}

#[cfg(test)]
mod tests {
    use claims::assert_err;
    use claims::assert_ok;

    use super::PhoneNumber;

    #[test]
    fn plain_digits_ok() {
        assert_ok!(PhoneNumber::parse("9876543210".to_string(), 7, 20));
    }

    #[test]
    fn leading_plus_ok() {
        assert_ok!(PhoneNumber::parse("+919876543210".to_string(), 7, 20));
    }

    #[test]
    fn too_short() {
        assert_err!(PhoneNumber::parse("123".to_string(), 7, 20));
    }

    #[test]
    fn non_digit_chars() {
        assert_err!(PhoneNumber::parse("987-654-3210".to_string(), 7, 20));
    }
}
