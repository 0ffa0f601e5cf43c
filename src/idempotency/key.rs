pub struct IdempotencyKey(String);

impl TryFrom<String> for IdempotencyKey {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            anyhow::bail!("idempotency key cannot be empty")
        }
        let max_chars = 100;
        if value.len() > max_chars {
            anyhow::bail!("idempotency key cannot be longer than {max_chars} characters")
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for IdempotencyKey {
    fn as_ref(&self) -> &str { &self.0 }
}

impl From<IdempotencyKey> for String {
    fn from(value: IdempotencyKey) -> Self { value.0 }
}

#[cfg(test)]
mod tests {
    use super::IdempotencyKey;

    #[test]
    fn empty_key_rejected() {
        assert!(IdempotencyKey::try_from(String::new()).is_err());
    }

    #[test]
    fn overlong_key_rejected() {
        let key = "a".repeat(101);
        assert!(IdempotencyKey::try_from(key).is_err());
    }

    #[test]
    fn ordinary_key_accepted() {
        assert!(IdempotencyKey::try_from("abc-123".to_string()).is_ok());
    }
}
