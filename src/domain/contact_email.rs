use validator::ValidateEmail;

/// A syntactically valid email address, used for both captain and
/// vice-captain contact fields.
#[derive(Debug, Clone)]
pub struct ContactEmail(String);

impl ContactEmail {
    pub fn parse(email: String) -> Result<Self, String> {
        ValidateEmail::validate_email(&email)
            .then_some(Self(email.clone()))
            .ok_or(format!("invalid email: {email:?}"))
    }
}

impl AsRef<str> for ContactEmail {
    fn as_ref(&self) -> &str { &self.0 }
}

impl From<ContactEmail> for String {
    fn from(value: ContactEmail) -> Self { value.0 }
}
