use validator::ValidationError;

/// Username domain type. Lowercase ASCII letters, digits, `_` and `-`, 2 to 40 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    pub fn new(username: impl AsRef<str>) -> Result<Self, ValidationError> {
        let t = username.as_ref().trim().to_lowercase();

        if t.len() < 2 || t.len() > 40 {
            let mut error = ValidationError::new("username_length");
            error.message = Some("Username must be 2-40 characters".into());
            return Err(error);
        }

        let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-';
        if !t.chars().all(allowed) {
            let mut error = ValidationError::new("username_charset");
            error.message = Some("Username may only contain letters, digits, '_' and '-'".into());
            return Err(error);
        }

        Ok(Self(t))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
