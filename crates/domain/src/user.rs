//! User account validation rules.

use classbook_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Group assigned when a registration names none.
pub const DEFAULT_GROUP_ID: &str = "user-group";

/// Minimum accepted password length.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum accepted password length (bounds Argon2 work per request).
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated, lower-cased email address.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain '@'".to_owned(),
            ));
        };

        if local.is_empty() || domain.contains('@') {
            return Err(AppError::Validation(
                "email address must have one '@' and a local part".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Validates a plaintext password length.
pub fn validate_password(password: &str) -> AppResult<()> {
    let char_count = password.chars().count();

    if char_count < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if char_count > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Normalizes a requested registration group, falling back to the default.
#[must_use]
pub fn normalize_group_id(requested: Option<&str>) -> String {
    requested
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != "default-group")
        .unwrap_or(DEFAULT_GROUP_ID)
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_is_lowercased() {
        let email = EmailAddress::new(" Student@School.ORG ").map(String::from);
        assert_eq!(email.ok().as_deref(), Some("student@school.org"));
    }

    #[test]
    fn malformed_emails_are_rejected() {
        assert!(EmailAddress::new("").is_err());
        assert!(EmailAddress::new("noatsign").is_err());
        assert!(EmailAddress::new("a@b@c.org").is_err());
        assert!(EmailAddress::new("user@nodot").is_err());
    }

    #[test]
    fn password_length_bounds() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long-enough").is_ok());
        assert!(validate_password(&"x".repeat(PASSWORD_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn blank_group_falls_back_to_default() {
        assert_eq!(normalize_group_id(None), DEFAULT_GROUP_ID);
        assert_eq!(normalize_group_id(Some("  ")), DEFAULT_GROUP_ID);
        assert_eq!(normalize_group_id(Some("default-group")), DEFAULT_GROUP_ID);
        assert_eq!(normalize_group_id(Some(" 10a ")), "10a");
    }
}
