use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccountError {
    #[error("Username must be at least 3 characters long")]
    UsernameTooShort,

    #[error("Username may only contain letters, digits, '-', '_' and '.'")]
    InvalidUsername,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,

    #[error("Password must contain at least one uppercase letter")]
    PasswordMissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    PasswordMissingLowercase,

    #[error("Password must contain at least one number")]
    PasswordMissingDigit,
}

/// Identity returned by an authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub verified: bool,
}

/// Validated sign-up form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub username: UserId,
    pub email: String,
    pub password: String,
}

impl SignUpRequest {
    /// Validate a raw sign-up form.
    ///
    /// # Errors
    ///
    /// Returns the first `AccountError` found, checking username, e-mail,
    /// confirmation and then password strength.
    pub fn new(
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, AccountError> {
        let username = username.trim();
        if username.chars().count() < 3 {
            return Err(AccountError::UsernameTooShort);
        }
        let username = UserId::new(username).map_err(|_| AccountError::InvalidUsername)?;
        validate_email(email)?;
        if password != confirm_password {
            return Err(AccountError::PasswordMismatch);
        }
        validate_password(password)?;
        Ok(Self {
            username,
            email: email.trim().to_string(),
            password: password.to_string(),
        })
    }
}

/// Check the `local@domain.tld` shape.
///
/// # Errors
///
/// Returns `AccountError::InvalidEmail` when the shape does not match.
pub fn validate_email(email: &str) -> Result<(), AccountError> {
    let email = email.trim();
    let part_ok = |s: &str| {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '+'))
    };
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AccountError::InvalidEmail);
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return Err(AccountError::InvalidEmail);
    };
    let tld_ok = !tld.is_empty() && tld.chars().all(|c| c.is_alphanumeric() || c == '_');
    if part_ok(local) && part_ok(host) && tld_ok {
        Ok(())
    } else {
        Err(AccountError::InvalidEmail)
    }
}

/// At least 8 characters with an uppercase letter, a lowercase letter and a digit.
///
/// # Errors
///
/// Returns the first unmet rule as an `AccountError`.
pub fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.chars().count() < 8 {
        return Err(AccountError::PasswordTooShort);
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(AccountError::PasswordMissingUppercase);
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(AccountError::PasswordMissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AccountError::PasswordMissingDigit);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_sign_up() {
        let req = SignUpRequest::new("alice", "alice@example.com", "Secret123", "Secret123").unwrap();
        assert_eq!(req.username.as_str(), "alice");
    }

    #[test]
    fn checks_rules_in_order() {
        assert_eq!(
            SignUpRequest::new("al", "x", "a", "b").unwrap_err(),
            AccountError::UsernameTooShort
        );
        assert_eq!(
            SignUpRequest::new("alice", "alice@", "a", "b").unwrap_err(),
            AccountError::InvalidEmail
        );
        assert_eq!(
            SignUpRequest::new("alice", "a@b.co", "Secret123", "Secret124").unwrap_err(),
            AccountError::PasswordMismatch
        );
    }

    #[test]
    fn password_rules() {
        assert_eq!(validate_password("Ab1"), Err(AccountError::PasswordTooShort));
        assert_eq!(validate_password("abcdefg1"), Err(AccountError::PasswordMissingUppercase));
        assert_eq!(validate_password("ABCDEFG1"), Err(AccountError::PasswordMissingLowercase));
        assert_eq!(validate_password("Abcdefgh"), Err(AccountError::PasswordMissingDigit));
        assert!(validate_password("Abcdefg1").is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("first.last@mail.example.org").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("a@nodot").is_err());
        assert!(validate_email("a b@x.io").is_err());
    }
}
