//! Authentication primitives: login credentials, registration input and
//! password hashes.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, UserValidationError, Username};

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use market::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("jim", "secret").unwrap();
/// assert_eq!(creds.username(), "jim");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Encoded password hash in PHC string format.
///
/// Never holds a plaintext password; [`PasswordHasher`](super::ports::PasswordHasher)
/// implementations produce it.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// A single reason a registration form was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error("{0}")]
    Username(UserValidationError),
    #[error("{0}")]
    EmailAddress(UserValidationError),
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("passwords must match")]
    PasswordMismatch,
}

/// Validated sign-up request.
///
/// All form problems are collected so the page can show every one at once.
///
/// # Examples
/// ```
/// use market::domain::Registration;
///
/// let errors = Registration::try_from_parts("j", "nope", "abc", "abd").unwrap_err();
/// assert_eq!(errors.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    email_address: EmailAddress,
    password: Zeroizing<String>,
}

impl Registration {
    pub fn try_from_parts(
        username: &str,
        email_address: &str,
        password1: &str,
        password2: &str,
    ) -> Result<Self, Vec<RegistrationValidationError>> {
        let mut errors = Vec::new();

        let username = Username::new(username)
            .map_err(|err| errors.push(RegistrationValidationError::Username(err)))
            .ok();
        let email_address = EmailAddress::new(email_address)
            .map_err(|err| errors.push(RegistrationValidationError::EmailAddress(err)))
            .ok();
        if password1.chars().count() < PASSWORD_MIN {
            errors.push(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if password1 != password2 {
            errors.push(RegistrationValidationError::PasswordMismatch);
        }

        match (username, email_address) {
            (Some(username), Some(email_address)) if errors.is_empty() => Ok(Self {
                username,
                email_address,
                password: Zeroizing::new(password1.to_owned()),
            }),
            _ => Err(errors),
        }
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email_address(&self) -> &EmailAddress {
        &self.email_address
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn valid_credentials_trim_username() {
        let creds = LoginCredentials::try_from_parts("  jim  ", " secret ").expect("valid");
        assert_eq!(creds.username(), "jim");
        assert_eq!(creds.password(), " secret ");
    }

    #[rstest]
    fn registration_accepts_valid_form() {
        let reg = Registration::try_from_parts("jim", "jim@example.com", "secret1", "secret1")
            .expect("valid registration");
        assert_eq!(reg.username().as_ref(), "jim");
        assert_eq!(reg.email_address().as_ref(), "jim@example.com");
        assert_eq!(reg.password(), "secret1");
    }

    #[rstest]
    #[case("jim", "jim@example.com", "short", "short", RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN })]
    #[case("jim", "jim@example.com", "secret1", "secret2", RegistrationValidationError::PasswordMismatch)]
    #[case("j", "jim@example.com", "secret1", "secret1", RegistrationValidationError::Username(UserValidationError::UsernameTooShort { min: 2 }))]
    #[case("jim", "not-an-email", "secret1", "secret1", RegistrationValidationError::EmailAddress(UserValidationError::InvalidEmail))]
    fn registration_reports_single_problem(
        #[case] username: &str,
        #[case] email: &str,
        #[case] password1: &str,
        #[case] password2: &str,
        #[case] expected: RegistrationValidationError,
    ) {
        let errors = Registration::try_from_parts(username, email, password1, password2)
            .expect_err("invalid registration");
        assert_eq!(errors, vec![expected]);
    }

    #[rstest]
    fn password_hash_debug_is_opaque() {
        let hash = PasswordHash::new("$argon2id$v=19$secret");
        assert_eq!(format!("{hash:?}"), "PasswordHash(..)");
    }
}
