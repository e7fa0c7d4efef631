use std::fmt;
use std::str::FromStr;

use crate::identity::confirmation::DeliveryHandle;
use crate::identity::errors::EmailError;

/// Registered account.
///
/// `password_hash` never leaves the service; `Debug` redacts it.
#[derive(Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub profile: Profile,
    pub is_admin: bool,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("profile", &self.profile)
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

/// User identifier assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Pass-through profile data. The core does not interpret these fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Profile {
    pub date_of_birth: String,
    pub full_name: String,
    pub phone_number: String,
    /// Chat handle used by the external confirmation channel
    pub external_handle: String,
}

/// Relying party that tokens are issued for.
///
/// The signing secret is owned by the store; `Debug` redacts it.
#[derive(Clone)]
pub struct Application {
    pub id: AppId,
    pub name: String,
    pub secret: Vec<u8>,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Application identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppId(pub i64);

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser. Case is preserved as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Command to register a new account.
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: String,
    pub profile: Profile,
}

impl RegisterCommand {
    /// # Arguments
    /// * `email` - Validated email address
    /// * `password` - Plain text password (hashed by the service)
    /// * `profile` - Profile fields stored as given
    pub fn new(email: EmailAddress, password: String, profile: Profile) -> Self {
        Self {
            email,
            password,
            profile,
        }
    }
}

/// User row handed to the store for insertion.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub profile: Profile,
}

/// Outcome of a successful registration.
///
/// `delivery` resolves once the confirmation code has been stored and sent (or has
/// failed to be). Dropping it does not cancel delivery.
#[derive(Debug)]
pub struct Registration {
    pub user_id: UserId,
    pub delivery: DeliveryHandle,
}

/// One-time numeric proof of channel ownership.
///
/// Compared as an exact string. `Debug` redacts the value so codes stay out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ConfirmationCode(String);

impl ConfirmationCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, supplied: &str) -> bool {
        self.0 == supplied
    }
}

impl fmt::Debug for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfirmationCode(<redacted>)")
    }
}

/// Stored confirmation state for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRecord {
    pub user_id: UserId,
    pub code: ConfirmationCode,
    pub confirmed: bool,
}

/// Result of checking a submitted code against the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Confirmed,
    /// Terminal state reached earlier; not an error
    AlreadyConfirmed,
    Mismatch,
    NotFound,
}

/// Confirmation result surfaced to callers of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    Confirmed,
    AlreadyConfirmed,
    Mismatch,
}

/// Outcome of confirming an account through its chat identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalConfirmation {
    NotRegistered,
    AlreadyConfirmed,
    NowConfirmed,
    Error,
}

/// Outcome of a resend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendOutcome {
    Sent,
    AlreadyConfirmed,
}

/// Outbound email handed to a delivery collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_address_keeps_case() {
        let email = EmailAddress::new("Alice@Example.com".to_string()).unwrap();
        assert_eq!(email.as_str(), "Alice@Example.com");
    }

    #[test]
    fn test_email_address_rejects_invalid() {
        let result = EmailAddress::new("not-an-email".to_string());
        assert!(matches!(result, Err(EmailError::InvalidFormat(_))));
    }

    #[test]
    fn test_confirmation_code_exact_match() {
        let code = ConfirmationCode::new("01234");
        assert!(code.matches("01234"));
        assert!(!code.matches("1234"));
        assert!(!code.matches("01234 "));
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let user = User {
            id: UserId(1),
            email: "a@b.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            profile: Profile::default(),
            is_admin: false,
        };
        let app = Application {
            id: AppId(1),
            name: "web".to_string(),
            secret: b"top-secret".to_vec(),
        };
        let code = ConfirmationCode::new("54321");

        assert!(!format!("{:?}", user).contains("argon2id"));
        assert!(!format!("{:?}", app).contains("top-secret"));
        assert!(!format!("{:?}", code).contains("54321"));
    }
}
