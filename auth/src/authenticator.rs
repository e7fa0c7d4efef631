use chrono::Duration;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Holds the process-wide token time-to-live. Signing secrets are supplied per call
/// because they belong to the application the token is issued for.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_ttl: Duration,
    decoy_hash: Option<String>,
}

const DECOY_PASSWORD: &str = "decoy-password-never-assigned";

/// Identity a session token is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject<'a> {
    pub user_id: i64,
    pub email: &'a str,
    pub app_id: i64,
    pub is_admin: bool,
}

impl<'a> TokenSubject<'a> {
    pub fn new(user_id: i64, email: &'a str, app_id: i64) -> Self {
        Self {
            user_id,
            email,
            app_id,
            is_admin: false,
        }
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `token_ttl` - Lifetime of issued session tokens
    ///
    /// # Returns
    /// Configured Authenticator instance
    pub fn new(token_ttl: Duration) -> Self {
        let password_hasher = PasswordHasher::new();
        let decoy_hash = password_hasher.hash(DECOY_PASSWORD).ok();

        Self {
            password_hasher,
            token_ttl,
            decoy_hash,
        }
    }

    /// Lifetime applied to every issued token.
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// # Returns
    /// `false` on mismatch; mismatch is never an error
    ///
    /// # Errors
    /// * `PasswordError` - Stored hash is malformed
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Spend the same hashing work as `verify_password` when there is no stored hash.
    ///
    /// Keeps a lookup miss as slow as a password mismatch. The outcome is discarded.
    pub fn verify_decoy(&self, password: &str) {
        let _ = match &self.decoy_hash {
            Some(hash) => self.password_hasher.verify(password, hash),
            None => self.password_hasher.hash(password).map(|_| false),
        };
    }

    /// Issue a signed session token for an application.
    ///
    /// Expiry is issuance time + the configured ttl.
    ///
    /// # Arguments
    /// * `subject` - User and application the token binds
    /// * `signing_secret` - The application's secret
    ///
    /// # Errors
    /// * `MissingSecret` - Application secret is empty
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_token(
        &self,
        subject: &TokenSubject<'_>,
        signing_secret: &[u8],
    ) -> Result<String, JwtError> {
        let handler = JwtHandler::new(signing_secret)?;

        let claims = Claims::for_session(
            subject.user_id,
            subject.email,
            subject.app_id,
            self.token_ttl,
        )
        .with_admin(subject.is_admin);

        handler.encode(&claims)
    }

    /// Validate and decode a session token with an application's secret.
    ///
    /// # Errors
    /// * `JwtError` - Token validation or decoding failed
    pub fn validate_token(&self, token: &str, signing_secret: &[u8]) -> Result<Claims, JwtError> {
        JwtHandler::new(signing_secret)?.decode(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP_SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_verify_and_issue() {
        let authenticator = Authenticator::new(Duration::hours(1));

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        assert!(authenticator
            .verify_password(password, &hash)
            .expect("Failed to verify password"));

        let subject = TokenSubject::new(12, "alice@example.com", 4).with_admin(true);
        let token = authenticator
            .issue_token(&subject, APP_SECRET)
            .expect("Failed to issue token");

        let claims = authenticator
            .validate_token(&token, APP_SECRET)
            .expect("Token validation failed");
        assert_eq!(claims.uid, 12);
        assert_eq!(claims.app_id, 4);
        assert_eq!(claims.email, "alice@example.com");
        assert!(claims.admin);
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    #[test]
    fn test_verify_wrong_password() {
        let authenticator = Authenticator::new(Duration::hours(1));

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        assert!(!authenticator
            .verify_password("wrong_password", &hash)
            .expect("Mismatch must not be an error"));
    }

    #[test]
    fn test_decoy_hash_is_a_real_argon2id_hash() {
        let authenticator = Authenticator::new(Duration::hours(1));

        let decoy = authenticator.decoy_hash.as_deref().expect("Decoy hash should be computed");
        assert!(decoy.starts_with("$argon2id"));
        assert!(!authenticator
            .verify_password("my_password", decoy)
            .expect("Decoy hash must parse"));

        authenticator.verify_decoy("my_password");
    }

    #[test]
    fn test_token_ttl_is_applied() {
        let authenticator = Authenticator::new(Duration::minutes(15));
        assert_eq!(authenticator.token_ttl(), Duration::minutes(15));
    }

    #[test]
    fn test_issue_fails_closed_without_secret() {
        let authenticator = Authenticator::new(Duration::hours(1));
        let subject = TokenSubject::new(1, "alice@example.com", 1);

        let result = authenticator.issue_token(&subject, b"");
        assert_eq!(result, Err(JwtError::MissingSecret));
    }

    #[test]
    fn test_token_is_scoped_to_application() {
        let authenticator = Authenticator::new(Duration::hours(1));
        let subject = TokenSubject::new(1, "alice@example.com", 1);

        let token = authenticator
            .issue_token(&subject, b"application_a_secret_32_bytes_long!")
            .expect("Failed to issue token");

        let result = authenticator.validate_token(&token, b"application_b_secret_32_bytes_long!");
        assert_eq!(result, Err(JwtError::InvalidSignature));
    }
}
