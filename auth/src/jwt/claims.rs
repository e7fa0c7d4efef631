use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Session token payload.
///
/// Binds a user to the application the token was issued for. `admin` is a
/// snapshot of the user's flag at issuance time, not a live value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User identifier
    pub uid: i64,

    /// Login email of the user
    pub email: String,

    /// Application the token is scoped to
    pub app_id: i64,

    /// Admin flag at issuance time
    #[serde(default)]
    pub admin: bool,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a session starting now.
    ///
    /// # Arguments
    /// * `user_id` - User identifier
    /// * `email` - User login email
    /// * `app_id` - Application identifier
    /// * `ttl` - Time until the token expires
    ///
    /// # Returns
    /// Claims with `iat` set to now and `exp` to now + `ttl`
    pub fn for_session(user_id: i64, email: impl ToString, app_id: i64, ttl: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + ttl;

        Self {
            uid: user_id,
            email: email.to_string(),
            app_id,
            admin: false,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Set the admin snapshot.
    pub fn with_admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = iat;
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_session() {
        let claims = Claims::for_session(42, "alice@example.com", 3, Duration::hours(24));

        assert_eq!(claims.uid, 42);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.app_id, 3);
        assert!(!claims.admin);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60); // 24 hours
    }

    #[test]
    fn test_builder_pattern() {
        let claims = Claims::for_session(1, "bob@example.com", 1, Duration::minutes(5))
            .with_admin(true)
            .with_issued_at(1234567800)
            .with_expiration(1234567890);

        assert!(claims.admin);
        assert_eq!(claims.iat, 1234567800);
        assert_eq!(claims.exp, 1234567890);
    }

    #[test]
    fn test_is_expired() {
        let claims =
            Claims::for_session(1, "bob@example.com", 1, Duration::zero()).with_expiration(1000);

        assert!(!claims.is_expired(999)); // Not expired
        assert!(!claims.is_expired(1000)); // Exactly at expiration
        assert!(claims.is_expired(1001)); // Expired
    }

    #[test]
    fn test_admin_defaults_to_false_when_absent() {
        let json = r#"{"uid":1,"email":"a@b.com","app_id":2,"iat":10,"exp":20}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert!(!claims.admin);
    }
}
