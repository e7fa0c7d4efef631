//! Credential primitives for the identity provider.
//!
//! Provides the building blocks the identity service composes:
//! - Password hashing (Argon2id, PHC string output)
//! - Session token issuance and validation (HS256 JWT, one signing secret per application)
//! - Authentication coordination with a configured token time-to-live
//!
//! Signing secrets belong to applications, so a token issued for one application
//! does not validate under another application's secret.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{Claims, JwtHandler};
//!
//! let handler = JwtHandler::new(b"app_secret_key_at_least_32_bytes!").unwrap();
//! let claims = Claims::for_session(7, "alice@example.com", 1, chrono::Duration::hours(1));
//! let token = handler.encode(&claims).unwrap();
//! let decoded: Claims = handler.decode(&token).unwrap();
//! assert_eq!(decoded.uid, 7);
//! ```
//!
//! ## Complete Login Flow
//! ```
//! use auth::{Authenticator, TokenSubject};
//!
//! let auth = Authenticator::new(chrono::Duration::hours(1));
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify, then issue a token scoped to the application
//! assert!(auth.verify_password("password123", &hash).unwrap());
//! let subject = TokenSubject::new(7, "alice@example.com", 1);
//! let token = auth.issue_token(&subject, b"app_secret_key_at_least_32_bytes!").unwrap();
//!
//! let claims = auth.validate_token(&token, b"app_secret_key_at_least_32_bytes!").unwrap();
//! assert_eq!(claims.app_id, 1);
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::Authenticator;
pub use authenticator::TokenSubject;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
