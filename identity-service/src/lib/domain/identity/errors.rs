use thiserror::Error;

use crate::identity::models::AppId;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error reported by storage adapters
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Error reported by out-of-band delivery channels
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Delivery channel unreachable: {0}")]
    Unreachable(String),

    #[error("Delivery rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Error for confirmation code issuance and delivery.
///
/// Delivery and persistence failures stay distinct so a caller can retry
/// sending without generating a new code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfirmationError {
    #[error("Confirmation delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Confirmation storage failed: {0}")]
    Store(#[from] StoreError),

    #[error("Confirmation task failed: {0}")]
    TaskFailed(String),
}

/// Top-level error for authentication operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password; the two are deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid app id: {0}")]
    InvalidAppId(AppId),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    // Infrastructure errors
    #[error("{op}: store unavailable: {message}")]
    StoreUnavailable { op: &'static str, message: String },

    #[error("{op}: token issuance failed: {message}")]
    Issuance { op: &'static str, message: String },

    #[error("{op}: password hashing failed: {message}")]
    PasswordHashing { op: &'static str, message: String },
}

impl AuthError {
    /// Wrap a store failure with the operation it happened in.
    pub fn store(op: &'static str, err: StoreError) -> Self {
        AuthError::StoreUnavailable {
            op,
            message: err.to_string(),
        }
    }
}
