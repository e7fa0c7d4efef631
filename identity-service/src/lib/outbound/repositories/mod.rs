pub mod application;
pub mod confirmation;
pub mod user;

pub use application::PostgresApplicationRepository;
pub use confirmation::PostgresConfirmationRepository;
pub use user::PostgresUserRepository;

use crate::identity::errors::StoreError;

/// Classify a driver error; unique violations become `AlreadyExists`.
pub(crate) fn store_error(e: sqlx::Error, subject: impl Into<String>) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::AlreadyExists(subject.into());
        }
    }
    StoreError::Unavailable(e.to_string())
}
