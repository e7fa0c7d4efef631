use async_trait::async_trait;

use crate::identity::errors::AuthError;
use crate::identity::errors::DeliveryError;
use crate::identity::errors::StoreError;
use crate::identity::models::AppId;
use crate::identity::models::Application;
use crate::identity::models::ConfirmationCode;
use crate::identity::models::ConfirmationRecord;
use crate::identity::models::EmailMessage;
use crate::identity::models::ExternalConfirmation;
use crate::identity::models::NewUser;
use crate::identity::models::RegisterCommand;
use crate::identity::models::Registration;
use crate::identity::models::ResendOutcome;
use crate::identity::models::User;
use crate::identity::models::UserId;
use crate::identity::models::VerificationStatus;

/// Port for authentication use cases, consumed by transport adapters.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Verify credentials and issue a session token for an application.
    ///
    /// # Arguments
    /// * `email` - Login email
    /// * `password` - Plaintext password
    /// * `app_id` - Application the token is scoped to
    ///
    /// # Returns
    /// Signed session token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `InvalidAppId` - Application does not exist
    /// * `StoreUnavailable` - Storage failed
    /// * `Issuance` - Token could not be signed
    async fn login(&self, email: &str, password: &str, app_id: AppId)
        -> Result<String, AuthError>;

    /// Create an account and start confirmation delivery in the background.
    ///
    /// # Returns
    /// New user identifier and a handle on the delivery outcome
    ///
    /// # Errors
    /// * `UserExists` - Email is already registered
    /// * `PasswordHashing` - Hashing failed
    /// * `StoreUnavailable` - Storage failed
    async fn register(&self, command: RegisterCommand) -> Result<Registration, AuthError>;

    /// Report the admin flag of a user.
    ///
    /// # Errors
    /// * `NotFound` - No such user (distinct from "not an admin")
    /// * `StoreUnavailable` - Storage failed
    async fn is_admin(&self, user_id: UserId) -> Result<bool, AuthError>;

    /// Check a confirmation code submitted for an email.
    ///
    /// # Errors
    /// * `NotFound` - No such user or no code issued
    /// * `StoreUnavailable` - Storage failed
    async fn verify_confirmation(
        &self,
        email: &str,
        code: &str,
    ) -> Result<VerificationStatus, AuthError>;

    /// Send the stored confirmation code again.
    ///
    /// # Errors
    /// * `NotFound` - No such user
    /// * `Delivery` - Channel unreachable
    /// * `StoreUnavailable` - Storage failed
    async fn resend_confirmation(&self, email: &str) -> Result<ResendOutcome, AuthError>;

    /// Confirm the account owning a chat handle.
    ///
    /// Never fails; store errors are reported as `ExternalConfirmation::Error`.
    async fn confirm_by_external_identity(&self, handle: &str) -> ExternalConfirmation;
}

/// Persistence operations for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Returns
    /// Identifier assigned by the store
    ///
    /// # Errors
    /// * `AlreadyExists` - Email is already registered
    /// * `Unavailable` - Database operation failed
    async fn create(&self, user: NewUser) -> Result<UserId, StoreError>;

    /// Retrieve user by email (exact, case-sensitive match).
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Unavailable` - Database operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Read the admin flag of a user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `Unavailable` - Database operation failed
    async fn is_admin(&self, id: UserId) -> Result<bool, StoreError>;
}

/// Read access to provisioned applications.
#[async_trait]
pub trait ApplicationRepository: Send + Sync + 'static {
    /// Retrieve application by identifier.
    ///
    /// # Errors
    /// * `Unavailable` - Database operation failed
    async fn find_by_id(&self, id: AppId) -> Result<Option<Application>, StoreError>;
}

/// Persistence operations for confirmation codes.
#[async_trait]
pub trait ConfirmationRepository: Send + Sync + 'static {
    /// Store a fresh, unconfirmed code for a user.
    ///
    /// # Returns
    /// Record identifier
    ///
    /// # Errors
    /// * `AlreadyExists` - User already has a code
    /// * `Unavailable` - Database operation failed
    async fn save_code(&self, user_id: UserId, code: &ConfirmationCode) -> Result<i64, StoreError>;

    /// Retrieve the stored code and its confirmed flag.
    ///
    /// # Errors
    /// * `Unavailable` - Database operation failed
    async fn find_code(&self, user_id: UserId) -> Result<Option<ConfirmationRecord>, StoreError>;

    /// Atomically confirm if a code exists, is unconfirmed and equals `code` exactly.
    ///
    /// Of two racing calls with the right code, exactly one returns `true`.
    ///
    /// # Errors
    /// * `Unavailable` - Database operation failed
    async fn mark_confirmed(&self, user_id: UserId, code: &str) -> Result<bool, StoreError>;

    /// Atomically confirm the account owning a chat handle.
    ///
    /// When the user has no code on record, one is stored as already confirmed
    /// using `fallback_code`.
    ///
    /// # Returns
    /// `NotRegistered`, `AlreadyConfirmed` or `NowConfirmed`
    ///
    /// # Errors
    /// * `Unavailable` - Database operation failed
    async fn confirm_by_external_handle(
        &self,
        handle: &str,
        fallback_code: &ConfirmationCode,
    ) -> Result<ExternalConfirmation, StoreError>;
}

/// Outbound email delivery.
#[async_trait]
pub trait EmailSender: Send + Sync + 'static {
    /// Deliver a message.
    ///
    /// # Errors
    /// * `Unreachable` - Channel could not be reached
    /// * `Rejected` - Channel refused the message
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError>;
}

/// Source of confirmation codes.
pub trait CodeGenerator: Send + Sync + 'static {
    /// Produce a five-digit numeric code.
    fn generate(&self) -> ConfirmationCode;
}
