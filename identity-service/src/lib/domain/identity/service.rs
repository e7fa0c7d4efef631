use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenSubject;

use crate::identity::confirmation::ConfirmationEngine;
use crate::identity::errors::AuthError;
use crate::identity::errors::ConfirmationError;
use crate::identity::errors::StoreError;
use crate::identity::models::AppId;
use crate::identity::models::ConfirmationOutcome;
use crate::identity::models::ExternalConfirmation;
use crate::identity::models::NewUser;
use crate::identity::models::RegisterCommand;
use crate::identity::models::Registration;
use crate::identity::models::ResendOutcome;
use crate::identity::models::User;
use crate::identity::models::UserId;
use crate::identity::models::VerificationStatus;
use crate::identity::ports::ApplicationRepository;
use crate::identity::ports::AuthServicePort;
use crate::identity::ports::ConfirmationRepository;
use crate::identity::ports::UserRepository;

/// Domain service implementation for authentication use cases.
///
/// Stateless between calls; all state lives in the injected stores.
pub struct AuthService<UR, AR, CR>
where
    UR: UserRepository,
    AR: ApplicationRepository,
    CR: ConfirmationRepository,
{
    users: Arc<UR>,
    applications: Arc<AR>,
    confirmations: ConfirmationEngine<CR>,
    authenticator: Arc<Authenticator>,
}

impl<UR, AR, CR> AuthService<UR, AR, CR>
where
    UR: UserRepository,
    AR: ApplicationRepository,
    CR: ConfirmationRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - User persistence implementation
    /// * `applications` - Application lookup implementation
    /// * `confirmations` - Confirmation code engine
    /// * `authenticator` - Password hashing and token issuance with the configured ttl
    ///
    /// # Returns
    /// Configured auth service instance
    pub fn new(
        users: Arc<UR>,
        applications: Arc<AR>,
        confirmations: ConfirmationEngine<CR>,
        authenticator: Arc<Authenticator>,
    ) -> Self {
        Self {
            users,
            applications,
            confirmations,
            authenticator,
        }
    }

    async fn user_by_email(&self, op: &'static str, email: &str) -> Result<User, AuthError> {
        self.users
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::store(op, e))?
            .ok_or_else(|| AuthError::NotFound(format!("user {}", email)))
    }
}

#[async_trait]
impl<UR, AR, CR> AuthServicePort for AuthService<UR, AR, CR>
where
    UR: UserRepository,
    AR: ApplicationRepository,
    CR: ConfirmationRepository,
{
    async fn login(
        &self,
        email: &str,
        password: &str,
        app_id: AppId,
    ) -> Result<String, AuthError> {
        const OP: &str = "auth.login";

        // Email stays out of login logs
        tracing::info!(app_id = %app_id, "Attempting to login user");

        let Some(user) = self
            .users
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::store(OP, e))?
        else {
            // Unknown emails pay the same hashing cost as a wrong password
            self.authenticator.verify_decoy(password);
            tracing::info!(app_id = %app_id, "Invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        let matches = self
            .authenticator
            .verify_password(password, &user.password_hash)
            .map_err(|e| AuthError::PasswordHashing {
                op: OP,
                message: e.to_string(),
            })?;
        if !matches {
            tracing::info!(app_id = %app_id, "Invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let app = self
            .applications
            .find_by_id(app_id)
            .await
            .map_err(|e| AuthError::store(OP, e))?
            .ok_or(AuthError::InvalidAppId(app_id))?;

        let subject =
            TokenSubject::new(user.id.0, &user.email, app.id.0).with_admin(user.is_admin);
        let token = self
            .authenticator
            .issue_token(&subject, &app.secret)
            .map_err(|e| AuthError::Issuance {
                op: OP,
                message: e.to_string(),
            })?;

        tracing::info!(user_id = %user.id, app_id = %app_id, "User logged in successfully");

        Ok(token)
    }

    async fn register(&self, command: RegisterCommand) -> Result<Registration, AuthError> {
        const OP: &str = "auth.register";

        tracing::info!("Registering user");

        let password_hash = self
            .authenticator
            .hash_password(&command.password)
            .map_err(|e| AuthError::PasswordHashing {
                op: OP,
                message: e.to_string(),
            })?;

        let email = command.email.as_str().to_string();
        let user_id = self
            .users
            .create(NewUser {
                email: email.clone(),
                password_hash,
                profile: command.profile,
            })
            .await
            .map_err(|e| match e {
                StoreError::AlreadyExists(_) => AuthError::UserExists(email.clone()),
                other => AuthError::store(OP, other),
            })?;

        tracing::info!(user_id = %user_id, "User registered");

        // Registration is durable from here; delivery failures only surface via the handle
        let delivery = self.confirmations.spawn_issue_and_dispatch(user_id, email);

        Ok(Registration { user_id, delivery })
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, AuthError> {
        const OP: &str = "auth.is_admin";

        self.users.is_admin(user_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => AuthError::NotFound(format!("user {}", user_id)),
            other => AuthError::store(OP, other),
        })
    }

    async fn verify_confirmation(
        &self,
        email: &str,
        code: &str,
    ) -> Result<VerificationStatus, AuthError> {
        const OP: &str = "auth.verify_confirmation";

        let user = self.user_by_email(OP, email).await?;

        let outcome = self
            .confirmations
            .verify(user.id, code)
            .await
            .map_err(|e| AuthError::store(OP, e))?;

        tracing::info!(user_id = %user.id, outcome = ?outcome, "Confirmation code checked");

        match outcome {
            ConfirmationOutcome::Confirmed => Ok(VerificationStatus::Confirmed),
            ConfirmationOutcome::AlreadyConfirmed => Ok(VerificationStatus::AlreadyConfirmed),
            ConfirmationOutcome::Mismatch => Ok(VerificationStatus::Mismatch),
            ConfirmationOutcome::NotFound => Err(AuthError::NotFound(format!(
                "confirmation code for user {}",
                user.id
            ))),
        }
    }

    async fn resend_confirmation(&self, email: &str) -> Result<ResendOutcome, AuthError> {
        const OP: &str = "auth.resend_confirmation";

        let user = self.user_by_email(OP, email).await?;

        let outcome = self
            .confirmations
            .resend(user.id, &user.email)
            .await
            .map_err(|e| match e {
                ConfirmationError::Delivery(e) => AuthError::Delivery(e),
                ConfirmationError::Store(e) => AuthError::store(OP, e),
                ConfirmationError::TaskFailed(message) => {
                    AuthError::StoreUnavailable { op: OP, message }
                }
            })?;

        tracing::info!(user_id = %user.id, outcome = ?outcome, "Confirmation resend handled");

        Ok(outcome)
    }

    async fn confirm_by_external_identity(&self, handle: &str) -> ExternalConfirmation {
        let outcome = self.confirmations.confirm_by_external_identity(handle).await;
        tracing::info!(outcome = ?outcome, "External identity confirmation handled");
        outcome
    }
}
