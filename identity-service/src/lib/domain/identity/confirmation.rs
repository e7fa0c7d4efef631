use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::identity::errors::ConfirmationError;
use crate::identity::errors::DeliveryError;
use crate::identity::errors::StoreError;
use crate::identity::models::ConfirmationCode;
use crate::identity::models::ConfirmationOutcome;
use crate::identity::models::EmailMessage;
use crate::identity::models::ExternalConfirmation;
use crate::identity::models::ResendOutcome;
use crate::identity::models::UserId;
use crate::identity::ports::CodeGenerator;
use crate::identity::ports::ConfirmationRepository;
use crate::identity::ports::EmailSender;

const CONFIRMATION_SUBJECT: &str = "Confirmation email";

/// Handle on a confirmation delivery running in the background.
///
/// Dropping the handle detaches the task; it still runs to completion.
#[derive(Debug)]
pub struct DeliveryHandle(JoinHandle<Result<(), ConfirmationError>>);

impl DeliveryHandle {
    /// Wait for the delivery to finish and return its outcome.
    ///
    /// # Errors
    /// * `Store` - Code could not be persisted
    /// * `Delivery` - Code was persisted but could not be sent
    /// * `TaskFailed` - Task panicked or was cancelled
    pub async fn outcome(self) -> Result<(), ConfirmationError> {
        self.0
            .await
            .map_err(|e| ConfirmationError::TaskFailed(e.to_string()))?
    }
}

/// Issues, delivers and checks one-time confirmation codes.
pub struct ConfirmationEngine<CR>
where
    CR: ConfirmationRepository,
{
    repository: Arc<CR>,
    email_sender: Arc<dyn EmailSender>,
    code_generator: Arc<dyn CodeGenerator>,
    sender_address: String,
}

impl<CR> Clone for ConfirmationEngine<CR>
where
    CR: ConfirmationRepository,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            email_sender: Arc::clone(&self.email_sender),
            code_generator: Arc::clone(&self.code_generator),
            sender_address: self.sender_address.clone(),
        }
    }
}

impl<CR> ConfirmationEngine<CR>
where
    CR: ConfirmationRepository,
{
    /// # Arguments
    /// * `repository` - Confirmation code persistence
    /// * `email_sender` - Outbound email channel
    /// * `code_generator` - Source of codes
    /// * `sender_address` - `From` address on confirmation emails
    pub fn new(
        repository: Arc<CR>,
        email_sender: Arc<dyn EmailSender>,
        code_generator: Arc<dyn CodeGenerator>,
        sender_address: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            email_sender,
            code_generator,
            sender_address: sender_address.into(),
        }
    }

    pub fn generate(&self) -> ConfirmationCode {
        self.code_generator.generate()
    }

    /// Send a code to a recipient inside a human-readable message.
    ///
    /// # Errors
    /// * `DeliveryError` - Email channel failed
    pub async fn dispatch_by_email(
        &self,
        code: &ConfirmationCode,
        recipient: &str,
    ) -> Result<(), DeliveryError> {
        let message = EmailMessage {
            from: self.sender_address.clone(),
            to: recipient.to_string(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            body: format!("Hello, your confirmation code is {}", code.as_str()),
        };

        self.email_sender.send(&message).await
    }

    /// Generate a code and store it for a user.
    ///
    /// # Errors
    /// * `StoreError` - Persistence failed
    pub async fn issue(&self, user_id: UserId) -> Result<ConfirmationCode, StoreError> {
        let code = self.generate();
        self.repository.save_code(user_id, &code).await?;
        Ok(code)
    }

    /// Issue a code and email it.
    ///
    /// The code is stored before it is sent, so a delivery failure leaves a code
    /// that `resend` can deliver later. A user who already has a code on record,
    /// for example after confirming through a chat handle first, gets no email.
    ///
    /// # Errors
    /// * `Store` - Persistence failed; nothing was sent
    /// * `Delivery` - Code is stored but the email was not sent
    pub async fn issue_and_dispatch(
        &self,
        user_id: UserId,
        recipient: &str,
    ) -> Result<(), ConfirmationError> {
        let code = match self.issue(user_id).await {
            Ok(code) => code,
            Err(StoreError::AlreadyExists(_)) => {
                tracing::info!(user_id = %user_id, "Confirmation code already issued; skipping delivery");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        self.dispatch_by_email(&code, recipient).await?;
        Ok(())
    }

    /// Run `issue_and_dispatch` on a background task.
    ///
    /// The outcome is logged and also available through the returned handle.
    pub fn spawn_issue_and_dispatch(&self, user_id: UserId, recipient: String) -> DeliveryHandle {
        let engine = self.clone();

        let task = tokio::spawn(async move {
            let result = engine.issue_and_dispatch(user_id, &recipient).await;
            match &result {
                Ok(()) => tracing::info!(user_id = %user_id, "Confirmation code delivered"),
                Err(e) => tracing::error!(
                    user_id = %user_id,
                    error = %e,
                    "Confirmation code delivery failed"
                ),
            }
            result
        });

        DeliveryHandle(task)
    }

    /// Check a supplied code and confirm the user on an exact match.
    ///
    /// The confirmation itself is a single store check-and-set; the follow-up read
    /// only classifies why it did not apply.
    ///
    /// # Errors
    /// * `StoreError` - Persistence failed
    pub async fn verify(
        &self,
        user_id: UserId,
        supplied: &str,
    ) -> Result<ConfirmationOutcome, StoreError> {
        if self.repository.mark_confirmed(user_id, supplied).await? {
            return Ok(ConfirmationOutcome::Confirmed);
        }

        let outcome = match self.repository.find_code(user_id).await? {
            None => ConfirmationOutcome::NotFound,
            Some(record) if record.confirmed => ConfirmationOutcome::AlreadyConfirmed,
            Some(_) => ConfirmationOutcome::Mismatch,
        };

        Ok(outcome)
    }

    /// Deliver the stored code again, or issue one if none was stored.
    ///
    /// # Errors
    /// * `Store` - Persistence failed
    /// * `Delivery` - Email channel failed
    pub async fn resend(
        &self,
        user_id: UserId,
        recipient: &str,
    ) -> Result<ResendOutcome, ConfirmationError> {
        match self.repository.find_code(user_id).await? {
            Some(record) if record.confirmed => Ok(ResendOutcome::AlreadyConfirmed),
            Some(record) => {
                self.dispatch_by_email(&record.code, recipient).await?;
                Ok(ResendOutcome::Sent)
            }
            None => {
                self.issue_and_dispatch(user_id, recipient).await?;
                Ok(ResendOutcome::Sent)
            }
        }
    }

    /// Confirm the account that owns a chat handle.
    ///
    /// Store failures collapse into `ExternalConfirmation::Error` after being logged.
    pub async fn confirm_by_external_identity(&self, handle: &str) -> ExternalConfirmation {
        let fallback = self.generate();

        match self
            .repository
            .confirm_by_external_handle(handle, &fallback)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "External identity confirmation failed");
                ExternalConfirmation::Error
            }
        }
    }
}
