use async_trait::async_trait;

use crate::identity::errors::DeliveryError;
use crate::identity::models::EmailMessage;
use crate::identity::ports::EmailSender;

/// Development sender that logs instead of delivering.
///
/// The body is never logged because it carries the confirmation code.
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        tracing::info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Email send stub"
        );
        Ok(())
    }
}
