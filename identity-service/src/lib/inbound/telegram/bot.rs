use std::sync::Arc;
use std::time::Duration;

use super::client::TelegramClient;
use super::client::TelegramError;
use super::messages::AnswerCallbackQuery;
use super::messages::InlineKeyboardButton;
use super::messages::InlineKeyboardMarkup;
use super::messages::SendMessage;
use super::messages::Update;
use crate::identity::models::ExternalConfirmation;
use crate::identity::ports::AuthServicePort;

const PROMPT_TEXT: &str = "Press the button to verify your account";
const VERIFY_BUTTON_TEXT: &str = "Verify me";
const VERIFY_CALLBACK_DATA: &str = "verify_me";

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Fixed user-facing text for each confirmation outcome.
pub fn reply_text(outcome: ExternalConfirmation) -> &'static str {
    match outcome {
        ExternalConfirmation::AlreadyConfirmed => "You already verified",
        ExternalConfirmation::NotRegistered => "You aren't registered yet",
        ExternalConfirmation::NowConfirmed => "You are now verified",
        ExternalConfirmation::Error => "An unexpected error occurred",
    }
}

/// What the bot sends back for one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReply {
    pub answer: Option<AnswerCallbackQuery>,
    pub message: SendMessage,
}

/// Decide the reply to an update.
///
/// A button press confirms the account owning the sender's username. Any other
/// message is answered with the verification prompt.
pub async fn plan_reply<S>(auth_service: &S, update: &Update) -> Option<BotReply>
where
    S: AuthServicePort + ?Sized,
{
    if let Some(query) = &update.callback_query {
        let chat_id = query
            .message
            .as_ref()
            .map(|message| message.chat.id)
            .unwrap_or(query.from.id);

        let outcome = match query.from.username.as_deref() {
            Some(handle) if !handle.is_empty() => {
                auth_service.confirm_by_external_identity(handle).await
            }
            // Without a username there is nothing to match a registration against
            _ => ExternalConfirmation::NotRegistered,
        };

        return Some(BotReply {
            answer: Some(AnswerCallbackQuery {
                callback_query_id: query.id.clone(),
            }),
            message: SendMessage {
                chat_id,
                text: reply_text(outcome).to_string(),
                reply_markup: None,
            },
        });
    }

    let message = update.message.as_ref()?;
    Some(BotReply {
        answer: None,
        message: SendMessage {
            chat_id: message.chat.id,
            text: PROMPT_TEXT.to_string(),
            reply_markup: Some(InlineKeyboardMarkup {
                inline_keyboard: vec![vec![InlineKeyboardButton {
                    text: VERIFY_BUTTON_TEXT.to_string(),
                    callback_data: VERIFY_CALLBACK_DATA.to_string(),
                }]],
            }),
        },
    })
}

/// Long-poll loop confirming accounts through Telegram.
pub struct TelegramBot<S: AuthServicePort> {
    client: TelegramClient,
    auth_service: Arc<S>,
    poll_timeout_secs: u64,
}

impl<S: AuthServicePort> TelegramBot<S> {
    pub fn new(client: TelegramClient, auth_service: Arc<S>, poll_timeout_secs: u64) -> Self {
        Self {
            client,
            auth_service,
            poll_timeout_secs,
        }
    }

    /// Poll for updates until the task is aborted.
    ///
    /// Transport failures are logged and retried with a capped exponential back-off.
    pub async fn run(self) {
        tracing::info!(poll_timeout_secs = self.poll_timeout_secs, "Starting Telegram bot loop");

        let mut offset = 0;
        let mut backoff = INITIAL_BACKOFF;

        loop {
            let updates = match self
                .client
                .get_updates(offset, self.poll_timeout_secs)
                .await
            {
                Ok(updates) => {
                    backoff = INITIAL_BACKOFF;
                    updates
                }
                Err(e) => {
                    tracing::error!(error = %e, backoff_ms = backoff.as_millis(), "Failed to poll Telegram updates");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                if let Err(e) = self.handle_update(&update).await {
                    tracing::error!(
                        update_id = update.update_id,
                        error = %e,
                        "Failed to handle Telegram update"
                    );
                }
            }
        }
    }

    async fn handle_update(&self, update: &Update) -> Result<(), TelegramError> {
        let Some(reply) = plan_reply(self.auth_service.as_ref(), update).await else {
            tracing::trace!(update_id = update.update_id, "Ignoring update");
            return Ok(());
        };

        if let Some(answer) = &reply.answer {
            self.client.answer_callback_query(answer).await?;
        }
        self.client.send_message(&reply.message).await
    }
}
