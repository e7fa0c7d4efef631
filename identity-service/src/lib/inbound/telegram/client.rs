use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::messages::AnswerCallbackQuery;
use super::messages::ApiResponse;
use super::messages::GetUpdates;
use super::messages::SendMessage;
use super::messages::Update;

const API_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Api(String),
}

/// Minimal Bot API client over HTTPS.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TelegramClient {
    /// # Arguments
    /// * `bot_token` - Token issued by BotFather
    /// * `poll_timeout` - Long-poll timeout; the request timeout is set above it
    ///
    /// # Errors
    /// * `Transport` - HTTP client could not be built
    pub fn new(bot_token: &str, poll_timeout: Duration) -> Result<Self, TelegramError> {
        Self::with_base_url(API_BASE_URL, bot_token, poll_timeout)
    }

    pub fn with_base_url(
        base_url: &str,
        bot_token: &str,
        poll_timeout: Duration,
    ) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/bot{}", base_url.trim_end_matches('/'), bot_token),
        })
    }

    /// Long-poll for updates newer than `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: vec!["message", "callback_query"],
        };
        self.call("getUpdates", &request).await
    }

    pub async fn send_message(&self, message: &SendMessage) -> Result<(), TelegramError> {
        self.call::<_, serde_json::Value>("sendMessage", message)
            .await
            .map(|_| ())
    }

    pub async fn answer_callback_query(
        &self,
        answer: &AnswerCallbackQuery,
    ) -> Result<(), TelegramError> {
        self.call::<_, bool>("answerCallbackQuery", answer)
            .await
            .map(|_| ())
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        // The request url embeds the bot token and must not reach error messages
        let response: ApiResponse<T> = self
            .http
            .post(format!("{}/{}", self.endpoint, method))
            .json(body)
            .send()
            .await
            .map_err(|e| TelegramError::Transport(e.without_url()))?
            .json()
            .await
            .map_err(|e| TelegramError::Transport(e.without_url()))?;

        match response {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TelegramError::Api(
                description.unwrap_or_else(|| format!("{} failed", method)),
            )),
        }
    }
}
