use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::require;
use super::ApiError;
use super::ApiSuccess;
use crate::identity::models::ResendOutcome;
use crate::identity::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn resend_confirmation<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<ResendConfirmationRequestBody>,
) -> Result<ApiSuccess<ResendConfirmationResponseData>, ApiError> {
    require("email", &body.email)?;

    state
        .auth_service
        .resend_confirmation(&body.email)
        .await
        .map_err(ApiError::from)
        .map(|outcome| {
            ApiSuccess::new(
                StatusCode::OK,
                ResendConfirmationResponseData {
                    status: outcome.into(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResendConfirmationRequestBody {
    email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResendConfirmationResponseData {
    pub status: ResendStatusData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResendStatusData {
    Sent,
    AlreadyConfirmed,
}

impl From<ResendOutcome> for ResendStatusData {
    fn from(outcome: ResendOutcome) -> Self {
        match outcome {
            ResendOutcome::Sent => Self::Sent,
            ResendOutcome::AlreadyConfirmed => Self::AlreadyConfirmed,
        }
    }
}
