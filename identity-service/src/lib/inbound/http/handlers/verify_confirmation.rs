use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::require;
use super::ApiError;
use super::ApiSuccess;
use crate::identity::models::VerificationStatus;
use crate::identity::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn verify_confirmation<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<VerifyConfirmationRequestBody>,
) -> Result<ApiSuccess<VerifyConfirmationResponseData>, ApiError> {
    require("email", &body.email)?;
    require("code", &body.code)?;

    state
        .auth_service
        .verify_confirmation(&body.email, &body.code)
        .await
        .map_err(ApiError::from)
        .map(|status| {
            ApiSuccess::new(
                StatusCode::OK,
                VerifyConfirmationResponseData {
                    status: status.into(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifyConfirmationRequestBody {
    email: String,
    code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyConfirmationResponseData {
    pub status: VerificationStatusData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatusData {
    Confirmed,
    AlreadyConfirmed,
    Mismatch,
}

impl From<VerificationStatus> for VerificationStatusData {
    fn from(status: VerificationStatus) -> Self {
        match status {
            VerificationStatus::Confirmed => Self::Confirmed,
            VerificationStatus::AlreadyConfirmed => Self::AlreadyConfirmed,
            VerificationStatus::Mismatch => Self::Mismatch,
        }
    }
}
