use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::require;
use super::ApiError;
use super::ApiSuccess;
use crate::identity::errors::EmailError;
use crate::identity::models::EmailAddress;
use crate::identity::models::Profile;
use crate::identity::models::RegisterCommand;
use crate::identity::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn register<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<RegisterRequestBody>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    let command = body.try_into_command()?;

    // The delivery handle is dropped; the confirmation task keeps running
    state
        .auth_service
        .register(command)
        .await
        .map_err(ApiError::from)
        .map(|registration| {
            ApiSuccess::new(
                StatusCode::CREATED,
                RegisterResponseData {
                    user_id: registration.user_id.0,
                },
            )
        })
}

/// HTTP request body for registering an account (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequestBody {
    email: String,
    password: String,
    date_of_birth: String,
    full_name: String,
    phone_number: String,
    external_handle: String,
}

impl RegisterRequestBody {
    fn try_into_command(self) -> Result<RegisterCommand, ApiError> {
        require("email", &self.email)?;
        require("password", &self.password)?;
        require("date_of_birth", &self.date_of_birth)?;
        require("full_name", &self.full_name)?;
        require("phone_number", &self.phone_number)?;
        require("external_handle", &self.external_handle)?;

        let email = EmailAddress::new(self.email)?;
        let profile = Profile {
            date_of_birth: self.date_of_birth,
            full_name: self.full_name,
            phone_number: self.phone_number,
            external_handle: self.external_handle,
        };

        Ok(RegisterCommand::new(email, self.password, profile))
    }
}

impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub user_id: i64,
}
