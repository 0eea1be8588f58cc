use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::EmailError;
use crate::account::models::EmailAddress;
use crate::account::models::RegisterAccountCommand;
use crate::inbound::http::router::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

pub async fn register_account(
    State(state): State<AppState>,
    Json(body): Json<RegisterAccountRequest>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    state
        .account_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::CREATED, account.into()))
}

/// HTTP request body for registering an account (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterAccountRequest {
    email_address: String,
    name: String,
    #[serde(default)]
    phone: Option<String>,
    password: String,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterAccountRequestError {
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Name must not be empty")]
    EmptyName,

    #[error("Password must be at least {0} characters")]
    ShortPassword(usize),
}

impl RegisterAccountRequest {
    fn try_into_command(self) -> Result<RegisterAccountCommand, ParseRegisterAccountRequestError> {
        let email_address = EmailAddress::new(self.email_address)?;

        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ParseRegisterAccountRequestError::EmptyName);
        }

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ParseRegisterAccountRequestError::ShortPassword(
                MIN_PASSWORD_LENGTH,
            ));
        }

        let phone = self
            .phone
            .map(|phone| phone.trim().to_string())
            .filter(|phone| !phone.is_empty());

        Ok(RegisterAccountCommand::new(
            email_address,
            name,
            phone,
            self.password,
        ))
    }
}

impl From<ParseRegisterAccountRequestError> for ApiError {
    fn from(err: ParseRegisterAccountRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}
