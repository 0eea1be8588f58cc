use auth::credential::session_cookie;
use auth::RoleFamily;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use crate::account::models::LoginCommand;
use crate::inbound::http::router::AppState;

/// Log in and receive the session both in the body and as the primary cookie.
pub async fn authenticate(
    State(state): State<AppState>,
    Json(body): Json<AuthenticateRequestBody>,
) -> Result<(HeaderMap, ApiSuccess<AuthenticateResponseData>), ApiError> {
    let outcome = state
        .account_service
        .login(LoginCommand {
            identifier: body.email,
            password: body.password,
            family: body.role,
        })
        .await?;

    let max_age = (outcome.expires_at - Utc::now().timestamp()).max(0);
    let cookie = session_cookie(&outcome.access_token, max_age, state.cookie_secure)
        .map_err(|e| ApiError::InternalServerError(format!("Session cookie failed: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    Ok((
        headers,
        ApiSuccess::new(
            StatusCode::OK,
            AuthenticateResponseData {
                account: (&outcome.account).into(),
                token: outcome.access_token,
                expires_at: outcome.expires_at,
            },
        ),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthenticateRequestBody {
    email: String,
    password: String,
    /// Portal family; omitted by portals serving every role
    #[serde(default)]
    role: Option<RoleFamily>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticateResponseData {
    pub account: AccountData,
    pub token: String,
    pub expires_at: i64,
}
