use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;

use super::cleared_session_headers;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Expire both session cookies. Tokens stay valid until `exp`; there is no
/// server-side session to drop.
pub async fn logout(
    State(state): State<AppState>,
) -> Result<(HeaderMap, ApiSuccess<()>), ApiError> {
    Ok((
        cleared_session_headers(state.cookie_secure)?,
        ApiSuccess::new(StatusCode::OK, ()),
    ))
}
