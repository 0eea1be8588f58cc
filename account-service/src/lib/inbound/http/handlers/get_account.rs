use axum::http::StatusCode;
use axum::Extension;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedAccount;

/// Current account, as bound by the route's middleware.
pub async fn get_current_account(
    Extension(current): Extension<AuthenticatedAccount>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, (&current.account).into()))
}
