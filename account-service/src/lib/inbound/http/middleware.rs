use auth::Carrier;
use auth::Claims;
use auth::RoleFamily;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;

use crate::account::models::Account;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::INVALID_SESSION;
use crate::inbound::http::router::AppState;

/// Extension type storing the bound account in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub account: Account,
    pub claims: Claims,
    pub carrier: Carrier,
}

/// Any signed-in account.
pub async fn require_account(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authenticate(&state, None, req, next).await
}

/// Hospital administrators with an active contract.
pub async fn require_hospital_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authenticate(&state, Some(RoleFamily::HospitalAdmin), req, next).await
}

/// Trainers only.
pub async fn require_trainer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authenticate(&state, Some(RoleFamily::Trainer), req, next).await
}

/// Resolve the request's credential, bind it to an account and hand the
/// result to the handler.
async fn authenticate(
    state: &AppState,
    expected: Option<RoleFamily>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = state
        .authenticator
        .resolve_credential(req.headers())
        .map_err(|_| ApiError::Unauthorized(INVALID_SESSION.to_string()))?;

    let account = state
        .account_service
        .bind(&credential.claims, expected)
        .await?;

    tracing::debug!(
        account_id = %account.id,
        carrier = credential.carrier.as_str(),
        "Request authenticated"
    );

    req.extensions_mut().insert(AuthenticatedAccount {
        account,
        claims: credential.claims,
        carrier: credential.carrier,
    });

    Ok(next.run(req).await)
}
