use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::cleared_session_headers;
use super::ApiError;
use super::ApiSuccess;
use crate::account::eraser::ErasureReport;
use crate::account::eraser::StepStatus;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

/// Erase the caller's own account and expire their session cookies.
pub async fn erase_account(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedAccount>,
    body: Option<Json<EraseAccountRequest>>,
) -> Result<(HeaderMap, ApiSuccess<ErasureReportData>), ApiError> {
    // A missing or unreadable body is the same as a missing phrase.
    let confirmation_phrase = body.and_then(|Json(body)| body.confirmation_phrase);
    let report = state
        .account_service
        .erase(&current.account.id, confirmation_phrase.as_deref())
        .await?;

    Ok((
        cleared_session_headers(state.cookie_secure)?,
        ApiSuccess::new(StatusCode::OK, (&report).into()),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EraseAccountRequest {
    #[serde(default)]
    confirmation_phrase: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErasureReportData {
    pub account_id: String,
    pub complete: bool,
    pub steps: Vec<ErasureStepData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErasureStepData {
    pub step: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected: Option<u64>,
}

impl From<&ErasureReport> for ErasureReportData {
    fn from(report: &ErasureReport) -> Self {
        Self {
            account_id: report.account_id.to_string(),
            complete: report.is_complete(),
            steps: report
                .steps
                .iter()
                .map(|outcome| {
                    let (status, affected) = match outcome.status {
                        StepStatus::Completed { affected } => ("completed", Some(affected)),
                        StepStatus::Failed => ("failed", None),
                    };
                    ErasureStepData {
                        step: outcome.step.as_str(),
                        status,
                        affected,
                    }
                })
                .collect(),
        }
    }
}
