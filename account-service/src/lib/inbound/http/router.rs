use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::authenticate::authenticate;
use super::handlers::erase_account::erase_account;
use super::handlers::get_account::get_current_account;
use super::handlers::logout::logout;
use super::handlers::register_account::register_account;
use super::middleware::require_account;
use super::middleware::require_hospital_admin;
use super::middleware::require_trainer;
use crate::account::ports::AccountServicePort;

#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<dyn AccountServicePort>,
    pub authenticator: Arc<Authenticator>,
    pub cookie_secure: bool,
}

pub fn create_router(
    account_service: Arc<dyn AccountServicePort>,
    authenticator: Arc<Authenticator>,
    cookie_secure: bool,
) -> Router {
    let state = AppState {
        account_service,
        authenticator,
        cookie_secure,
    };

    let public_routes = Router::new()
        .route("/api/auth/login", post(authenticate))
        .route("/api/auth/logout", post(logout))
        .route("/api/accounts", post(register_account));

    let account_routes = Router::new()
        .route("/api/me", get(get_current_account).delete(erase_account))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_account,
        ));

    let hospital_routes = Router::new()
        .route("/api/hospital/me", get(get_current_account))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_hospital_admin,
        ));

    let trainer_routes = Router::new()
        .route("/api/trainer/me", get(get_current_account))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_trainer,
        ));

    // Headers are left out of the span: they carry session tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(account_routes)
        .merge(hospital_routes)
        .merge(trainer_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
