use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;
use tracing::error;

use super::domain::{LoginRequest, SessionToken, SignupRequest, User};
use super::repository::{SessionStore, UserRepository};
use super::service::{AccountError, AccountService, Authenticator};

/// Router builder exposing signup, login, and logout.
pub fn account_router<U, S>(service: Arc<AccountService<U, S>>) -> Router
where
    U: UserRepository + 'static,
    S: SessionStore + 'static,
{
    Router::new()
        .route("/api/v1/accounts/signup", post(signup_handler::<U, S>))
        .route("/api/v1/accounts/login", post(login_handler::<U, S>))
        .route("/api/v1/accounts/logout", post(logout_handler::<U, S>))
        .with_state(service)
}

pub(crate) async fn signup_handler<U, S>(
    State(service): State<Arc<AccountService<U, S>>>,
    axum::Json(request): axum::Json<SignupRequest>,
) -> Response
where
    U: UserRepository + 'static,
    S: SessionStore + 'static,
{
    match tokio::task::spawn_blocking(move || service.signup(request)).await {
        Ok(Ok(grant)) => (StatusCode::CREATED, axum::Json(grant)).into_response(),
        Ok(Err(err)) => account_error_response(err),
        Err(join_error) => worker_failed(join_error),
    }
}

pub(crate) async fn login_handler<U, S>(
    State(service): State<Arc<AccountService<U, S>>>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response
where
    U: UserRepository + 'static,
    S: SessionStore + 'static,
{
    match tokio::task::spawn_blocking(move || service.login(request)).await {
        Ok(Ok(grant)) => (StatusCode::OK, axum::Json(grant)).into_response(),
        Ok(Err(err)) => account_error_response(err),
        Err(join_error) => worker_failed(join_error),
    }
}

pub(crate) async fn logout_handler<U, S>(
    State(service): State<Arc<AccountService<U, S>>>,
    headers: HeaderMap,
) -> Response
where
    U: UserRepository + 'static,
    S: SessionStore + 'static,
{
    let Some(token) = bearer_token(&headers) else {
        return account_error_response(AccountError::Unauthenticated);
    };
    match service.logout(&token) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => account_error_response(err),
    }
}

fn worker_failed(join_error: tokio::task::JoinError) -> Response {
    error!(error = %join_error, "account worker failed");
    let payload = json!({ "error": "internal server error" });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}

/// Extract the `Authorization: Bearer <token>` credential.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| SessionToken(token.to_string()))
}

/// Resolve the caller, or produce the 401/500 response to send instead.
pub(crate) fn authenticate(
    authenticator: &dyn Authenticator,
    headers: &HeaderMap,
) -> Result<User, Response> {
    let token = bearer_token(headers)
        .ok_or_else(|| account_error_response(AccountError::Unauthenticated))?;
    authenticator
        .authenticate(&token)
        .map_err(account_error_response)
}

pub(crate) fn account_error_response(err: AccountError) -> Response {
    let status = match &err {
        AccountError::EmailTaken => StatusCode::CONFLICT,
        AccountError::InvalidCredentials | AccountError::Unauthenticated => {
            StatusCode::UNAUTHORIZED
        }
        AccountError::InvalidSignup(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AccountError::Password(_) | AccountError::Repository(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
