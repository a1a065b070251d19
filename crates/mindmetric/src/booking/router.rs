use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::error;

use super::domain::{BookingId, BookingRequest};
use super::repository::BookingRepository;
use super::service::{BookingError, BookingService};
use crate::accounts::router::authenticate;
use crate::accounts::Authenticator;

pub(crate) struct BookingState<R> {
    service: Arc<BookingService<R>>,
    authenticator: Arc<dyn Authenticator>,
}

impl<R> Clone for BookingState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

/// Router builder exposing consultation booking endpoints.
pub fn booking_router<R>(
    service: Arc<BookingService<R>>,
    authenticator: Arc<dyn Authenticator>,
) -> Router
where
    R: BookingRepository + 'static,
{
    Router::new()
        .route("/api/v1/bookings", post(book_handler::<R>))
        .route("/api/v1/bookings/:booking_id", get(detail_handler::<R>))
        .with_state(BookingState {
            service,
            authenticator,
        })
}

pub(crate) async fn book_handler<R>(
    State(state): State<BookingState<R>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<BookingRequest>,
) -> Response
where
    R: BookingRepository + 'static,
{
    let user = match authenticate(state.authenticator.as_ref(), &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let service = Arc::clone(&state.service);
    match tokio::task::spawn_blocking(move || service.book(&user, request)).await {
        Ok(Ok(booking)) => (StatusCode::CREATED, axum::Json(booking)).into_response(),
        Ok(Err(err)) => booking_error_response(err),
        Err(join_error) => {
            error!(error = %join_error, "booking worker failed");
            let payload = json!({ "error": "internal error" });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn detail_handler<R>(
    State(state): State<BookingState<R>>,
    headers: HeaderMap,
    Path(booking_id): Path<u64>,
) -> Response
where
    R: BookingRepository + 'static,
{
    let user = match authenticate(state.authenticator.as_ref(), &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.get(&user, BookingId(booking_id)) {
        Ok(booking) => (StatusCode::OK, axum::Json(booking)).into_response(),
        Err(err) => booking_error_response(err),
    }
}

fn booking_error_response(err: BookingError) -> Response {
    let status = match &err {
        BookingError::PhoneRequired => StatusCode::BAD_REQUEST,
        BookingError::SlotTaken => StatusCode::CONFLICT,
        BookingError::NotFound => StatusCode::NOT_FOUND,
        BookingError::Forbidden => StatusCode::FORBIDDEN,
        BookingError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
