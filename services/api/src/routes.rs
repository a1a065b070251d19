use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use mindmetric::accounts::{
    account_router, AccountService, Authenticator, SessionStore, UserRepository,
};
use mindmetric::assessment::{
    assessment_router, AssessmentLog, AssessmentRepository, AssessmentService,
};
use mindmetric::booking::{booking_router, BookingRepository, BookingService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_service_routes<U, S, R, L, B>(
    accounts: Arc<AccountService<U, S>>,
    assessments: Arc<AssessmentService<R, L>>,
    bookings: Arc<BookingService<B>>,
) -> axum::Router
where
    U: UserRepository + 'static,
    S: SessionStore + 'static,
    R: AssessmentRepository + 'static,
    L: AssessmentLog + 'static,
    B: BookingRepository + 'static,
{
    let authenticator: Arc<dyn Authenticator> = accounts.clone();

    account_router(accounts)
        .merge(assessment_router(assessments, authenticator.clone()))
        .merge(booking_router(bookings, authenticator))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
