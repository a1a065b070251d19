use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::repository::{AssessmentId, AssessmentLog, AssessmentRepository, AssessmentView};
use super::service::{AssessmentService, AssessmentServiceError};
use crate::accounts::router::authenticate;
use crate::accounts::Authenticator;
use crate::repository::RepositoryError;

/// Body of a questionnaire submission: question key to response label.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentSubmission {
    pub answers: BTreeMap<String, String>,
}

pub(crate) struct AssessmentState<R, L> {
    service: Arc<AssessmentService<R, L>>,
    authenticator: Arc<dyn Authenticator>,
}

impl<R, L> Clone for AssessmentState<R, L> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

/// Router builder exposing assessment submission, history, and stateless scoring.
pub fn assessment_router<R, L>(
    service: Arc<AssessmentService<R, L>>,
    authenticator: Arc<dyn Authenticator>,
) -> Router
where
    R: AssessmentRepository + 'static,
    L: AssessmentLog + 'static,
{
    Router::new()
        .route(
            "/api/v1/assessments",
            post(submit_handler::<R, L>).get(history_handler::<R, L>),
        )
        .route(
            "/api/v1/assessments/:assessment_id",
            get(detail_handler::<R, L>),
        )
        .route("/api/v1/score", post(score_handler::<R, L>))
        .with_state(AssessmentState {
            service,
            authenticator,
        })
}

pub(crate) async fn submit_handler<R, L>(
    State(state): State<AssessmentState<R, L>>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<AssessmentSubmission>,
) -> Response
where
    R: AssessmentRepository + 'static,
    L: AssessmentLog + 'static,
{
    let user = match authenticate(state.authenticator.as_ref(), &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let service = Arc::clone(&state.service);
    let outcome =
        tokio::task::spawn_blocking(move || service.submit(&user, &submission.answers)).await;

    match outcome {
        Ok(Ok(record)) => (StatusCode::CREATED, axum::Json(record.view())).into_response(),
        Ok(Err(err)) => assessment_error_response(err),
        Err(join_error) => {
            error!(error = %join_error, "assessment worker failed");
            internal_error()
        }
    }
}

pub(crate) async fn history_handler<R, L>(
    State(state): State<AssessmentState<R, L>>,
    headers: HeaderMap,
) -> Response
where
    R: AssessmentRepository + 'static,
    L: AssessmentLog + 'static,
{
    let user = match authenticate(state.authenticator.as_ref(), &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.history(&user) {
        Ok(records) => {
            let views: Vec<AssessmentView> = records.iter().map(|record| record.view()).collect();
            (StatusCode::OK, axum::Json(json!({ "assessments": views }))).into_response()
        }
        Err(err) => assessment_error_response(err),
    }
}

pub(crate) async fn detail_handler<R, L>(
    State(state): State<AssessmentState<R, L>>,
    headers: HeaderMap,
    Path(assessment_id): Path<u64>,
) -> Response
where
    R: AssessmentRepository + 'static,
    L: AssessmentLog + 'static,
{
    let user = match authenticate(state.authenticator.as_ref(), &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.get(&user, AssessmentId(assessment_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(err) => assessment_error_response(err),
    }
}

pub(crate) async fn score_handler<R, L>(
    State(state): State<AssessmentState<R, L>>,
    axum::Json(submission): axum::Json<AssessmentSubmission>,
) -> Response
where
    R: AssessmentRepository + 'static,
    L: AssessmentLog + 'static,
{
    match state.service.score(&submission.answers) {
        Ok(card) => (StatusCode::OK, axum::Json(card)).into_response(),
        Err(err) => assessment_error_response(err),
    }
}

fn assessment_error_response(err: AssessmentServiceError) -> Response {
    let status = match &err {
        AssessmentServiceError::Answers(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentServiceError::NotFound
        | AssessmentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Forbidden => StatusCode::FORBIDDEN,
        AssessmentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AssessmentServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn internal_error() -> Response {
    let payload = json!({ "error": "internal error" });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
