use std::sync::Arc;

use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use super::*;
use crate::accounts::User;
use crate::test_support::{
    bearer_for, offline_pipeline, raw_answers, read_json_body, sample_user, BrokenLog,
    FixedAuthenticator, MemoryAssessments, RecordingLog,
};

fn service() -> (
    AssessmentService<MemoryAssessments, RecordingLog>,
    Arc<MemoryAssessments>,
    Arc<RecordingLog>,
) {
    let repository = Arc::new(MemoryAssessments::default());
    let log = Arc::new(RecordingLog::default());
    let service = AssessmentService::new(offline_pipeline(), repository.clone(), log.clone());
    (service, repository, log)
}

fn json_request(
    method: &str,
    uri: &str,
    user: Option<&User>,
    body: serde_json::Value,
) -> Request<axum::body::Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, bearer_for(user));
    }
    builder
        .body(axum::body::Body::from(body.to_string()))
        .expect("request builds")
}

#[test]
fn submit_scores_stores_and_logs() {
    let (service, repository, log) = service();
    let user = sample_user(1);

    let record = service
        .submit(&user, &raw_answers("A", "Low"))
        .expect("submission accepted");

    assert_eq!(record.stress_score, 0.0);
    assert_eq!(record.recommendation.category, ContentCategory::Meditation);
    assert_eq!(record.recommendation.source, RecommendationSource::Fallback);
    assert_eq!(record.summary.source, SummarySource::Fallback);
    assert_eq!(record.responses["q11"], "Low");
    assert_eq!(
        repository.fetch(record.id).expect("fetch"),
        Some(record.clone())
    );
    assert_eq!(log.rows(), vec![(user.email.clone(), record.id)]);
}

#[test]
fn high_stress_submission_recommends_professional_therapy() {
    let (service, _, _) = service();
    let record = service
        .submit(&sample_user(2), &raw_answers("E", "High"))
        .expect("submission accepted");

    assert_eq!(record.stress_score, 10.0);
    assert_eq!(
        record.recommendation.category,
        ContentCategory::ProfessionalTherapy
    );
    assert_eq!(record.recommendation.confidence, 0.85);
}

#[test]
fn invalid_answers_are_rejected_before_storage() {
    let (service, repository, log) = service();
    let user = sample_user(3);
    let mut raw = raw_answers("B", "Medium");
    raw.remove("q12");

    match service.submit(&user, &raw) {
        Err(AssessmentServiceError::Answers(AnswerError::Missing(question))) => {
            assert_eq!(question, "q12")
        }
        other => panic!("expected missing answer, got {other:?}"),
    }
    assert!(repository.list_for_user(user.id).expect("list").is_empty());
    assert!(log.rows().is_empty());
}

#[test]
fn log_failures_do_not_fail_the_submission() {
    let repository = Arc::new(MemoryAssessments::default());
    let service = AssessmentService::new(offline_pipeline(), repository, Arc::new(BrokenLog));

    let record = service.submit(&sample_user(4), &raw_answers("C", "Medium"));
    assert!(record.is_ok());
}

#[test]
fn records_are_private_to_their_owner() {
    let (service, _, _) = service();
    let owner = sample_user(5);
    let other = sample_user(6);
    let record = service
        .submit(&owner, &raw_answers("A", "Low"))
        .expect("submission accepted");

    assert_eq!(service.get(&owner, record.id).expect("owner reads").id, record.id);
    assert!(matches!(
        service.get(&other, record.id),
        Err(AssessmentServiceError::Forbidden)
    ));
    assert!(matches!(
        service.get(&owner, AssessmentId(u64::MAX)),
        Err(AssessmentServiceError::NotFound)
    ));
}

#[test]
fn history_is_newest_first() {
    let (service, _, _) = service();
    let user = sample_user(7);
    let first = service
        .submit(&user, &raw_answers("A", "Low"))
        .expect("first");
    let second = service
        .submit(&user, &raw_answers("D", "High"))
        .expect("second");
    service
        .submit(&sample_user(8), &raw_answers("A", "Low"))
        .expect("someone else");

    let history = service.history(&user).expect("history");
    let ids: Vec<AssessmentId> = history.iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn submit_route_requires_authentication() {
    let (service, _, _) = service();
    let router = assessment_router(Arc::new(service), FixedAuthenticator::with_users(vec![]));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/assessments",
            None,
            serde_json::json!({ "answers": raw_answers("A", "Low") }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn submit_route_returns_record_with_details() {
    let (service, _, _) = service();
    let user = sample_user(9);
    let router = assessment_router(
        Arc::new(service),
        FixedAuthenticator::with_users(vec![user.clone()]),
    );

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/assessments",
            Some(&user),
            serde_json::json!({ "answers": raw_answers("A", "Low") }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["stress_score"], 0.0);
    assert_eq!(body["recommendation"]["category"], "Meditation");
    assert_eq!(body["recommendation"]["source"], "fallback");
    assert!(body["details"]["techniques"].as_array().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["summary"]["source"], "fallback");
}

#[tokio::test]
async fn detail_route_forbids_other_users() {
    let (service, _, _) = service();
    let owner = sample_user(10);
    let intruder = sample_user(11);
    let record = service
        .submit(&owner, &raw_answers("A", "Low"))
        .expect("submission accepted");
    let router = assessment_router(
        Arc::new(service),
        FixedAuthenticator::with_users(vec![owner, intruder.clone()]),
    );

    let response = router
        .oneshot(
            Request::get(format!("/api/v1/assessments/{}", record.id.0))
                .header(header::AUTHORIZATION, bearer_for(&intruder))
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn score_route_is_stateless_and_validates_answers() {
    let (service, repository, _) = service();
    let router = assessment_router(Arc::new(service), FixedAuthenticator::with_users(vec![]));

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/score",
            None,
            serde_json::json!({ "answers": raw_answers("E", "High") }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["stress_score"], 10.0);
    assert_eq!(body["high_stress_count"], 10);
    assert_eq!(body["recommendation"]["category"], "Professional Therapy");
    assert!(repository.list_for_user(crate::accounts::UserId(0)).expect("list").is_empty());

    let mut invalid = raw_answers("E", "High");
    invalid.insert("q3".to_string(), "Z".to_string());
    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/score",
            None,
            serde_json::json!({ "answers": invalid }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
