//! In-memory fakes and fixtures shared by the unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde_json::Value;

use crate::accounts::{
    AccountError, Authenticator, SessionStore, SessionToken, SignupRequest, User, UserId,
    UserRepository,
};
use crate::assessment::summary::fallback_summary;
use crate::assessment::{
    ArtifactCache, AnswerSet, AssessmentId, AssessmentLog, AssessmentLogError, AssessmentPipeline,
    AssessmentRecord, AssessmentRepository, PersonalityResponse, RecommendationResolver,
    StressLevel, TemplateSummaryGenerator,
};
use crate::assessment::recommendation::fallback_recommendation;
use crate::booking::{Booking, BookingId, BookingRepository, BookingStatus, ConsultationType};
use crate::config::CounselorContact;
use crate::notifications::{
    BookingNotifier, EmailGateway, EmailMessage, MessagingGateway, NotificationError,
};
use crate::repository::RepositoryError;

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(crate) fn signup_request(email: &str) -> SignupRequest {
    SignupRequest {
        name: "Ada Lovelace".to_string(),
        age: 30,
        address: "12 Analytical Row".to_string(),
        email: email.to_string(),
        password: "correct horse battery".to_string(),
    }
}

pub(crate) fn sample_user(id: u64) -> User {
    User {
        id: UserId(id),
        name: "Ada Lovelace".to_string(),
        age: 30,
        address: "12 Analytical Row".to_string(),
        email: format!("user{id}@example.com"),
        password_hash: "$argon2id$placeholder".to_string(),
        created_at: Utc::now(),
    }
}

pub(crate) fn counselor() -> CounselorContact {
    CounselorContact {
        name: "Dr. Test".to_string(),
        email: "counselor@example.com".to_string(),
        clinic_location: "Test Clinic, Springfield".to_string(),
    }
}

/// Raw answers: every personality question `personality`, every stress question `stress`.
pub(crate) fn raw_answers(personality: &str, stress: &str) -> BTreeMap<String, String> {
    (1..=15)
        .map(|number| {
            let value = if number <= 10 { personality } else { stress };
            (format!("q{number}"), value.to_string())
        })
        .collect()
}

pub(crate) fn sample_record(id: u64, user_id: u64) -> AssessmentRecord {
    let answers = AnswerSet::new([PersonalityResponse::A; 10], [StressLevel::Low; 5]);
    AssessmentRecord {
        id: AssessmentId(id),
        user_id: UserId(user_id),
        stress_score: 0.0,
        recommendation: fallback_recommendation(0.0, 0),
        summary: fallback_summary(0.0, 30),
        responses: answers.to_raw(),
        created_at: Utc::now(),
    }
}

pub(crate) fn sample_booking(kind: ConsultationType) -> Booking {
    Booking {
        id: BookingId(42),
        user_id: UserId(1),
        session_date: NaiveDate::from_ymd_opt(2026, 11, 2).expect("valid date"),
        session_time: NaiveTime::from_hms_opt(14, 30, 0).expect("valid time"),
        consultation_type: kind,
        phone_number: "+15550100".to_string(),
        emergency_contact: None,
        notes: Some("first session".to_string()),
        status: BookingStatus::Confirmed,
        notification_sent: false,
        counselor_notified: false,
        created_at: Utc::now(),
    }
}

/// Pipeline with no classifier and no text-generation API.
pub(crate) fn offline_pipeline() -> Arc<AssessmentPipeline> {
    Arc::new(AssessmentPipeline::new(
        RecommendationResolver::new(Arc::new(ArtifactCache::disabled())),
        Arc::new(TemplateSummaryGenerator),
    ))
}

/// Accepts `Bearer token-<id>` for each registered fixture user.
#[derive(Default)]
pub(crate) struct FixedAuthenticator {
    users: Vec<User>,
}

impl FixedAuthenticator {
    pub(crate) fn with_users(users: Vec<User>) -> Arc<Self> {
        Arc::new(Self { users })
    }
}

pub(crate) fn bearer_for(user: &User) -> String {
    format!("Bearer token-{}", user.id.0)
}

impl Authenticator for FixedAuthenticator {
    fn authenticate(&self, token: &SessionToken) -> Result<User, AccountError> {
        self.users
            .iter()
            .find(|user| token.0 == format!("token-{}", user.id.0))
            .cloned()
            .ok_or(AccountError::Unauthenticated)
    }
}

#[derive(Default)]
pub(crate) struct MemoryUsers {
    records: Mutex<HashMap<UserId, User>>,
}

impl UserRepository for MemoryUsers {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        let mut guard = self.records.lock().expect("user mutex poisoned");
        if guard.contains_key(&user.id) || guard.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(user.id, user.clone());
        Ok(user)
    }

    fn fetch(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.records.lock().expect("user mutex poisoned").get(&id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let guard = self.records.lock().expect("user mutex poisoned");
        Ok(guard.values().find(|user| user.email == email).cloned())
    }
}

#[derive(Default)]
pub(crate) struct MemorySessions {
    tokens: Mutex<HashMap<SessionToken, UserId>>,
}

impl SessionStore for MemorySessions {
    fn issue(&self, token: SessionToken, user: UserId) -> Result<(), RepositoryError> {
        self.tokens
            .lock()
            .expect("session mutex poisoned")
            .insert(token, user);
        Ok(())
    }

    fn resolve(&self, token: &SessionToken) -> Result<Option<UserId>, RepositoryError> {
        Ok(self
            .tokens
            .lock()
            .expect("session mutex poisoned")
            .get(token)
            .copied())
    }

    fn revoke(&self, token: &SessionToken) -> Result<(), RepositoryError> {
        self.tokens
            .lock()
            .expect("session mutex poisoned")
            .remove(token);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryAssessments {
    records: Mutex<Vec<AssessmentRecord>>,
}

impl AssessmentRepository for MemoryAssessments {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("assessment mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("assessment mutex poisoned");
        Ok(guard.iter().find(|record| record.id == id).cloned())
    }

    fn list_for_user(&self, user: UserId) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("assessment mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|record| record.user_id == user)
            .cloned()
            .collect())
    }
}

/// Keeps `(email, assessment id)` for every appended row.
#[derive(Default)]
pub(crate) struct RecordingLog {
    rows: Mutex<Vec<(String, AssessmentId)>>,
}

impl RecordingLog {
    pub(crate) fn rows(&self) -> Vec<(String, AssessmentId)> {
        self.rows.lock().expect("log mutex poisoned").clone()
    }
}

impl AssessmentLog for RecordingLog {
    fn append(&self, email: &str, record: &AssessmentRecord) -> Result<(), AssessmentLogError> {
        self.rows
            .lock()
            .expect("log mutex poisoned")
            .push((email.to_string(), record.id));
        Ok(())
    }
}

pub(crate) struct BrokenLog;

impl AssessmentLog for BrokenLog {
    fn append(&self, _email: &str, _record: &AssessmentRecord) -> Result<(), AssessmentLogError> {
        Err(AssessmentLogError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only filesystem",
        )))
    }
}

#[derive(Default)]
pub(crate) struct MemoryBookings {
    records: Mutex<Vec<Booking>>,
}

impl MemoryBookings {
    pub(crate) fn stored(&self, id: BookingId) -> Option<Booking> {
        self.records
            .lock()
            .expect("booking mutex poisoned")
            .iter()
            .find(|booking| booking.id == id)
            .cloned()
    }
}

impl BookingRepository for MemoryBookings {
    fn insert(&self, booking: Booking) -> Result<Booking, RepositoryError> {
        let mut guard = self.records.lock().expect("booking mutex poisoned");
        if guard.iter().any(|existing| existing.slot() == booking.slot()) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(booking.clone());
        Ok(booking)
    }

    fn update(&self, booking: Booking) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("booking mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == booking.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = booking;
        Ok(())
    }

    fn fetch(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        Ok(self.stored(id))
    }
}

/// Records WhatsApp sends, or fails every send when built with `failing`.
#[derive(Default)]
pub(crate) struct RecordingMessaging {
    sent: Mutex<Vec<(String, String)>>,
    failure: Option<NotificationError>,
}

impl RecordingMessaging {
    pub(crate) fn failing(error: NotificationError) -> Self {
        Self {
            sent: Mutex::default(),
            failure: Some(error),
        }
    }

    pub(crate) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("messaging mutex poisoned").clone()
    }
}

impl MessagingGateway for RecordingMessaging {
    fn send_whatsapp(&self, to: &str, body: &str) -> Result<(), NotificationError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.sent
            .lock()
            .expect("messaging mutex poisoned")
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

/// Records e-mails, or fails every send when built with `failing`.
#[derive(Default)]
pub(crate) struct RecordingEmail {
    sent: Mutex<Vec<EmailMessage>>,
    failure: Option<NotificationError>,
}

impl RecordingEmail {
    pub(crate) fn failing(error: NotificationError) -> Self {
        Self {
            sent: Mutex::default(),
            failure: Some(error),
        }
    }

    pub(crate) fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("email mutex poisoned").clone()
    }
}

impl EmailGateway for RecordingEmail {
    fn send_email(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.sent
            .lock()
            .expect("email mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}

pub(crate) fn notifier(
    messaging: Arc<RecordingMessaging>,
    email: Arc<RecordingEmail>,
) -> Arc<BookingNotifier> {
    Arc::new(BookingNotifier::new(
        messaging,
        email,
        counselor(),
        "noreply@mindmetric.ai",
    ))
}
