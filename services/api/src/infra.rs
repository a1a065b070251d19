use metrics_exporter_prometheus::PrometheusHandle;
use mindmetric::accounts::{SessionStore, SessionToken, User, UserId, UserRepository};
use mindmetric::assessment::{
    AssessmentId, AssessmentRecord, AssessmentRepository, GeminiSummaryGenerator,
    SummaryGenerator,
};
use mindmetric::booking::{Booking, BookingId, BookingRepository};
use mindmetric::config::AppConfig;
use mindmetric::error::AppError;
use mindmetric::notifications::{
    EmailGateway, MessagingGateway, SendGridEmailGateway, TwilioWhatsAppGateway,
};
use mindmetric::repository::RepositoryError;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryUserRepository {
    records: Arc<Mutex<HashMap<UserId, User>>>,
}

impl UserRepository for InMemoryUserRepository {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&user.id) || guard.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(user.id, user.clone());
        Ok(user)
    }

    fn fetch(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.records)?.get(&id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.values().find(|user| user.email == email).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionStore {
    tokens: Arc<Mutex<HashMap<SessionToken, UserId>>>,
}

impl SessionStore for InMemorySessionStore {
    fn issue(&self, token: SessionToken, user: UserId) -> Result<(), RepositoryError> {
        lock(&self.tokens)?.insert(token, user);
        Ok(())
    }

    fn resolve(&self, token: &SessionToken) -> Result<Option<UserId>, RepositoryError> {
        Ok(lock(&self.tokens)?.get(token).copied())
    }

    fn revoke(&self, token: &SessionToken) -> Result<(), RepositoryError> {
        lock(&self.tokens)?.remove(token);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(lock(&self.records)?.get(&id).cloned())
    }

    fn list_for_user(&self, user: UserId) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = lock(&self.records)?;
        let mut records: Vec<AssessmentRecord> = guard
            .values()
            .filter(|record| record.user_id == user)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryBookingRepository {
    records: Arc<Mutex<HashMap<BookingId, Booking>>>,
}

impl BookingRepository for InMemoryBookingRepository {
    fn insert(&self, booking: Booking) -> Result<Booking, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&booking.id)
            || guard.values().any(|existing| existing.slot() == booking.slot())
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(booking.id, booking.clone());
        Ok(booking)
    }

    fn update(&self, booking: Booking) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&booking.id) {
            guard.insert(booking.id, booking);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        Ok(lock(&self.records)?.get(&id).cloned())
    }
}

/// Outbound API clients. They block, so build and use them off the async runtime.
pub(crate) struct Gateways {
    pub(crate) summaries: Arc<dyn SummaryGenerator>,
    pub(crate) messaging: Arc<dyn MessagingGateway>,
    pub(crate) email: Arc<dyn EmailGateway>,
}

impl Gateways {
    pub(crate) fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let summaries = GeminiSummaryGenerator::from_config(&config.text_generation)?;
        let messaging = TwilioWhatsAppGateway::new(config.notifications.twilio.clone())?;
        let email = SendGridEmailGateway::new(config.notifications.sendgrid_api_key.clone())?;

        Ok(Self {
            summaries: Arc::new(summaries),
            messaging: Arc::new(messaging),
            email: Arc::new(email),
        })
    }
}
