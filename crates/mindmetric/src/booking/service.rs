use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{Booking, BookingId, BookingRequest, BookingStatus};
use super::repository::BookingRepository;
use crate::accounts::User;
use crate::notifications::BookingNotifier;
use crate::repository::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("phone number is required for booking confirmation")]
    PhoneRequired,
    #[error("this time slot is already booked, choose another time")]
    SlotTaken,
    #[error("booking not found")]
    NotFound,
    #[error("booking belongs to another account")]
    Forbidden,
    #[error(transparent)]
    Repository(RepositoryError),
}

/// Reserves consultation slots and sends the confirmations.
pub struct BookingService<R> {
    repository: Arc<R>,
    notifier: Arc<BookingNotifier>,
}

static BOOKING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_booking_id() -> BookingId {
    BookingId(BOOKING_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl<R> BookingService<R>
where
    R: BookingRepository + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<BookingNotifier>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Reserve the requested slot. May block on notification delivery.
    pub fn book(&self, user: &User, request: BookingRequest) -> Result<Booking, BookingError> {
        let phone_number = request.phone.trim().to_string();
        if phone_number.is_empty() {
            return Err(BookingError::PhoneRequired);
        }

        let booking = Booking {
            id: next_booking_id(),
            user_id: user.id,
            session_date: request.date,
            session_time: request.time,
            consultation_type: request.consultation_type,
            phone_number,
            emergency_contact: non_blank(request.emergency_contact),
            notes: non_blank(request.notes),
            status: BookingStatus::Confirmed,
            notification_sent: false,
            counselor_notified: false,
            created_at: Utc::now(),
        };

        let mut booking = self.repository.insert(booking).map_err(|err| match err {
            RepositoryError::Conflict => BookingError::SlotTaken,
            other => BookingError::Repository(other),
        })?;
        info!(
            booking_id = booking.id.0,
            user_id = user.id.0,
            date = %booking.session_date,
            time = %booking.session_time,
            "session booked"
        );

        let report = self.notifier.notify(&booking, user);
        booking.notification_sent = report.user_notified();
        booking.counselor_notified = report.counselor;
        if let Err(err) = self.repository.update(booking.clone()) {
            warn!(booking_id = booking.id.0, error = %err, "failed to record notification status");
        }

        Ok(booking)
    }

    pub fn get(&self, user: &User, id: BookingId) -> Result<Booking, BookingError> {
        let booking = self
            .repository
            .fetch(id)
            .map_err(BookingError::Repository)?
            .ok_or(BookingError::NotFound)?;
        if booking.user_id != user.id {
            return Err(BookingError::Forbidden);
        }
        Ok(booking)
    }
}
