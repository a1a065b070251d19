use super::domain::{Booking, BookingId};
use crate::repository::RepositoryError;

/// Storage abstraction for consultation bookings.
pub trait BookingRepository: Send + Sync {
    /// Persist a new booking. Implementations must reject a booking whose
    /// `(session_date, session_time)` slot is already held, as one atomic step,
    /// with `RepositoryError::Conflict`.
    fn insert(&self, booking: Booking) -> Result<Booking, RepositoryError>;
    fn update(&self, booking: Booking) -> Result<(), RepositoryError>;
    fn fetch(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError>;
}
