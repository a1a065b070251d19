use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use super::gateway::{EmailGateway, MessagingGateway, NotificationError};
use super::templates::{confirmation_email, counselor_alert, whatsapp_confirmation, BookingNotice};
use crate::accounts::User;
use crate::booking::Booking;
use crate::config::CounselorContact;

/// Which booking notifications were delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotificationReport {
    pub whatsapp: bool,
    pub email: bool,
    pub counselor: bool,
}

impl NotificationReport {
    /// True when the user heard back on at least one channel.
    pub fn user_notified(&self) -> bool {
        self.whatsapp || self.email
    }
}

/// Sends booking confirmations to the user and an alert to the counselor.
pub struct BookingNotifier {
    messaging: Arc<dyn MessagingGateway>,
    email: Arc<dyn EmailGateway>,
    counselor: CounselorContact,
    from_email: String,
}

impl BookingNotifier {
    pub fn new(
        messaging: Arc<dyn MessagingGateway>,
        email: Arc<dyn EmailGateway>,
        counselor: CounselorContact,
        from_email: impl Into<String>,
    ) -> Self {
        Self {
            messaging,
            email,
            counselor,
            from_email: from_email.into(),
        }
    }

    /// Attempt every channel. Failures are logged and reported, never raised.
    pub fn notify(&self, booking: &Booking, user: &User) -> NotificationReport {
        let notice = BookingNotice {
            booking,
            user_name: &user.name,
            user_email: &user.email,
        };

        let whatsapp = if booking.phone_number.trim().is_empty() {
            false
        } else {
            let body = whatsapp_confirmation(&notice, &self.counselor);
            delivered(
                "whatsapp",
                self.messaging.send_whatsapp(&booking.phone_number, &body),
            )
        };

        let email = delivered(
            "email",
            self.email
                .send_email(&confirmation_email(&notice, &self.counselor, &self.from_email)),
        );

        let counselor = delivered(
            "counselor",
            self.email
                .send_email(&counselor_alert(&notice, &self.counselor, &self.from_email)),
        );

        let report = NotificationReport {
            whatsapp,
            email,
            counselor,
        };
        info!(booking_id = booking.id.0, ?report, "booking notifications dispatched");
        report
    }
}

fn delivered(channel: &'static str, result: Result<(), NotificationError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err @ NotificationError::NotConfigured(_)) => {
            warn!(channel, error = %err, "notification skipped");
            false
        }
        Err(err) => {
            error!(channel, error = %err, "notification delivery failed");
            false
        }
    }
}
