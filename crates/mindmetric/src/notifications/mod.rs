//! Booking confirmations over WhatsApp and e-mail.

mod gateway;
pub mod notifier;
pub mod sendgrid;
pub mod templates;
pub mod twilio;


pub use gateway::{EmailGateway, EmailMessage, MessagingGateway, NotificationError};
pub use notifier::{BookingNotifier, NotificationReport};
pub use sendgrid::SendGridEmailGateway;
pub use twilio::TwilioWhatsAppGateway;
