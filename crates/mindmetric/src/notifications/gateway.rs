/// Delivery failure for a single outbound message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("delivery request failed: {0}")]
    Transport(String),
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Outbound WhatsApp channel.
pub trait MessagingGateway: Send + Sync {
    fn send_whatsapp(&self, to: &str, body: &str) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
}

/// Outbound e-mail channel.
pub trait EmailGateway: Send + Sync {
    fn send_email(&self, message: &EmailMessage) -> Result<(), NotificationError>;
}
