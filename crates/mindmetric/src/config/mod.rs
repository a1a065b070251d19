use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub artifacts: ArtifactConfig,
    pub assessment_log_path: PathBuf,
    pub text_generation: TextGenerationConfig,
    pub notifications: NotificationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let artifacts = ArtifactConfig {
            model_path: env_path("MODEL_PATH", "artifacts/model.json"),
            encoders_path: env_path("ENCODERS_PATH", "artifacts/encoders.json"),
        };

        let timeout_secs = env::var("GEMINI_TIMEOUT_SECS")
            .unwrap_or_else(|_| "20".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout)?;

        let text_generation = TextGenerationConfig {
            api_key: non_empty_var("GEMINI_API_KEY"),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        let notifications = NotificationConfig {
            twilio: TwilioCredentials::from_parts(
                non_empty_var("TWILIO_ACCOUNT_SID"),
                non_empty_var("TWILIO_AUTH_TOKEN"),
                non_empty_var("TWILIO_PHONE_NUMBER"),
            ),
            sendgrid_api_key: non_empty_var("SENDGRID_API_KEY"),
            from_email: env::var("NOTIFY_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@mindmetric.ai".to_string()),
            counselor: CounselorContact {
                name: env::var("COUNSELOR_NAME")
                    .unwrap_or_else(|_| "MindMetric Counselor".to_string()),
                email: env::var("COUNSELOR_EMAIL")
                    .unwrap_or_else(|_| "counselor@mindmetric.ai".to_string()),
                clinic_location: env::var("CLINIC_LOCATION")
                    .unwrap_or_else(|_| "MindMetric Clinic".to_string()),
            },
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            artifacts,
            assessment_log_path: env_path("ASSESSMENT_LOG_PATH", "assessment_logs.csv"),
            text_generation,
            notifications,
        })
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    PathBuf::from(env::var(key).unwrap_or_else(|_| default.to_string()))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Locations of the serialized classifier and its categorical encoders.
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub model_path: PathBuf,
    pub encoders_path: PathBuf,
}

/// Settings for the hosted text-generation API used for assessment summaries.
#[derive(Clone)]
pub struct TextGenerationConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl fmt::Debug for TextGenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextGenerationConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Outbound messaging and e-mail settings for booking confirmations.
#[derive(Clone)]
pub struct NotificationConfig {
    pub twilio: Option<TwilioCredentials>,
    pub sendgrid_api_key: Option<String>,
    pub from_email: String,
    pub counselor: CounselorContact,
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("twilio", &self.twilio.as_ref().map(|_| "<redacted>"))
            .field(
                "sendgrid_api_key",
                &self.sendgrid_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("from_email", &self.from_email)
            .field("counselor", &self.counselor)
            .finish()
    }
}

#[derive(Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl TwilioCredentials {
    /// All three values are required; a partial set counts as unconfigured.
    fn from_parts(
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
    ) -> Option<Self> {
        Some(Self {
            account_sid: account_sid?,
            auth_token: auth_token?,
            from_number: from_number?,
        })
    }
}

/// The counselor who receives booking alerts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounselorContact {
    pub name: String,
    pub email: String,
    pub clinic_location: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "GEMINI_TIMEOUT_SECS must be a whole number of seconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidTimeout => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
