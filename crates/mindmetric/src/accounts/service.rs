use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::domain::{LoginRequest, SessionGrant, SessionToken, SignupRequest, User, UserId};
use super::password::{hash_password, verify_password, PasswordError};
use super::repository::{SessionStore, UserRepository};
use crate::repository::RepositoryError;

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_AGE: u8 = 120;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("email already exists, use a different email or log in")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid signup: {0}")]
    InvalidSignup(&'static str),
    #[error("missing or revoked session")]
    Unauthenticated,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Resolves a bearer token into the account it was issued for.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, token: &SessionToken) -> Result<User, AccountError>;
}

/// Signup, login, and session handling over pluggable storage.
pub struct AccountService<U, S> {
    users: Arc<U>,
    sessions: Arc<S>,
}

static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_user_id() -> UserId {
    UserId(USER_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn new_session_token() -> SessionToken {
    SessionToken(Uuid::new_v4().simple().to_string())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl<U, S> AccountService<U, S>
where
    U: UserRepository + 'static,
    S: SessionStore + 'static,
{
    pub fn new(users: Arc<U>, sessions: Arc<S>) -> Self {
        Self { users, sessions }
    }

    pub fn signup(&self, request: SignupRequest) -> Result<SessionGrant, AccountError> {
        let SignupRequest {
            name,
            age,
            address,
            email,
            password,
        } = request;

        let email = normalize_email(&email);
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AccountError::InvalidSignup("name is required"));
        }
        if !email.contains('@') {
            return Err(AccountError::InvalidSignup("email must contain '@'"));
        }
        if age == 0 || age > MAX_AGE {
            return Err(AccountError::InvalidSignup("age must be between 1 and 120"));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::InvalidSignup(
                "password must be at least 8 characters",
            ));
        }

        if self.users.find_by_email(&email)?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let user = User {
            id: next_user_id(),
            name,
            age,
            address: address.trim().to_string(),
            email,
            password_hash: hash_password(&password)?,
            created_at: Utc::now(),
        };

        let user = self.users.insert(user).map_err(|err| match err {
            RepositoryError::Conflict => AccountError::EmailTaken,
            other => AccountError::Repository(other),
        })?;

        info!(user_id = user.id.0, "account created");
        self.open_session(user)
    }

    pub fn login(&self, request: LoginRequest) -> Result<SessionGrant, AccountError> {
        let email = normalize_email(&request.email);
        let user = self
            .users
            .find_by_email(&email)?
            .ok_or(AccountError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash) {
            return Err(AccountError::InvalidCredentials);
        }

        self.open_session(user)
    }

    pub fn logout(&self, token: &SessionToken) -> Result<(), AccountError> {
        self.sessions.revoke(token)?;
        Ok(())
    }

    fn open_session(&self, user: User) -> Result<SessionGrant, AccountError> {
        let token = new_session_token();
        self.sessions.issue(token.clone(), user.id)?;
        Ok(SessionGrant {
            token,
            user: user.view(),
        })
    }
}

impl<U, S> Authenticator for AccountService<U, S>
where
    U: UserRepository + 'static,
    S: SessionStore + 'static,
{
    fn authenticate(&self, token: &SessionToken) -> Result<User, AccountError> {
        let user_id = self
            .sessions
            .resolve(token)?
            .ok_or(AccountError::Unauthenticated)?;
        self.users
            .fetch(user_id)?
            .ok_or(AccountError::Unauthenticated)
    }
}
