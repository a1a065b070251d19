use super::domain::{SessionToken, User, UserId};
use crate::repository::RepositoryError;

/// Storage abstraction for registered accounts.
pub trait UserRepository: Send + Sync {
    /// Store a new user; e-mail addresses are unique.
    fn insert(&self, user: User) -> Result<User, RepositoryError>;
    fn fetch(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}

/// Storage abstraction for issued bearer sessions.
pub trait SessionStore: Send + Sync {
    fn issue(&self, token: SessionToken, user: UserId) -> Result<(), RepositoryError>;
    fn resolve(&self, token: &SessionToken) -> Result<Option<UserId>, RepositoryError>;
    fn revoke(&self, token: &SessionToken) -> Result<(), RepositoryError>;
}
