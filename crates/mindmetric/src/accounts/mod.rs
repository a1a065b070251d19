//! User accounts and bearer-token sessions.

pub mod domain;
mod password;
pub mod repository;
pub mod router;
pub mod service;


pub use domain::{LoginRequest, SessionGrant, SessionToken, SignupRequest, User, UserId, UserView};
pub use password::{hash_password, verify_password, PasswordError};
pub use repository::{SessionStore, UserRepository};
pub use router::account_router;
pub use service::{AccountError, AccountService, Authenticator};
