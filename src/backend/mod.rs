//! Contract with the backend collaborator: an auth provider plus the `tasks`
//! store. The application never talks to storage except through these traits.
//! [SqliteBackend] is the bundled implementation.

pub mod sqlite;

use thiserror::Error;

use crate::models::{AuthSession, Credentials, NewTask, Profile, Task, User};

pub use sqlite::SqliteBackend;

/// Minimum accepted password length on sign-up
pub const MIN_PASSWORD_LEN: usize = 6;

/// Every failure a backend call can report. The `Display` text is what the user sees.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to hash password: {0}")]
    HashError(#[from] bcrypt::BcryptError),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("User already registered")]
    UserAlreadyRegistered,
    #[error("Password should be at least {0} characters")]
    WeakPassword(usize),
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Permission denied")]
    PermissionDenied,
    #[error("{0}")]
    InvalidRequest(String),
}

/// Identity half of the collaborator
#[cfg_attr(test, mockall::automock)]
pub trait AuthApi {
    /// Register an account. Does not sign the user in.
    fn sign_up(&self, credentials: &Credentials) -> Result<User, BackendError>;

    fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthSession, BackendError>;

    /// Revoke the session's access token
    fn sign_out(&self, session: &AuthSession) -> Result<(), BackendError>;

    fn get_profile(&self, session: &AuthSession) -> Result<Option<Profile>, BackendError>;
}

/// Relational half of the collaborator: the `tasks` table
#[cfg_attr(test, mockall::automock)]
pub trait TaskStore {
    /// All rows with `user_id`, newest `start_time` first
    fn list_tasks(&self, session: &AuthSession, user_id: &str) -> Result<Vec<Task>, BackendError>;

    /// Insert one closed session and return the stored row
    fn insert_task(&self, session: &AuthSession, task: &NewTask) -> Result<Task, BackendError>;
}

/// Anything that provides both halves
pub trait Backend: AuthApi + TaskStore {}

impl<T: AuthApi + TaskStore> Backend for T {}
