//! Authentication Error Types
//!
//! Centralized error handling for all authentication operations. Errors are
//! returned as values to the caller, which maps them to user-facing
//! responses; nothing in this crate panics across the API boundary.

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// A required field is missing or malformed.
    #[error("Validation failed for field: {field}")]
    Validation { field: &'static str },

    #[error("Email already registered")]
    DuplicateEmail,

    /// Deliberately covers both "no such account" and "wrong password" so
    /// callers cannot probe which emails are registered.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is inactive")]
    InactiveAccount,

    #[error("Password does not meet the minimum length requirement")]
    WeakPassword,

    #[error("Invalid reset token")]
    InvalidToken,

    #[error("Reset token has expired")]
    ExpiredToken,

    #[error("User not authenticated")]
    Unauthenticated,

    #[error("Access denied")]
    Forbidden,

    /// Lower-layer persistence failure. Logged where it originates and never
    /// exposed verbatim to end users.
    #[error("Storage error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal,
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AuthError::Internal
    }
}
