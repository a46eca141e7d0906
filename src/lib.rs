//! Residence Portal Authentication
//!
//! Authentication and authorization core for the residence community portal
//! (surveys, quizzes, maintenance requests), providing:
//! - User registration and login
//! - Argon2id password hashing
//! - Opaque session identifiers with a lazy inactivity timeout
//! - Single-use, time-boxed password reset tokens
//! - Role-based permission checks (admin / staff / resident)
//!
//! The durable account store is an external collaborator consumed through
//! the [`CredentialStore`] trait; an in-memory implementation ships with the
//! crate for single-process deployments and tests. HTTP routing, templating,
//! and the rest of the portal's CRUD live outside this crate and call into
//! [`AuthService`].
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables:
//! - `SESSION_TIMEOUT` - Session inactivity timeout in seconds (default: 3600)
//! - `PASSWORD_RESET_EXPIRATION` - Reset token lifetime in seconds (default: 3600)
//! - `MIN_PASSWORD_LENGTH` - Minimum password length (default: 8)
//! - `ARGON2_MEMORY_COST` / `ARGON2_TIME_COST` / `ARGON2_PARALLELISM` - Hashing cost
//! - `RETURN_RESET_TOKEN` - Include the raw reset token in responses (default: false)
//!
//! # Usage
//!
//! ```rust,ignore
//! use residence_auth::{AuthConfig, AuthService, InMemoryCredentialStore};
//! use std::sync::Arc;
//!
//! let config = AuthConfig::from_env();
//! config.validate()?;
//!
//! let store = Arc::new(InMemoryCredentialStore::new());
//! let auth = AuthService::new(store, config);
//!
//! let response = auth.login("resident@example.com", "secret-password").await?;
//! let user = auth.require_session(&response.session_id).await?;
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod permissions;
pub mod service;
pub mod session;
pub mod store;
pub mod token;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AuthConfig;
pub use error::AuthError;
pub use models::{
    AccountResponse, LoginResponse, Registration, ResetRequested, Role, Session, UserAccount,
};
pub use permissions::{capabilities, has_capability, Capability};
pub use service::AuthService;
pub use session::{InMemorySessionStore, SessionManager, SessionStore};
pub use store::{AccountUpdate, CredentialStore, InMemoryCredentialStore, NewAccount};
pub use token::TokenIssuer;
