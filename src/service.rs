//! Authentication Service
//!
//! Core authentication logic: credential verification, session lifecycle,
//! password reset, and permission checks. This is the only component the
//! rest of the portal calls directly; it consults the credential store for
//! account data, the session manager for session state, the token issuer
//! for reset flows, and the permission table for capability checks.

use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::{AccountResponse, LoginResponse, Registration, ResetRequested, Role, Session};
use crate::permissions::{self, Capability};
use crate::session::{InMemorySessionStore, SessionManager, SessionStore};
use crate::store::{AccountUpdate, CredentialStore, NewAccount};
use crate::token::TokenIssuer;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use chrono::Duration;
use std::sync::Arc;
use validator::ValidateEmail;

const RESET_REQUEST_MESSAGE: &str = "If the email is registered, a reset link will be sent";

/// Authentication service
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    sessions: SessionManager,
    tokens: TokenIssuer,
    config: AuthConfig,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    /// Create a service backed by the system clock and an in-memory session
    /// store.
    pub fn new(store: Arc<dyn CredentialStore>, config: AuthConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Create a service with an explicit clock.
    pub fn with_clock(
        store: Arc<dyn CredentialStore>,
        config: AuthConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_session_store(store, Arc::new(InMemorySessionStore::new()), config, clock)
    }

    /// Create a service with a custom session backing (e.g. a shared cache
    /// for multi-process deployments).
    pub fn with_session_store(
        store: Arc<dyn CredentialStore>,
        session_store: Arc<dyn SessionStore>,
        config: AuthConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let sessions = SessionManager::new(
            session_store,
            clock.clone(),
            Duration::seconds(config.session_timeout),
        );
        let tokens = TokenIssuer::new(
            store.clone(),
            clock.clone(),
            Duration::seconds(config.password_reset_expiration),
        );

        Self {
            store,
            sessions,
            tokens,
            config,
            clock,
        }
    }

    /// Get reference to the session manager
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Get reference to config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    // ============================================
    // Password Hashing
    // ============================================

    /// Hash a password using Argon2id
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let params = Params::new(
            self.config.argon2_memory_cost,
            self.config.argon2_time_cost,
            self.config.argon2_parallelism,
            None,
        )
        .map_err(|_| AuthError::Internal)?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string();

        Ok(hash)
    }

    /// Verify a password against a hash
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::Internal)?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    // ============================================
    // Login / Logout
    // ============================================

    /// Authenticate by email and password, create a session on success.
    ///
    /// Unknown email and wrong password both map to
    /// [`AuthError::InvalidCredentials`]; only an existing-but-deactivated
    /// account surfaces distinctly.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let account = self
            .store
            .get_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !account.active {
            tracing::warn!(user_id = %account.id, "Login attempt on inactive account");
            return Err(AuthError::InactiveAccount);
        }

        if !self.verify_password(password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let account = self
            .store
            .update(
                account.id,
                AccountUpdate {
                    last_login_at: Some(self.clock.now()),
                    ..Default::default()
                },
            )
            .await?;

        let session_id = self.sessions.create(&account).await;
        tracing::info!(user_id = %account.id, "User logged in");

        Ok(LoginResponse {
            user: AccountResponse::from(account),
            session_id,
        })
    }

    /// Destroy the session. Idempotent; unknown identifiers are ignored.
    pub async fn logout(&self, session_id: &str) {
        self.sessions.destroy(session_id).await;
    }

    // ============================================
    // Registration
    // ============================================

    /// Register a new resident account.
    ///
    /// Checks run in a fixed order: required fields, email uniqueness,
    /// email format, password length.
    pub async fn register(&self, data: Registration) -> Result<AccountResponse, AuthError> {
        if data.name.trim().is_empty() {
            return Err(AuthError::Validation { field: "name" });
        }
        if data.email.trim().is_empty() {
            return Err(AuthError::Validation { field: "email" });
        }
        if data.password.is_empty() {
            return Err(AuthError::Validation { field: "password" });
        }

        if self.store.get_by_email(&data.email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        if !data.email.validate_email() {
            return Err(AuthError::Validation { field: "email" });
        }

        if data.password.len() < self.config.min_password_length {
            return Err(AuthError::WeakPassword);
        }

        let password_hash = self.hash_password(&data.password)?;

        let account = self
            .store
            .insert(NewAccount {
                name: data.name,
                email: data.email,
                password_hash,
                // Self-registration never grants an elevated role.
                role: Role::Resident,
                flat_number: data.flat_number,
                phone: data.phone,
            })
            .await?;

        tracing::info!(user_id = %account.id, email = %account.email, "User registered");
        Ok(AccountResponse::from(account))
    }

    // ============================================
    // Password Reset
    // ============================================

    /// Initiate a password reset. The response shape and message are the
    /// same whether or not the email is registered, so callers cannot probe
    /// for accounts.
    pub async fn request_password_reset(&self, email: &str) -> Result<ResetRequested, AuthError> {
        let account = match self.store.get_by_email(email).await? {
            Some(account) => account,
            None => {
                return Ok(ResetRequested {
                    message: RESET_REQUEST_MESSAGE.to_string(),
                    token: None,
                })
            }
        };

        let token = self.tokens.issue(account.id).await?;
        let token = if self.config.return_reset_token {
            Some(token)
        } else {
            None
        };

        Ok(ResetRequested {
            message: RESET_REQUEST_MESSAGE.to_string(),
            token,
        })
    }

    /// Check a reset token without consuming it.
    pub async fn validate_reset_token(&self, token: &str) -> Result<AccountResponse, AuthError> {
        let account = self.tokens.validate(token).await?;
        Ok(AccountResponse::from(account))
    }

    /// Complete a password reset. The token is consumed in the same write
    /// that changes the password.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let account = self.tokens.validate(token).await?;

        if new_password.len() < self.config.min_password_length {
            return Err(AuthError::WeakPassword);
        }

        let password_hash = self.hash_password(new_password)?;
        self.tokens.consume(account.id, password_hash).await?;

        tracing::info!(user_id = %account.id, "Password reset completed");
        Ok(())
    }

    /// Change the password of a logged-in user.
    pub async fn change_password(
        &self,
        session_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let session = self.require_session(session_id).await?;

        let account = self
            .store
            .get_by_id(session.user_id)
            .await?
            .ok_or_else(|| AuthError::Store("session references a missing account".to_string()))?;

        if !self.verify_password(current_password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if new_password.len() < self.config.min_password_length {
            return Err(AuthError::WeakPassword);
        }

        let password_hash = self.hash_password(new_password)?;
        self.store
            .update(
                account.id,
                AccountUpdate {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(user_id = %account.id, "Password changed");
        Ok(())
    }

    // ============================================
    // Session Queries & Guards
    // ============================================

    /// Session snapshot of the logged-in user (id, name, email, role), or
    /// `None` for an invalid session. Counts as authenticated access and
    /// extends the session.
    pub async fn current_user(&self, session_id: &str) -> Option<Session> {
        self.sessions.authenticate(session_id).await
    }

    /// Guard for protected operations: the live session, or
    /// [`AuthError::Unauthenticated`]. Extends the session once.
    pub async fn require_session(&self, session_id: &str) -> Result<Session, AuthError> {
        self.sessions
            .authenticate(session_id)
            .await
            .ok_or(AuthError::Unauthenticated)
    }

    /// Whether the session's role grants the capability. `false`, never an
    /// error, for invalid sessions.
    pub async fn has_permission(&self, session_id: &str, capability: Capability) -> bool {
        match self.sessions.authenticate(session_id).await {
            Some(session) => permissions::has_capability(session.role, capability),
            None => false,
        }
    }

    /// Whether the session belongs to an account with the given role.
    pub async fn has_role(&self, session_id: &str, role: Role) -> bool {
        matches!(
            self.sessions.authenticate(session_id).await,
            Some(session) if session.role == role
        )
    }

    /// Guard that also checks a capability: `Forbidden` when the session is
    /// live but its role does not grant the capability.
    pub async fn require_permission(
        &self,
        session_id: &str,
        capability: Capability,
    ) -> Result<Session, AuthError> {
        let session = self.require_session(session_id).await?;

        if !permissions::has_capability(session.role, capability) {
            tracing::warn!(
                user_id = %session.user_id,
                capability = %capability,
                "Capability denied"
            );
            return Err(AuthError::Forbidden);
        }

        Ok(session)
    }
}
