//! Credential Store
//!
//! Interface to the persistence collaborator that owns account records,
//! plus an in-memory implementation for single-process deployments and
//! tests. Implementations must apply [`CredentialStore::update`] as one
//! atomic read-modify-write so a reset token can never remain usable after
//! the password it guards has already changed.

use crate::error::AuthError;
use crate::models::{Role, UserAccount};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Fields for a new account. The password arrives already hashed; plaintext
/// never crosses the store boundary.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub flat_number: Option<String>,
    pub phone: Option<String>,
}

/// Partial patch applied to an account in a single atomic write.
///
/// Outer `None` leaves the field untouched; for optional columns,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub active: Option<bool>,
    pub reset_token: Option<Option<String>>,
    pub reset_token_expires: Option<Option<DateTime<Utc>>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub flat_number: Option<Option<String>>,
    pub phone: Option<Option<String>>,
}

/// Durable record of accounts. Email comparisons are case-insensitive.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, AuthError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<UserAccount>, AuthError>;

    async fn get_by_reset_token(&self, token: &str) -> Result<Option<UserAccount>, AuthError>;

    /// Create an account. Fails with [`AuthError::DuplicateEmail`] when the
    /// email is already present.
    async fn insert(&self, account: NewAccount) -> Result<UserAccount, AuthError>;

    /// Apply a partial patch as one atomic read-modify-write and return the
    /// updated record.
    async fn update(&self, id: Uuid, patch: AccountUpdate) -> Result<UserAccount, AuthError>;
}

/// In-memory credential store. All mutations run under a single write lock,
/// which gives `update` its atomicity.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    accounts: RwLock<HashMap<Uuid, UserAccount>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, AuthError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserAccount>, AuthError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|account| account.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_by_reset_token(&self, token: &str) -> Result<Option<UserAccount>, AuthError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|account| account.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn insert(&self, new: NewAccount) -> Result<UserAccount, AuthError> {
        let mut accounts = self.accounts.write().await;

        if accounts
            .values()
            .any(|account| account.email.eq_ignore_ascii_case(&new.email))
        {
            return Err(AuthError::DuplicateEmail);
        }

        let account = UserAccount {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            active: true,
            flat_number: new.flat_number,
            phone: new.phone,
            reset_token: None,
            reset_token_expires: None,
            last_login_at: None,
            created_at: Utc::now(),
        };

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update(&self, id: Uuid, patch: AccountUpdate) -> Result<UserAccount, AuthError> {
        let mut accounts = self.accounts.write().await;

        let account = accounts.get_mut(&id).ok_or_else(|| {
            tracing::error!(account_id = %id, "Update of a missing account");
            AuthError::Store("account not found".to_string())
        })?;

        if let Some(name) = patch.name {
            account.name = name;
        }
        if let Some(hash) = patch.password_hash {
            account.password_hash = hash;
        }
        if let Some(active) = patch.active {
            account.active = active;
        }
        if let Some(token) = patch.reset_token {
            account.reset_token = token;
        }
        if let Some(expires) = patch.reset_token_expires {
            account.reset_token_expires = expires;
        }
        if let Some(last_login) = patch.last_login_at {
            account.last_login_at = Some(last_login);
        }
        if let Some(flat_number) = patch.flat_number {
            account.flat_number = flat_number;
        }
        if let Some(phone) = patch.phone {
            account.phone = phone;
        }

        Ok(account.clone())
    }
}
