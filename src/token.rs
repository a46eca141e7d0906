//! Password Reset Tokens
//!
//! Issues and validates single-use, time-boxed reset tokens. The token lives
//! on the account record itself, so issuing a new one discards any prior
//! token and consuming one clears it in the same write that changes the
//! password.

use crate::clock::Clock;
use crate::error::AuthError;
use crate::models::UserAccount;
use crate::store::{AccountUpdate, CredentialStore};

use chrono::Duration;
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

/// Generate a 256-bit random identifier, hex-encoded. Used for both reset
/// tokens and session identifiers.
pub(crate) fn generate_token() -> String {
    use std::fmt::Write;

    let bytes: [u8; 32] = rand::thread_rng().gen();
    let mut token = String::with_capacity(64);
    for byte in &bytes {
        write!(token, "{:02x}", byte).unwrap();
    }
    token
}

/// Issues and validates password-reset tokens.
pub struct TokenIssuer {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(store: Arc<dyn CredentialStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    /// Issue a fresh token for the account, replacing any prior one. At most
    /// one token is active per account.
    pub async fn issue(&self, account_id: Uuid) -> Result<String, AuthError> {
        let token = generate_token();
        let expires = self.clock.now() + self.ttl;

        self.store
            .update(
                account_id,
                AccountUpdate {
                    reset_token: Some(Some(token.clone())),
                    reset_token_expires: Some(Some(expires)),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(user_id = %account_id, "Password reset token issued");
        Ok(token)
    }

    /// Look up the account holding the token. Read-only: validation never
    /// consumes the token.
    pub async fn validate(&self, token: &str) -> Result<UserAccount, AuthError> {
        let account = self
            .store
            .get_by_reset_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let expires = account.reset_token_expires.ok_or(AuthError::InvalidToken)?;
        if self.clock.now() >= expires {
            return Err(AuthError::ExpiredToken);
        }

        Ok(account)
    }

    /// Set the new password hash and clear token + expiry in one atomic
    /// update, so the token can never outlive the password change.
    pub async fn consume(
        &self,
        account_id: Uuid,
        new_password_hash: String,
    ) -> Result<(), AuthError> {
        self.store
            .update(
                account_id,
                AccountUpdate {
                    password_hash: Some(new_password_hash),
                    reset_token: Some(None),
                    reset_token_expires: Some(None),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(user_id = %account_id, "Password reset token consumed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::Role;
    use crate::store::{InMemoryCredentialStore, NewAccount};
    use chrono::{TimeZone, Utc};

    fn setup() -> (TokenIssuer, Arc<InMemoryCredentialStore>, Arc<ManualClock>) {
        let store = Arc::new(InMemoryCredentialStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        ));
        let issuer = TokenIssuer::new(store.clone(), clock.clone(), Duration::seconds(3600));
        (issuer, store, clock)
    }

    async fn seed_account(store: &InMemoryCredentialStore) -> Uuid {
        store
            .insert(NewAccount {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                role: Role::Resident,
                flat_number: None,
                phone: None,
            })
            .await
            .unwrap()
            .id
    }

    #[test]
    fn generated_tokens_are_long_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn issue_persists_token_and_expiry() {
        let (issuer, store, clock) = setup();
        let id = seed_account(&store).await;

        let token = issuer.issue(id).await.unwrap();

        let account = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(account.reset_token.as_deref(), Some(token.as_str()));
        assert_eq!(
            account.reset_token_expires,
            Some(clock.now() + Duration::seconds(3600))
        );
    }

    #[tokio::test]
    async fn validates_until_the_expiry_instant() {
        let (issuer, store, clock) = setup();
        let id = seed_account(&store).await;
        let token = issuer.issue(id).await.unwrap();

        clock.advance(Duration::seconds(3599));
        assert!(issuer.validate(&token).await.is_ok());

        clock.advance(Duration::seconds(1));
        let err = issuer.validate(&token).await.unwrap_err();
        assert_eq!(err, AuthError::ExpiredToken);
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let (issuer, _store, _clock) = setup();
        let err = issuer.validate("not-a-token").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn validation_is_read_only() {
        let (issuer, store, _clock) = setup();
        let id = seed_account(&store).await;
        let token = issuer.issue(id).await.unwrap();

        assert!(issuer.validate(&token).await.is_ok());
        assert!(issuer.validate(&token).await.is_ok());
    }

    #[tokio::test]
    async fn reissue_discards_prior_token() {
        let (issuer, store, _clock) = setup();
        let id = seed_account(&store).await;

        let first = issuer.issue(id).await.unwrap();
        let second = issuer.issue(id).await.unwrap();
        assert_ne!(first, second);

        assert_eq!(
            issuer.validate(&first).await.unwrap_err(),
            AuthError::InvalidToken
        );
        assert!(issuer.validate(&second).await.is_ok());
    }

    #[tokio::test]
    async fn consume_sets_hash_and_clears_token() {
        let (issuer, store, _clock) = setup();
        let id = seed_account(&store).await;
        let token = issuer.issue(id).await.unwrap();

        issuer
            .consume(id, "$argon2id$fresh".to_string())
            .await
            .unwrap();

        let account = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(account.password_hash, "$argon2id$fresh");
        assert_eq!(account.reset_token, None);
        assert_eq!(account.reset_token_expires, None);
        assert_eq!(
            issuer.validate(&token).await.unwrap_err(),
            AuthError::InvalidToken
        );
    }
}
