//! Session Management
//!
//! Tracks live sessions keyed by an opaque identifier and enforces the
//! inactivity timeout. Expiry is lazy: an entry is destroyed when a check
//! observes that the timeout has elapsed, never by a background sweep.

use crate::clock::Clock;
use crate::models::{Session, UserAccount};
use crate::token::generate_token;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Pluggable backing for session records. The in-memory implementation
/// covers single-process deployments; a shared-cache implementation can
/// stand in for multi-process ones.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &str) -> Option<Session>;

    async fn insert(&self, session: Session);

    async fn remove(&self, id: &str);

    /// Atomic expiry check and refresh: returns the refreshed session when
    /// it is live, removes it and returns `None` when the timeout has
    /// elapsed. The check and the extension must observe the same timestamp.
    async fn check_and_touch(
        &self,
        id: &str,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Option<Session>;
}

/// In-memory session store keyed by the opaque session identifier.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn insert(&self, session: Session) {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
    }

    async fn remove(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }

    async fn check_and_touch(
        &self,
        id: &str,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Option<Session> {
        let mut sessions = self.sessions.write().await;

        if let Some(session) = sessions.get_mut(id) {
            if now.signed_duration_since(session.last_activity) < timeout {
                session.last_activity = now;
                return Some(session.clone());
            }
        } else {
            return None;
        }

        // Timed out: destroy under the same lock as the check.
        sessions.remove(id);
        None
    }
}

/// Tracks live sessions and enforces the inactivity timeout.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            store,
            clock,
            timeout,
        }
    }

    /// Create a session for an authenticated account and return its opaque
    /// identifier. Every login gets a fresh identifier; destroyed ones are
    /// never reused.
    pub async fn create(&self, account: &UserAccount) -> String {
        let id = generate_token();
        let now = self.clock.now();

        self.store
            .insert(Session {
                id: id.clone(),
                user_id: account.id,
                name: account.name.clone(),
                email: account.email.clone(),
                role: account.role,
                login_time: now,
                last_activity: now,
            })
            .await;

        id
    }

    /// Atomic check-then-touch: returns the session when it is live,
    /// refreshing its activity timestamp in the same operation; destroys it
    /// when the timeout has elapsed. Call once per logical request so one
    /// request extends the session at most once.
    pub async fn authenticate(&self, session_id: &str) -> Option<Session> {
        self.store
            .check_and_touch(session_id, self.clock.now(), self.timeout)
            .await
    }

    /// Whether the session exists and has not timed out. Passing the check
    /// extends the session, exactly like [`SessionManager::authenticate`].
    pub async fn is_valid(&self, session_id: &str) -> bool {
        self.authenticate(session_id).await.is_some()
    }

    /// Refresh the activity timestamp of a live session.
    pub async fn touch(&self, session_id: &str) {
        self.store
            .check_and_touch(session_id, self.clock.now(), self.timeout)
            .await;
    }

    /// Read-only accessor: never extends the session and never yields an
    /// expired one.
    pub async fn get(&self, session_id: &str) -> Option<Session> {
        let session = self.store.get(session_id).await?;
        if self
            .clock
            .now()
            .signed_duration_since(session.last_activity)
            >= self.timeout
        {
            return None;
        }
        Some(session)
    }

    /// Remove the session (logout). Idempotent.
    pub async fn destroy(&self, session_id: &str) {
        self.store.remove(session_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::Role;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn account() -> UserAccount {
        UserAccount {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::Resident,
            active: true,
            flat_number: None,
            phone: None,
            reset_token: None,
            reset_token_expires: None,
            last_login_at: None,
            created_at: Utc::now(),
        }
    }

    fn setup() -> (SessionManager, Arc<InMemorySessionStore>, Arc<ManualClock>) {
        let store = Arc::new(InMemorySessionStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        ));
        let manager = SessionManager::new(store.clone(), clock.clone(), Duration::seconds(3600));
        (manager, store, clock)
    }

    #[tokio::test]
    async fn created_session_authenticates() {
        let (manager, _store, _clock) = setup();
        let user = account();
        let id = manager.create(&user).await;

        let session = manager.authenticate(&id).await.unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.role, Role::Resident);
        assert_eq!(session.name, "Ada");
    }

    #[tokio::test]
    async fn each_login_gets_a_fresh_identifier() {
        let (manager, _store, _clock) = setup();
        let user = account();
        let first = manager.create(&user).await;
        let second = manager.create(&user).await;
        assert_ne!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[tokio::test]
    async fn valid_just_before_the_timeout() {
        let (manager, _store, clock) = setup();
        let id = manager.create(&account()).await;

        clock.advance(Duration::seconds(3599));
        assert!(manager.is_valid(&id).await);
    }

    #[tokio::test]
    async fn invalid_at_the_timeout_instant() {
        let (manager, store, clock) = setup();
        let id = manager.create(&account()).await;

        clock.advance(Duration::seconds(3600));
        assert!(!manager.is_valid(&id).await);
        // lazy expiry destroyed the entry
        assert!(store.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn touch_resets_the_timeout_clock() {
        let (manager, _store, clock) = setup();
        let id = manager.create(&account()).await;

        clock.advance(Duration::seconds(1800));
        manager.touch(&id).await;

        clock.advance(Duration::seconds(3599));
        assert!(manager.is_valid(&id).await);
    }

    #[tokio::test]
    async fn get_does_not_extend_the_session() {
        let (manager, _store, clock) = setup();
        let id = manager.create(&account()).await;

        clock.advance(Duration::seconds(1800));
        assert!(manager.get(&id).await.is_some());

        clock.advance(Duration::seconds(1800));
        assert!(manager.get(&id).await.is_none());
        assert!(!manager.is_valid(&id).await);
    }

    #[tokio::test]
    async fn destroy_is_idempotent_and_terminal() {
        let (manager, _store, _clock) = setup();
        let id = manager.create(&account()).await;

        manager.destroy(&id).await;
        manager.destroy(&id).await;

        assert!(!manager.is_valid(&id).await);
        assert!(manager.get(&id).await.is_none());
    }
}
