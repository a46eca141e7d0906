//! Authentication Models
//!
//! Account and session records plus the request/response shapes exchanged
//! with the rest of the portal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================
// Roles
// ============================================

/// Account role. Closed set; the capability table in [`crate::permissions`]
/// is keyed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Resident,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Resident => "resident",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// Records
// ============================================

/// Account record as held by the credential store.
///
/// The password field only ever holds a salted one-way hash; plaintext never
/// survives past the hashing call that produces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub flat_number: Option<String>,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Live session record. Carries a snapshot of the account taken at login so
/// the caller-visible "current user" never touches the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub login_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

// ============================================
// Request DTOs
// ============================================

/// Self-registration data. The role is always forced to `resident`;
/// elevated accounts are provisioned by building management out of band.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub flat_number: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

// ============================================
// Response DTOs
// ============================================

/// Sanitized account view returned to callers (no hash, no reset token).
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub flat_number: Option<String>,
    pub phone: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<UserAccount> for AccountResponse {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role,
            flat_number: account.flat_number,
            phone: account.phone,
            last_login_at: account.last_login_at,
            created_at: account.created_at,
        }
    }
}

/// Successful login payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: AccountResponse,
    pub session_id: String,
}

/// Receipt for a password-reset request. The message is identical whether or
/// not the email is registered. The raw token appears only when the service
/// is configured to return it; production delivery goes through the email
/// collaborator instead.
#[derive(Debug, Clone, Serialize)]
pub struct ResetRequested {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}
