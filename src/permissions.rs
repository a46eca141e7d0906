//! Role Permissions
//!
//! Static mapping from role to the capabilities it grants. The table is
//! fixed at compile time; there is no runtime mutation.

use crate::models::Role;
use serde::{Deserialize, Serialize};

/// A named permission a role may or may not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    CreateSurvey,
    CreateQuiz,
    ManageUsers,
    ManageContent,
    RespondSurvey,
    TakeQuiz,
    ManageMaintenance,
    RequestMaintenance,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CreateSurvey => "create_survey",
            Capability::CreateQuiz => "create_quiz",
            Capability::ManageUsers => "manage_users",
            Capability::ManageContent => "manage_content",
            Capability::RespondSurvey => "respond_survey",
            Capability::TakeQuiz => "take_quiz",
            Capability::ManageMaintenance => "manage_maintenance",
            Capability::RequestMaintenance => "request_maintenance",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Capabilities granted to a role.
pub fn capabilities(role: Role) -> &'static [Capability] {
    use Capability::*;

    match role {
        Role::Admin => &[CreateSurvey, CreateQuiz, ManageUsers, ManageContent],
        Role::Staff => &[RespondSurvey, TakeQuiz, ManageMaintenance],
        Role::Resident => &[RespondSurvey, TakeQuiz, RequestMaintenance],
    }
}

/// Whether a role grants a capability.
pub fn has_capability(role: Role, capability: Capability) -> bool {
    capabilities(role).contains(&capability)
}
