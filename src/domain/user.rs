use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Organizer,
    Attendee,
}

/// A portal account. Credentials here are fixture data for the local
/// mock layer; the hosted auth service owns real verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Consulted before granting admin-panel access.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SecurityAction {
    SignInSucceeded,
    SignInFailed,
    SignedOut,
    SessionExpired,
}

/// One row of the append-only security log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityLogEntry {
    pub at: DateTime<Utc>,
    pub email: String,
    pub action: SecurityAction,
    pub detail: Option<String>,
}
