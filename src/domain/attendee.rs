use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    Pending,
    CheckedIn,
    NoShow,
}

impl fmt::Display for CheckInStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckInStatus::Pending => "pending",
            CheckInStatus::CheckedIn => "checked-in",
            CheckInStatus::NoShow => "no-show",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for CheckInStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(CheckInStatus::Pending),
            "checked-in" | "checked_in" => Ok(CheckInStatus::CheckedIn),
            "no-show" | "no_show" => Ok(CheckInStatus::NoShow),
            other => Err(format!("unknown check-in status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Refunded,
}

/// A registration tying a user to an event and, optionally, to the
/// ticket type they bought.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendee {
    pub id: String,
    pub event_id: String,
    pub ticket_type_id: Option<String>,
    pub user_id: String,
    pub registered_at: DateTime<Utc>,
    pub check_in: CheckInStatus,
    pub payment: PaymentStatus,
}

/// Arguments for registering a user for an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRegistration {
    pub event_id: String,
    pub ticket_type_id: Option<String>,
    pub user_id: String,
}

impl NewRegistration {
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(StoreError::validation("user_id", "must not be empty"));
        }
        Ok(())
    }
}
