use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignChannel {
    Email,
    Social,
    Sms,
    Push,
}

impl fmt::Display for CampaignChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CampaignChannel::Email => "email",
            CampaignChannel::Social => "social",
            CampaignChannel::Sms => "sms",
            CampaignChannel::Push => "push",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Sent,
    Cancelled,
}

impl CampaignStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, CampaignStatus::Sent | CampaignStatus::Cancelled)
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Scheduled => "scheduled",
            CampaignStatus::Sent => "sent",
            CampaignStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// A marketing push for one event.
///
/// `sent_at` and the engagement rates are present exactly when the
/// campaign has been dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketingCampaign {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub channel: CampaignChannel,
    pub subject: String,
    pub content: String,
    pub audience: String,
    pub status: CampaignStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub open_rate: Option<f64>,
    pub click_rate: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Arguments for creating a campaign; new campaigns start as drafts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCampaign {
    pub event_id: String,
    pub name: String,
    pub channel: CampaignChannel,
    pub subject: String,
    pub content: String,
    pub audience: String,
}

impl NewCampaign {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(StoreError::validation("name", "must not be empty"));
        }
        Ok(())
    }
}

/// Typed partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignPatch {
    pub name: Option<String>,
    pub channel: Option<CampaignChannel>,
    pub subject: Option<String>,
    pub content: Option<String>,
    pub audience: Option<String>,
    pub status: Option<CampaignStatus>,
}

impl CampaignPatch {
    pub fn apply_to(&self, campaign: &mut MarketingCampaign) {
        if let Some(name) = &self.name {
            campaign.name = name.clone();
        }
        if let Some(channel) = self.channel {
            campaign.channel = channel;
        }
        if let Some(subject) = &self.subject {
            campaign.subject = subject.clone();
        }
        if let Some(content) = &self.content {
            campaign.content = content.clone();
        }
        if let Some(audience) = &self.audience {
            campaign.audience = audience.clone();
        }
        if let Some(status) = self.status {
            campaign.status = status;
        }
    }
}
