use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A traffic source for an event page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferrerSource {
    pub source: String,
    pub visits: u64,
}

/// One-to-one analytics companion of an event record. Created together
/// with its event and never independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub id: String,
    pub event_id: String,
    pub views: u64,
    pub registrations: u64,
    pub revenue: f64,
    /// Kept sorted by visits, descending.
    pub referrers: Vec<ReferrerSource>,
    pub updated_at: DateTime<Utc>,
}

impl AnalyticsSnapshot {
    pub fn zeroed(id: String, event_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            event_id: event_id.to_string(),
            views: 0,
            registrations: 0,
            revenue: 0.0,
            referrers: Vec::new(),
            updated_at: now,
        }
    }

    /// Registrations per view; zero while no views have been recorded.
    pub fn conversion_rate(&self) -> f64 {
        if self.views == 0 {
            0.0
        } else {
            self.registrations as f64 / self.views as f64
        }
    }
}
