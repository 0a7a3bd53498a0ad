use crate::error::{FieldErrors, Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an event record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Draft,
    Published,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    fn rank(self) -> u8 {
        match self {
            EventStatus::Draft => 0,
            EventStatus::Published => 1,
            EventStatus::Ongoing => 2,
            EventStatus::Completed => 3,
            EventStatus::Cancelled => 4,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, EventStatus::Completed | EventStatus::Cancelled)
    }

    /// Status moves forward only, with cancellation reachable from any
    /// non-terminal status. Writing the current status back is allowed.
    pub fn can_transition_to(self, next: EventStatus) -> bool {
        if self == next {
            return true;
        }
        match next {
            EventStatus::Cancelled => !self.is_terminal(),
            _ => !self.is_terminal() && next.rank() > self.rank(),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventStatus::Draft => "draft",
            EventStatus::Published => "published",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(EventStatus::Draft),
            "published" => Ok(EventStatus::Published),
            "ongoing" => Ok(EventStatus::Ongoing),
            "completed" => Ok(EventStatus::Completed),
            "cancelled" => Ok(EventStatus::Cancelled),
            other => Err(format!("unknown event status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
    Unlisted,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Unlisted => "unlisted",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Conference,
    Workshop,
    Concert,
    Festival,
    Meetup,
    Webinar,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventCategory::Conference => "conference",
            EventCategory::Workshop => "workshop",
            EventCategory::Concert => "concert",
            EventCategory::Festival => "festival",
            EventCategory::Meetup => "meetup",
            EventCategory::Webinar => "webinar",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conference" => Ok(EventCategory::Conference),
            "workshop" => Ok(EventCategory::Workshop),
            "concert" => Ok(EventCategory::Concert),
            "festival" => Ok(EventCategory::Festival),
            "meetup" => Ok(EventCategory::Meetup),
            "webinar" => Ok(EventCategory::Webinar),
            other => Err(format!("unknown event category '{}'", other)),
        }
    }
}

/// Where an event takes place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VenueInfo {
    pub name: String,
    pub address: String,
    pub capacity: u32,
}

/// The canonical persisted representation of an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub organizer_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: EventCategory,
    pub starts_at: DateTime<Utc>,
    pub venue: VenueInfo,
    pub cover_image_url: Option<String>,
    pub status: EventStatus,
    pub visibility: Visibility,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Arguments for creating an event. Status and visibility fall back to
/// draft/public when not supplied; timestamps are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub organizer_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: EventCategory,
    pub starts_at: DateTime<Utc>,
    pub venue: VenueInfo,
    pub cover_image_url: Option<String>,
    pub status: Option<EventStatus>,
    pub visibility: Option<Visibility>,
    pub price: Option<f64>,
    pub currency: Option<String>,
}

impl NewEvent {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.title.trim().is_empty() {
            errors.push("title", "must not be empty");
        }
        if self.organizer_id.trim().is_empty() {
            errors.push("organizer_id", "must not be empty");
        }
        if self.venue.name.trim().is_empty() {
            errors.push("venue.name", "must not be empty");
        }
        if self.venue.capacity == 0 {
            errors.push("venue.capacity", "must be greater than zero");
        }
        if let Some(price) = self.price {
            if price < 0.0 {
                errors.push("price", "must not be negative");
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(errors))
        }
    }
}

/// Typed partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<EventCategory>,
    pub starts_at: Option<DateTime<Utc>>,
    pub venue: Option<VenueInfo>,
    pub cover_image_url: Option<String>,
    pub status: Option<EventStatus>,
    pub visibility: Option<Visibility>,
    pub price: Option<f64>,
    pub currency: Option<String>,
}

impl EventPatch {
    pub fn apply_to(&self, event: &mut EventRecord) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = Some(description.clone());
        }
        if let Some(category) = self.category {
            event.category = category;
        }
        if let Some(starts_at) = self.starts_at {
            event.starts_at = starts_at;
        }
        if let Some(venue) = &self.venue {
            event.venue = venue.clone();
        }
        if let Some(cover_image_url) = &self.cover_image_url {
            event.cover_image_url = Some(cover_image_url.clone());
        }
        if let Some(status) = self.status {
            event.status = status;
        }
        if let Some(visibility) = self.visibility {
            event.visibility = visibility;
        }
        if let Some(price) = self.price {
            event.price = Some(price);
        }
        if let Some(currency) = &self.currency {
            event.currency = Some(currency.clone());
        }
    }
}

/// Equality filters and pagination for event listings.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub category: Option<EventCategory>,
    pub organizer_id: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl EventFilter {
    pub fn matches(&self, event: &EventRecord) -> bool {
        if let Some(status) = self.status {
            if event.status != status {
                return false;
            }
        }
        if let Some(category) = self.category {
            if event.category != category {
                return false;
            }
        }
        if let Some(organizer_id) = &self.organizer_id {
            if &event.organizer_id != organizer_id {
                return false;
            }
        }
        true
    }
}
