//! Durable storage keys and shared defaults.
//!
//! Each collection is persisted as one JSON document under its key; the
//! admin session and the security log get their own keys.

pub const EVENTS_KEY: &str = "eventdesk.events";
pub const TICKET_TYPES_KEY: &str = "eventdesk.ticket_types";
pub const ATTENDEES_KEY: &str = "eventdesk.attendees";
pub const ANALYTICS_KEY: &str = "eventdesk.analytics";
pub const CAMPAIGNS_KEY: &str = "eventdesk.campaigns";
pub const USERS_KEY: &str = "eventdesk.users";
pub const ADMIN_SESSION_KEY: &str = "eventdesk.admin_session";
pub const SECURITY_LOG_KEY: &str = "eventdesk.security_log";

pub const DEFAULT_CURRENCY: &str = "USD";
