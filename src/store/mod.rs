//! Local record store: an async, latency-simulating CRUD façade over
//! the durable key-value backend, with fixture bootstrapping and
//! cascading deletes.
//!
//! Every mutation is a whole-collection read-modify-write. A
//! per-collection async mutex is held across the entire cycle,
//! simulated latency included, so overlapping calls never interleave
//! and never lose a write.

mod backend;
mod fixtures;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use fixtures::{fixture_set, FixtureSet, FIXTURE_ADMIN_ID, FIXTURE_ORGANIZER_ID};

pub(crate) use backend::{read_json, write_json};

use crate::config::StoreConfig;
use crate::constants::{
    ANALYTICS_KEY, ATTENDEES_KEY, CAMPAIGNS_KEY, DEFAULT_CURRENCY, EVENTS_KEY, TICKET_TYPES_KEY,
    USERS_KEY,
};
use crate::domain::*;
use crate::error::{Result, StoreError};
use crate::identity::{IdGenerator, TokenIdGenerator};
use crate::service::RecordService;
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Simulated network latency bounds for store operations.
#[derive(Debug, Clone, Copy)]
pub struct Latency {
    min_ms: u64,
    max_ms: u64,
}

impl Latency {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms,
            max_ms: max_ms.max(min_ms),
        }
    }

    pub fn none() -> Self {
        Self {
            min_ms: 0,
            max_ms: 0,
        }
    }

    async fn simulate(&self) {
        if self.max_ms == 0 {
            return;
        }
        let delay_ms = if self.min_ms == self.max_ms {
            self.min_ms
        } else {
            rand::thread_rng().gen_range(self.min_ms..=self.max_ms)
        };
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

/// One async mutex per persisted collection. Multi-collection
/// operations always acquire in declaration order: events, ticket
/// types, attendees, analytics, campaigns.
#[derive(Default)]
struct CollectionLocks {
    events: Mutex<()>,
    ticket_types: Mutex<()>,
    attendees: Mutex<()>,
    analytics: Mutex<()>,
    campaigns: Mutex<()>,
}

pub struct RecordStore {
    backend: Arc<dyn StorageBackend>,
    ids: Arc<dyn IdGenerator>,
    latency: Latency,
    plan_event_limit: Option<usize>,
    locks: CollectionLocks,
}

impl RecordStore {
    /// Opens the store over a data directory, seeding fixture
    /// collections on first use.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let backend = Arc::new(FileBackend::open(config.data_dir.as_str())?);
        let store = Self::with_backend(
            backend,
            Arc::new(TokenIdGenerator::new()),
            Latency::new(config.latency_min_ms, config.latency_max_ms),
            config.plan_event_limit,
        );
        if config.seed_fixtures && store.backend.load(EVENTS_KEY)?.is_none() {
            store.seed_fixtures()?;
        }
        Ok(store)
    }

    pub fn with_backend(
        backend: Arc<dyn StorageBackend>,
        ids: Arc<dyn IdGenerator>,
        latency: Latency,
        plan_event_limit: Option<usize>,
    ) -> Self {
        Self {
            backend,
            ids,
            latency,
            plan_event_limit,
            locks: CollectionLocks::default(),
        }
    }

    /// Writes the fixture collections, replacing whatever is stored.
    pub fn seed_fixtures(&self) -> Result<()> {
        let fx = fixture_set();
        self.write_collection(EVENTS_KEY, &fx.events)?;
        self.write_collection(TICKET_TYPES_KEY, &fx.ticket_types)?;
        self.write_collection(ATTENDEES_KEY, &fx.attendees)?;
        self.write_collection(ANALYTICS_KEY, &fx.analytics)?;
        self.write_collection(CAMPAIGNS_KEY, &fx.campaigns)?;
        self.write_collection(USERS_KEY, &fx.users)?;
        debug!("Seeded fixture collections");
        Ok(())
    }

    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        read_json(self.backend.as_ref(), key)
    }

    fn write_collection<T: Serialize>(&self, key: &str, records: &[T]) -> Result<()> {
        write_json(self.backend.as_ref(), key, records)
    }

    fn event_exists(&self, event_id: &str) -> Result<()> {
        let events: Vec<EventRecord> = self.read_collection(EVENTS_KEY);
        if events.iter().any(|e| e.id == event_id) {
            Ok(())
        } else {
            Err(StoreError::not_found("event", event_id))
        }
    }

    /// Best-effort removal of dependent rows; a failed write is logged
    /// and does not block the primary delete.
    async fn remove_where<T, F>(&self, lock: &Mutex<()>, key: &str, entity: &str, keep: F)
    where
        T: Serialize + DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let _guard = lock.lock().await;
        let mut rows: Vec<T> = self.read_collection(key);
        rows.retain(|row| keep(row));
        if let Err(e) = self.write_collection(key, &rows) {
            warn!("Cascade cleanup of {} failed: {}", entity, e);
        }
    }

    fn plausible_snapshot(&self, event_id: &str) -> AnalyticsSnapshot {
        let mut rng = rand::thread_rng();
        let views = rng.gen_range(200..5_000u64);
        let registrations = rng.gen_range(0..=views / 4);
        let revenue = registrations as f64 * rng.gen_range(15.0..90.0);
        let mut referrers: Vec<ReferrerSource> = ["direct", "search", "social", "email"]
            .iter()
            .map(|source| ReferrerSource {
                source: source.to_string(),
                visits: rng.gen_range(0..=views / 2),
            })
            .collect();
        referrers.sort_by(|a, b| b.visits.cmp(&a.visits));
        AnalyticsSnapshot {
            id: self.ids.next_id("ana"),
            event_id: event_id.to_string(),
            views,
            registrations,
            revenue,
            referrers,
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl RecordService for RecordStore {
    async fn create_event(&self, new: NewEvent) -> Result<EventRecord> {
        new.validate()?;
        let _guard = self.locks.events.lock().await;
        self.latency.simulate().await;

        let mut events: Vec<EventRecord> = self.read_collection(EVENTS_KEY);
        if let Some(limit) = self.plan_event_limit {
            let owned = events
                .iter()
                .filter(|e| e.organizer_id == new.organizer_id)
                .count();
            if owned >= limit {
                return Err(StoreError::UpgradeRequired(format!(
                    "the current plan allows {} events; upgrade to create more",
                    limit
                )));
            }
        }

        let now = Utc::now();
        let event = EventRecord {
            id: self.ids.next_id("evt"),
            organizer_id: new.organizer_id,
            title: new.title,
            description: new.description,
            category: new.category,
            starts_at: new.starts_at,
            venue: new.venue,
            cover_image_url: new.cover_image_url,
            status: new.status.unwrap_or(EventStatus::Draft),
            visibility: new.visibility.unwrap_or(Visibility::Public),
            price: new.price,
            currency: new.currency,
            created_at: now,
            updated_at: now,
        };
        events.push(event.clone());
        self.write_collection(EVENTS_KEY, &events)?;

        // Every event gets a zero-initialized analytics companion.
        {
            let _analytics_guard = self.locks.analytics.lock().await;
            let mut snapshots: Vec<AnalyticsSnapshot> = self.read_collection(ANALYTICS_KEY);
            snapshots.push(AnalyticsSnapshot::zeroed(
                self.ids.next_id("ana"),
                &event.id,
                now,
            ));
            if let Err(e) = self.write_collection(ANALYTICS_KEY, &snapshots) {
                warn!("Failed to seed analytics for event {}: {}", event.id, e);
            }
        }

        debug!("Created event: {} with id {}", event.title, event.id);
        Ok(event)
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<EventRecord>> {
        self.latency.simulate().await;

        let mut events: Vec<EventRecord> = self.read_collection(EVENTS_KEY);
        events.retain(|e| filter.matches(e));
        events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));

        let offset = filter.offset.unwrap_or(0);
        let end = match filter.limit {
            Some(limit) => std::cmp::min(offset + limit, events.len()),
            None => events.len(),
        };
        Ok(events.get(offset..end).unwrap_or(&[]).to_vec())
    }

    async fn get_event(&self, id: &str) -> Result<EventRecord> {
        self.latency.simulate().await;

        let events: Vec<EventRecord> = self.read_collection(EVENTS_KEY);
        events
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::not_found("event", id))
    }

    async fn update_event(&self, id: &str, patch: EventPatch) -> Result<EventRecord> {
        let _guard = self.locks.events.lock().await;
        self.latency.simulate().await;

        let mut events: Vec<EventRecord> = self.read_collection(EVENTS_KEY);
        let event = match events.iter_mut().find(|e| e.id == id) {
            Some(event) => event,
            None => return Err(StoreError::not_found("event", id)),
        };

        if let Some(next) = patch.status {
            if !event.status.can_transition_to(next) {
                return Err(StoreError::DomainConflict(format!(
                    "event {} cannot move from {} to {}",
                    id, event.status, next
                )));
            }
        }

        patch.apply_to(event);
        event.updated_at = Utc::now();
        let updated = event.clone();
        self.write_collection(EVENTS_KEY, &events)?;

        debug!("Updated event: {} with id {}", updated.title, updated.id);
        Ok(updated)
    }

    async fn delete_event(&self, id: &str) -> Result<()> {
        let _guard = self.locks.events.lock().await;
        self.latency.simulate().await;

        let mut events: Vec<EventRecord> = self.read_collection(EVENTS_KEY);
        let before = events.len();
        events.retain(|e| e.id != id);
        if events.len() == before {
            // Idempotent delete: absent records delete successfully.
            debug!("Delete of absent event {} reported as success", id);
            return Ok(());
        }
        self.write_collection(EVENTS_KEY, &events)?;

        self.remove_where::<TicketType, _>(&self.locks.ticket_types, TICKET_TYPES_KEY, "ticket types", |t| t.event_id != id)
            .await;
        self.remove_where::<Attendee, _>(&self.locks.attendees, ATTENDEES_KEY, "attendees", |a| {
            a.event_id != id
        })
        .await;
        self.remove_where::<AnalyticsSnapshot, _>(&self.locks.analytics, ANALYTICS_KEY, "analytics", |s| s.event_id != id)
            .await;
        self.remove_where::<MarketingCampaign, _>(&self.locks.campaigns, CAMPAIGNS_KEY, "campaigns", |c| c.event_id != id)
            .await;

        debug!("Deleted event {} and its dependent rows", id);
        Ok(())
    }

    async fn create_ticket_type(&self, new: NewTicketType) -> Result<TicketType> {
        new.validate()?;
        self.event_exists(&new.event_id)?;

        let _guard = self.locks.ticket_types.lock().await;
        self.latency.simulate().await;

        let mut tickets: Vec<TicketType> = self.read_collection(TICKET_TYPES_KEY);
        let ticket = TicketType {
            id: self.ids.next_id("tkt"),
            event_id: new.event_id,
            name: new.name,
            description: new.description,
            price: new.price,
            currency: new.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            quantity: new.quantity,
            sold: 0,
            sale_starts_at: new.sale_starts_at,
            sale_ends_at: new.sale_ends_at,
            active: true,
            benefits: new.benefits,
            restrictions: new.restrictions,
        };
        tickets.push(ticket.clone());
        self.write_collection(TICKET_TYPES_KEY, &tickets)?;

        debug!("Created ticket type: {} with id {}", ticket.name, ticket.id);
        Ok(ticket)
    }

    async fn list_ticket_types(&self, event_id: &str) -> Result<Vec<TicketType>> {
        self.latency.simulate().await;

        let mut tickets: Vec<TicketType> = self.read_collection(TICKET_TYPES_KEY);
        tickets.retain(|t| t.event_id == event_id);
        tickets.sort_by(|a, b| a.price.total_cmp(&b.price));
        Ok(tickets)
    }

    async fn update_ticket_type(&self, id: &str, patch: TicketTypePatch) -> Result<TicketType> {
        let _guard = self.locks.ticket_types.lock().await;
        self.latency.simulate().await;

        let mut tickets: Vec<TicketType> = self.read_collection(TICKET_TYPES_KEY);
        let ticket = match tickets.iter_mut().find(|t| t.id == id) {
            Some(ticket) => ticket,
            None => return Err(StoreError::not_found("ticket type", id)),
        };

        let mut merged = ticket.clone();
        patch.apply_to(&mut merged);
        TicketTypePatch::validate_merged(&merged)?;
        *ticket = merged.clone();
        self.write_collection(TICKET_TYPES_KEY, &tickets)?;

        debug!("Updated ticket type: {} with id {}", merged.name, merged.id);
        Ok(merged)
    }

    async fn delete_ticket_type(&self, id: &str) -> Result<()> {
        let _guard = self.locks.ticket_types.lock().await;
        self.latency.simulate().await;

        let mut tickets: Vec<TicketType> = self.read_collection(TICKET_TYPES_KEY);
        let position = match tickets.iter().position(|t| t.id == id) {
            Some(position) => position,
            None => return Ok(()),
        };
        let sold = tickets[position].sold;
        if sold > 0 {
            // Sold tickets stay on record for audit and revenue history.
            return Err(StoreError::DomainConflict(format!(
                "ticket type {} has {} sold tickets and cannot be deleted",
                id, sold
            )));
        }
        tickets.remove(position);
        self.write_collection(TICKET_TYPES_KEY, &tickets)?;

        debug!("Deleted ticket type {}", id);
        Ok(())
    }

    async fn get_analytics(&self, event_id: &str) -> Result<AnalyticsSnapshot> {
        self.event_exists(event_id)?;

        let _guard = self.locks.analytics.lock().await;
        self.latency.simulate().await;

        let mut snapshots: Vec<AnalyticsSnapshot> = self.read_collection(ANALYTICS_KEY);
        if let Some(snapshot) = snapshots.iter().find(|s| s.event_id == event_id) {
            return Ok(snapshot.clone());
        }

        // An existing event never reads back "no analytics".
        let snapshot = self.plausible_snapshot(event_id);
        snapshots.push(snapshot.clone());
        self.write_collection(ANALYTICS_KEY, &snapshots)?;

        debug!("Lazily created analytics snapshot for event {}", event_id);
        Ok(snapshot)
    }

    async fn record_event_view(&self, event_id: &str) -> Result<()> {
        self.event_exists(event_id)?;

        let _guard = self.locks.analytics.lock().await;
        self.latency.simulate().await;

        let now = Utc::now();
        let mut snapshots: Vec<AnalyticsSnapshot> = self.read_collection(ANALYTICS_KEY);
        match snapshots.iter_mut().find(|s| s.event_id == event_id) {
            Some(snapshot) => {
                snapshot.views += 1;
                snapshot.updated_at = now;
            }
            None => {
                let mut snapshot =
                    AnalyticsSnapshot::zeroed(self.ids.next_id("ana"), event_id, now);
                snapshot.views = 1;
                snapshots.push(snapshot);
            }
        }
        self.write_collection(ANALYTICS_KEY, &snapshots)?;
        Ok(())
    }

    async fn register_attendee(&self, registration: NewRegistration) -> Result<Attendee> {
        registration.validate()?;
        self.event_exists(&registration.event_id)?;

        let _tickets_guard = self.locks.ticket_types.lock().await;
        let _attendees_guard = self.locks.attendees.lock().await;
        self.latency.simulate().await;

        let mut tickets: Vec<TicketType> = self.read_collection(TICKET_TYPES_KEY);
        let mut price_paid = 0.0;
        let mut tickets_dirty = false;
        if let Some(ticket_id) = &registration.ticket_type_id {
            let ticket = match tickets.iter_mut().find(|t| &t.id == ticket_id) {
                Some(ticket) => ticket,
                None => return Err(StoreError::not_found("ticket type", ticket_id.clone())),
            };
            if ticket.event_id != registration.event_id {
                return Err(StoreError::DomainConflict(format!(
                    "ticket type {} does not belong to event {}",
                    ticket_id, registration.event_id
                )));
            }
            if !ticket.active {
                return Err(StoreError::DomainConflict(format!(
                    "ticket type {} is not on sale",
                    ticket_id
                )));
            }
            if ticket.sold >= ticket.quantity {
                return Err(StoreError::DomainConflict(format!(
                    "ticket type {} is sold out",
                    ticket_id
                )));
            }
            ticket.sold += 1;
            price_paid = ticket.price;
            tickets_dirty = true;
        }

        let now = Utc::now();
        let attendee = Attendee {
            id: self.ids.next_id("att"),
            event_id: registration.event_id.clone(),
            ticket_type_id: registration.ticket_type_id.clone(),
            user_id: registration.user_id,
            registered_at: now,
            check_in: CheckInStatus::Pending,
            // The payment collaborator only reports success here; a
            // failed payment never reaches the store.
            payment: PaymentStatus::Completed,
        };
        let mut attendees: Vec<Attendee> = self.read_collection(ATTENDEES_KEY);
        attendees.push(attendee.clone());
        self.write_collection(ATTENDEES_KEY, &attendees)?;
        if tickets_dirty {
            self.write_collection(TICKET_TYPES_KEY, &tickets)?;
        }

        // Fold the registration into the event's analytics.
        {
            let _guard = self.locks.analytics.lock().await;
            let mut snapshots: Vec<AnalyticsSnapshot> = self.read_collection(ANALYTICS_KEY);
            match snapshots.iter_mut().find(|s| s.event_id == registration.event_id) {
                Some(snapshot) => {
                    snapshot.registrations += 1;
                    snapshot.revenue += price_paid;
                    snapshot.updated_at = now;
                }
                None => {
                    let mut snapshot = AnalyticsSnapshot::zeroed(
                        self.ids.next_id("ana"),
                        &registration.event_id,
                        now,
                    );
                    snapshot.registrations = 1;
                    snapshot.revenue = price_paid;
                    snapshots.push(snapshot);
                }
            }
            if let Err(e) = self.write_collection(ANALYTICS_KEY, &snapshots) {
                warn!(
                    "Analytics update for event {} failed: {}",
                    registration.event_id, e
                );
            }
        }

        debug!(
            "Registered attendee {} for event {}",
            attendee.id, attendee.event_id
        );
        Ok(attendee)
    }

    async fn list_attendees(&self, event_id: &str) -> Result<Vec<Attendee>> {
        self.latency.simulate().await;

        let mut attendees: Vec<Attendee> = self.read_collection(ATTENDEES_KEY);
        attendees.retain(|a| a.event_id == event_id);
        attendees.sort_by(|a, b| a.registered_at.cmp(&b.registered_at));
        Ok(attendees)
    }

    async fn set_attendee_check_in(&self, id: &str, status: CheckInStatus) -> Result<Attendee> {
        let _guard = self.locks.attendees.lock().await;
        self.latency.simulate().await;

        let mut attendees: Vec<Attendee> = self.read_collection(ATTENDEES_KEY);
        let attendee = match attendees.iter_mut().find(|a| a.id == id) {
            Some(attendee) => attendee,
            None => return Err(StoreError::not_found("attendee", id)),
        };
        attendee.check_in = status;
        let updated = attendee.clone();
        self.write_collection(ATTENDEES_KEY, &attendees)?;

        debug!("Attendee {} check-in set to {}", id, status);
        Ok(updated)
    }

    async fn create_campaign(&self, new: NewCampaign) -> Result<MarketingCampaign> {
        new.validate()?;
        self.event_exists(&new.event_id)?;

        let _guard = self.locks.campaigns.lock().await;
        self.latency.simulate().await;

        let now = Utc::now();
        let campaign = MarketingCampaign {
            id: self.ids.next_id("cmp"),
            event_id: new.event_id,
            name: new.name,
            channel: new.channel,
            subject: new.subject,
            content: new.content,
            audience: new.audience,
            status: CampaignStatus::Draft,
            sent_at: None,
            open_rate: None,
            click_rate: None,
            created_at: now,
            updated_at: now,
        };
        let mut campaigns: Vec<MarketingCampaign> = self.read_collection(CAMPAIGNS_KEY);
        campaigns.push(campaign.clone());
        self.write_collection(CAMPAIGNS_KEY, &campaigns)?;

        debug!("Created campaign: {} with id {}", campaign.name, campaign.id);
        Ok(campaign)
    }

    async fn list_campaigns(&self, event_id: &str) -> Result<Vec<MarketingCampaign>> {
        self.latency.simulate().await;

        let mut campaigns: Vec<MarketingCampaign> = self.read_collection(CAMPAIGNS_KEY);
        campaigns.retain(|c| c.event_id == event_id);
        campaigns.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(campaigns)
    }

    async fn update_campaign(&self, id: &str, patch: CampaignPatch) -> Result<MarketingCampaign> {
        let _guard = self.locks.campaigns.lock().await;
        self.latency.simulate().await;

        let mut campaigns: Vec<MarketingCampaign> = self.read_collection(CAMPAIGNS_KEY);
        let campaign = match campaigns.iter_mut().find(|c| c.id == id) {
            Some(campaign) => campaign,
            None => return Err(StoreError::not_found("campaign", id)),
        };

        if let Some(next) = patch.status {
            if campaign.status.is_terminal() && next != campaign.status {
                return Err(StoreError::DomainConflict(format!(
                    "campaign {} is {} and cannot change status",
                    id, campaign.status
                )));
            }
        }

        let now = Utc::now();
        patch.apply_to(campaign);
        campaign.updated_at = now;

        // sent_at and engagement rates exist exactly while status is
        // "sent"; dispatch stamps plausible engagement numbers.
        if campaign.status == CampaignStatus::Sent {
            if campaign.sent_at.is_none() {
                let mut rng = rand::thread_rng();
                let open_rate: f64 = rng.gen_range(0.15..0.60);
                campaign.sent_at = Some(now);
                campaign.open_rate = Some(open_rate);
                campaign.click_rate = Some(open_rate * rng.gen_range(0.05..0.50));
            }
        } else {
            campaign.sent_at = None;
            campaign.open_rate = None;
            campaign.click_rate = None;
        }

        let updated = campaign.clone();
        self.write_collection(CAMPAIGNS_KEY, &campaigns)?;

        debug!("Updated campaign: {} with id {}", updated.name, updated.id);
        Ok(updated)
    }

    async fn delete_campaign(&self, id: &str) -> Result<()> {
        let _guard = self.locks.campaigns.lock().await;
        self.latency.simulate().await;

        let mut campaigns: Vec<MarketingCampaign> = self.read_collection(CAMPAIGNS_KEY);
        campaigns.retain(|c| c.id != id);
        self.write_collection(CAMPAIGNS_KEY, &campaigns)?;

        debug!("Deleted campaign {}", id);
        Ok(())
    }
}
