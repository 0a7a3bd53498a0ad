use crate::domain::*;
use crate::error::Result;
use async_trait::async_trait;

/// Common contract over record persistence.
///
/// The local store and a hosted backend client both implement this, so
/// dashboards and the authoring wizard stay interchangeable between the
/// two. All operations return typed errors; nothing panics across this
/// boundary.
#[async_trait]
pub trait RecordService: Send + Sync {
    // Event operations
    async fn create_event(&self, new: NewEvent) -> Result<EventRecord>;
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<EventRecord>>;
    async fn get_event(&self, id: &str) -> Result<EventRecord>;
    async fn update_event(&self, id: &str, patch: EventPatch) -> Result<EventRecord>;
    async fn delete_event(&self, id: &str) -> Result<()>;

    // Ticket type operations
    async fn create_ticket_type(&self, new: NewTicketType) -> Result<TicketType>;
    async fn list_ticket_types(&self, event_id: &str) -> Result<Vec<TicketType>>;
    async fn update_ticket_type(&self, id: &str, patch: TicketTypePatch) -> Result<TicketType>;
    async fn delete_ticket_type(&self, id: &str) -> Result<()>;

    // Analytics operations
    async fn get_analytics(&self, event_id: &str) -> Result<AnalyticsSnapshot>;
    async fn record_event_view(&self, event_id: &str) -> Result<()>;

    // Attendee operations
    async fn register_attendee(&self, registration: NewRegistration) -> Result<Attendee>;
    async fn list_attendees(&self, event_id: &str) -> Result<Vec<Attendee>>;
    async fn set_attendee_check_in(&self, id: &str, status: CheckInStatus) -> Result<Attendee>;

    // Campaign operations
    async fn create_campaign(&self, new: NewCampaign) -> Result<MarketingCampaign>;
    async fn list_campaigns(&self, event_id: &str) -> Result<Vec<MarketingCampaign>>;
    async fn update_campaign(&self, id: &str, patch: CampaignPatch) -> Result<MarketingCampaign>;
    async fn delete_campaign(&self, id: &str) -> Result<()>;
}
