//! Event authoring wizard: a strictly linear five-phase flow that
//! accumulates one draft and, from the final step, submits it as a
//! draft or published event.

use crate::domain::{
    EventCategory, EventRecord, EventStatus, NewEvent, NewTicketType, VenueInfo, Visibility,
};
use crate::error::{FieldErrors, Result, StoreError};
use crate::service::RecordService;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// The five authoring phases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Requirements,
    Design,
    Implementation,
    Verification,
    Maintenance,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Requirements,
        WizardStep::Design,
        WizardStep::Implementation,
        WizardStep::Verification,
        WizardStep::Maintenance,
    ];

    /// Advances exactly one step; a no-op at the final step.
    pub fn next(self) -> Self {
        match self {
            WizardStep::Requirements => WizardStep::Design,
            WizardStep::Design => WizardStep::Implementation,
            WizardStep::Implementation => WizardStep::Verification,
            WizardStep::Verification => WizardStep::Maintenance,
            WizardStep::Maintenance => WizardStep::Maintenance,
        }
    }

    /// Retreats exactly one step; a no-op at the first step.
    pub fn back(self) -> Self {
        match self {
            WizardStep::Requirements => WizardStep::Requirements,
            WizardStep::Design => WizardStep::Requirements,
            WizardStep::Implementation => WizardStep::Design,
            WizardStep::Verification => WizardStep::Implementation,
            WizardStep::Maintenance => WizardStep::Verification,
        }
    }

    pub fn is_final(self) -> bool {
        matches!(self, WizardStep::Maintenance)
    }

    pub fn position(self) -> usize {
        match self {
            WizardStep::Requirements => 0,
            WizardStep::Design => 1,
            WizardStep::Implementation => 2,
            WizardStep::Verification => 3,
            WizardStep::Maintenance => 4,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftSummary {
    pub event_name: String,
    pub starts_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementsPhase {
    pub title: String,
    pub description: String,
    pub category: Option<EventCategory>,
    pub expected_attendance: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignPhase {
    pub venue: Option<VenueInfo>,
    pub cover_image_url: Option<String>,
    pub theme_notes: String,
}

/// A ticket tier sketched during authoring; becomes a TicketType on
/// successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketPlan {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub sale_starts_at: DateTime<Utc>,
    pub sale_ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImplementationPhase {
    pub starts_at: Option<DateTime<Utc>>,
    pub ticket_plans: Vec<TicketPlan>,
    pub base_price: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationPhase {
    pub visibility: Option<Visibility>,
    pub checklist_complete: bool,
    pub review_notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaintenancePhase {
    pub followup_contact: String,
    pub archive_after_days: Option<u32>,
}

/// The transient in-progress event, organized by authoring phase.
/// Lives only in the controller until an exit action succeeds; nothing
/// is persisted before that.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WizardDraft {
    pub summary: DraftSummary,
    pub requirements: RequirementsPhase,
    pub design: DesignPhase,
    pub implementation: ImplementationPhase,
    pub verification: VerificationPhase,
    pub maintenance: MaintenancePhase,
}

impl WizardDraft {
    /// Builds the submission payload. Only the event's own required
    /// fields gate submission; an empty ticket plan list is fine.
    fn to_new_event(&self, organizer_id: &str, status: EventStatus) -> Result<NewEvent> {
        let mut errors = FieldErrors::new();

        let title = if !self.requirements.title.trim().is_empty() {
            self.requirements.title.clone()
        } else {
            self.summary.event_name.clone()
        };
        if title.trim().is_empty() {
            errors.push("requirements.title", "must not be empty");
        }

        let category = self.requirements.category;
        if category.is_none() {
            errors.push("requirements.category", "must be chosen");
        }

        let starts_at = self.implementation.starts_at.or(self.summary.starts_at);
        if starts_at.is_none() {
            errors.push("implementation.starts_at", "must be set");
        }

        let venue = self.design.venue.clone();
        if venue.is_none() {
            errors.push("design.venue", "must be chosen");
        }

        let description = if self.requirements.description.trim().is_empty() {
            None
        } else {
            Some(self.requirements.description.clone())
        };

        match (category, starts_at, venue) {
            (Some(category), Some(starts_at), Some(venue)) if errors.is_empty() => Ok(NewEvent {
                organizer_id: organizer_id.to_string(),
                title,
                description,
                category,
                starts_at,
                venue,
                cover_image_url: self.design.cover_image_url.clone(),
                status: Some(status),
                visibility: self.verification.visibility,
                price: self.implementation.base_price,
                currency: self.implementation.currency.clone(),
            }),
            _ => Err(StoreError::Validation(errors)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAction {
    SaveDraft,
    Publish,
}

impl ExitAction {
    fn status(self) -> EventStatus {
        match self {
            ExitAction::SaveDraft => EventStatus::Draft,
            ExitAction::Publish => EventStatus::Published,
        }
    }
}

/// Result of a wizard exit action. `UpgradeRequired` is distinct from
/// `Failed` so the caller can show an upgrade prompt instead of a
/// generic error banner.
#[derive(Debug)]
pub enum SubmitOutcome {
    Created(EventRecord),
    UpgradeRequired { message: String },
    Failed { message: String },
    /// A submission is already pending; this one was rejected outright.
    InFlight,
}

struct WizardState {
    step: WizardStep,
    draft: WizardDraft,
}

/// Drives the five-phase authoring flow over any record service.
pub struct EventWizard {
    service: Arc<dyn RecordService>,
    organizer_id: String,
    state: Mutex<WizardState>,
    submitting: AtomicBool,
}

impl EventWizard {
    pub fn new(service: Arc<dyn RecordService>, organizer_id: impl Into<String>) -> Self {
        Self {
            service,
            organizer_id: organizer_id.into(),
            state: Mutex::new(WizardState {
                step: WizardStep::Requirements,
                draft: WizardDraft::default(),
            }),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.state.lock().unwrap().step
    }

    pub fn next(&self) -> WizardStep {
        let mut state = self.state.lock().unwrap();
        state.step = state.step.next();
        state.step
    }

    pub fn back(&self) -> WizardStep {
        let mut state = self.state.lock().unwrap();
        state.step = state.step.back();
        state.step
    }

    /// Snapshot of the accumulated draft.
    pub fn draft(&self) -> WizardDraft {
        self.state.lock().unwrap().draft.clone()
    }

    // Each phase setter writes only its own sub-object; sibling phases
    // are never touched.

    pub fn set_summary(&self, summary: DraftSummary) {
        self.state.lock().unwrap().draft.summary = summary;
    }

    pub fn set_requirements(&self, phase: RequirementsPhase) {
        self.state.lock().unwrap().draft.requirements = phase;
    }

    pub fn set_design(&self, phase: DesignPhase) {
        self.state.lock().unwrap().draft.design = phase;
    }

    pub fn set_implementation(&self, phase: ImplementationPhase) {
        self.state.lock().unwrap().draft.implementation = phase;
    }

    pub fn set_verification(&self, phase: VerificationPhase) {
        self.state.lock().unwrap().draft.verification = phase;
    }

    pub fn set_maintenance(&self, phase: MaintenancePhase) {
        self.state.lock().unwrap().draft.maintenance = phase;
    }

    pub async fn save_draft(&self) -> SubmitOutcome {
        self.submit(ExitAction::SaveDraft).await
    }

    pub async fn publish(&self) -> SubmitOutcome {
        self.submit(ExitAction::Publish).await
    }

    async fn submit(&self, action: ExitAction) -> SubmitOutcome {
        // At most one submission may be in flight.
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return SubmitOutcome::InFlight;
        }
        let outcome = self.submit_inner(action).await;
        self.submitting.store(false, Ordering::SeqCst);
        outcome
    }

    async fn submit_inner(&self, action: ExitAction) -> SubmitOutcome {
        let (step, draft) = {
            let state = self.state.lock().unwrap();
            (state.step, state.draft.clone())
        };
        if !step.is_final() {
            return SubmitOutcome::Failed {
                message: "the wizard must reach the final step before submitting".to_string(),
            };
        }

        let new_event = match draft.to_new_event(&self.organizer_id, action.status()) {
            Ok(new_event) => new_event,
            Err(e) => {
                return SubmitOutcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        match self.service.create_event(new_event).await {
            Ok(event) => {
                self.create_ticket_plans(&event, &draft).await;
                // Ownership of the draft transferred to the store.
                let mut state = self.state.lock().unwrap();
                state.draft = WizardDraft::default();
                state.step = WizardStep::Requirements;
                debug!("Submitted event {} via {:?}", event.id, action);
                SubmitOutcome::Created(event)
            }
            Err(StoreError::UpgradeRequired(message)) => {
                // Draft retained; the user may upgrade and retry.
                SubmitOutcome::UpgradeRequired { message }
            }
            Err(e) => {
                // Draft retained; the user may retry without re-entering data.
                SubmitOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    async fn create_ticket_plans(&self, event: &EventRecord, draft: &WizardDraft) {
        for plan in &draft.implementation.ticket_plans {
            let new = NewTicketType {
                event_id: event.id.clone(),
                name: plan.name.clone(),
                description: None,
                price: plan.price,
                currency: draft.implementation.currency.clone(),
                quantity: plan.quantity,
                sale_starts_at: plan.sale_starts_at,
                sale_ends_at: plan.sale_ends_at,
                benefits: Vec::new(),
                restrictions: Vec::new(),
            };
            if let Err(e) = self.service.create_ticket_type(new).await {
                warn!(
                    "Ticket plan '{}' for event {} was not created: {}",
                    plan.name, event.id, e
                );
            }
        }
    }
}
