use anyhow::Result;
use chrono::{TimeZone, Utc};
use eventdesk::config::StoreConfig;
use eventdesk::constants::{ANALYTICS_KEY, EVENTS_KEY};
use eventdesk::domain::{
    CheckInStatus, EventCategory, EventFilter, EventPatch, EventStatus, NewCampaign, NewEvent,
    NewRegistration, NewTicketType, TicketTypePatch, VenueInfo,
};
use eventdesk::error::StoreError;
use eventdesk::identity::TokenIdGenerator;
use eventdesk::service::RecordService;
use eventdesk::store::{Latency, MemoryBackend, RecordStore, StorageBackend};
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::tempdir;

fn memory_store(latency: Latency, plan_event_limit: Option<usize>) -> (Arc<MemoryBackend>, Arc<RecordStore>) {
    let backend = Arc::new(MemoryBackend::new());
    let store = Arc::new(RecordStore::with_backend(
        backend.clone(),
        Arc::new(TokenIdGenerator::new()),
        latency,
        plan_event_limit,
    ));
    (backend, store)
}

fn sample_event(title: &str) -> NewEvent {
    NewEvent {
        organizer_id: "usr_test_organizer".to_string(),
        title: title.to_string(),
        description: Some("An event created by a test".to_string()),
        category: EventCategory::Conference,
        starts_at: Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap(),
        venue: VenueInfo {
            name: "Harbor Hall".to_string(),
            address: "1 Pier Way".to_string(),
            capacity: 300,
        },
        cover_image_url: None,
        status: None,
        visibility: None,
        price: Some(50.0),
        currency: Some("USD".to_string()),
    }
}

fn sample_ticket(event_id: &str, name: &str) -> NewTicketType {
    NewTicketType {
        event_id: event_id.to_string(),
        name: name.to_string(),
        description: None,
        price: 25.0,
        currency: None,
        quantity: 2,
        sale_starts_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        sale_ends_at: Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap(),
        benefits: Vec::new(),
        restrictions: Vec::new(),
    }
}

#[tokio::test]
async fn test_concurrent_creates_assign_distinct_identities() -> Result<()> {
    let (_backend, store) = memory_store(Latency::new(1, 5), None);

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.create_event(sample_event(&format!("Event {}", i))).await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let event = handle.await??;
        ids.insert(event.id);
    }
    assert_eq!(ids.len(), 20);

    let all = store.list_events(&EventFilter::default()).await?;
    assert_eq!(all.len(), 20);
    Ok(())
}

#[tokio::test]
async fn test_overlapping_creates_do_not_lose_writes() -> Result<()> {
    let (_backend, store) = memory_store(Latency::new(5, 15), None);

    // Fire both mutations before awaiting either.
    let first = store.create_event(sample_event("A"));
    let second = store.create_event(sample_event("B"));
    let (first, second) = tokio::join!(first, second);
    first?;
    second?;

    let all = store.list_events(&EventFilter::default()).await?;
    let titles: Vec<&str> = all.iter().map(|e| e.title.as_str()).collect();
    assert!(titles.contains(&"A"));
    assert!(titles.contains(&"B"));
    Ok(())
}

#[tokio::test]
async fn test_cascade_delete_leaves_no_dependent_rows() -> Result<()> {
    let (backend, store) = memory_store(Latency::none(), None);

    let event = store.create_event(sample_event("Doomed")).await?;
    let ticket = store.create_ticket_type(sample_ticket(&event.id, "GA")).await?;
    store
        .register_attendee(NewRegistration {
            event_id: event.id.clone(),
            ticket_type_id: Some(ticket.id.clone()),
            user_id: "usr_test_guest".to_string(),
        })
        .await?;
    store
        .create_campaign(NewCampaign {
            event_id: event.id.clone(),
            name: "Announcement".to_string(),
            channel: eventdesk::domain::CampaignChannel::Email,
            subject: "Hello".to_string(),
            content: "World".to_string(),
            audience: "everyone".to_string(),
        })
        .await?;

    store.delete_event(&event.id).await?;

    assert!(matches!(
        store.get_event(&event.id).await,
        Err(StoreError::NotFound { .. })
    ));
    assert!(store.list_ticket_types(&event.id).await?.is_empty());
    assert!(store.list_attendees(&event.id).await?.is_empty());
    assert!(store.list_campaigns(&event.id).await?.is_empty());
    let raw = backend.load(ANALYTICS_KEY)?.unwrap_or_default();
    assert!(!raw.contains(&event.id));

    // Deleting again is still a success.
    store.delete_event(&event.id).await?;
    Ok(())
}

#[tokio::test]
async fn test_sold_ticket_types_cannot_be_deleted() -> Result<()> {
    let (_backend, store) = memory_store(Latency::none(), None);

    let event = store.create_event(sample_event("Ticketed")).await?;
    let sold_out = store.create_ticket_type(sample_ticket(&event.id, "GA")).await?;
    let unsold = store.create_ticket_type(sample_ticket(&event.id, "VIP")).await?;

    store
        .register_attendee(NewRegistration {
            event_id: event.id.clone(),
            ticket_type_id: Some(sold_out.id.clone()),
            user_id: "usr_test_guest".to_string(),
        })
        .await?;

    let result = store.delete_ticket_type(&sold_out.id).await;
    assert!(matches!(result, Err(StoreError::DomainConflict(_))));

    // The guarded row is untouched.
    let tickets = store.list_ticket_types(&event.id).await?;
    let kept = tickets.iter().find(|t| t.id == sold_out.id).unwrap();
    assert_eq!(kept.sold, 1);
    assert_eq!(kept.name, "GA");

    // An unsold ticket type deletes fine.
    store.delete_ticket_type(&unsold.id).await?;
    let tickets = store.list_ticket_types(&event.id).await?;
    assert!(tickets.iter().all(|t| t.id != unsold.id));
    Ok(())
}

#[tokio::test]
async fn test_created_records_round_trip_through_the_file_backend() -> Result<()> {
    let dir = tempdir()?;
    let config = StoreConfig {
        data_dir: dir.path().to_string_lossy().into_owned(),
        latency_min_ms: 0,
        latency_max_ms: 0,
        seed_fixtures: false,
        plan_event_limit: None,
    };

    let created_id = {
        let store = RecordStore::open(&config)?;
        let event = store.create_event(sample_event("Demo")).await?;
        assert_eq!(event.created_at, event.updated_at);
        event.id
    };

    // A fresh store over the same directory sees the record.
    let store = RecordStore::open(&config)?;
    let event = store.get_event(&created_id).await?;
    assert_eq!(event.title, "Demo");
    assert_eq!(event.status, EventStatus::Draft);
    assert_eq!(event.created_at, event.updated_at);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_collections_self_heal_to_empty() -> Result<()> {
    let dir = tempdir()?;
    let config = StoreConfig {
        data_dir: dir.path().to_string_lossy().into_owned(),
        latency_min_ms: 0,
        latency_max_ms: 0,
        seed_fixtures: false,
        plan_event_limit: None,
    };
    let store = RecordStore::open(&config)?;
    store.create_event(sample_event("Will be lost")).await?;

    std::fs::write(
        dir.path().join(format!("{}.json", EVENTS_KEY)),
        "{ definitely not a collection",
    )?;

    // Reads survive, reporting an empty collection.
    assert!(store.list_events(&EventFilter::default()).await?.is_empty());

    // Mutations recover by writing a fresh collection.
    store.create_event(sample_event("Recovered")).await?;
    let all = store.list_events(&EventFilter::default()).await?;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Recovered");
    Ok(())
}

#[tokio::test]
async fn test_first_open_seeds_fixtures_once() -> Result<()> {
    let dir = tempdir()?;
    let config = StoreConfig {
        data_dir: dir.path().to_string_lossy().into_owned(),
        latency_min_ms: 0,
        latency_max_ms: 0,
        seed_fixtures: true,
        plan_event_limit: None,
    };

    let store = RecordStore::open(&config)?;
    let seeded = store.list_events(&EventFilter::default()).await?;
    assert!(!seeded.is_empty());

    let created = store.create_event(sample_event("After seeding")).await?;

    // Reopening must not re-seed over live data.
    let store = RecordStore::open(&config)?;
    let events = store.list_events(&EventFilter::default()).await?;
    assert_eq!(events.len(), seeded.len() + 1);
    assert!(events.iter().any(|e| e.id == created.id));
    Ok(())
}

#[tokio::test]
async fn test_update_merges_fields_and_refreshes_timestamp() -> Result<()> {
    let (_backend, store) = memory_store(Latency::none(), None);
    let event = store.create_event(sample_event("Original")).await?;

    let updated = store
        .update_event(
            &event.id,
            EventPatch {
                title: Some("Renamed".to_string()),
                status: Some(EventStatus::Published),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.status, EventStatus::Published);
    assert_eq!(updated.description, event.description);
    assert_eq!(updated.created_at, event.created_at);
    assert!(updated.updated_at >= event.updated_at);
    Ok(())
}

#[tokio::test]
async fn test_status_cannot_move_backwards() -> Result<()> {
    let (_backend, store) = memory_store(Latency::none(), None);
    let event = store.create_event(sample_event("Lifecycle")).await?;

    store
        .update_event(
            &event.id,
            EventPatch {
                status: Some(EventStatus::Published),
                ..Default::default()
            },
        )
        .await?;

    let backwards = store
        .update_event(
            &event.id,
            EventPatch {
                status: Some(EventStatus::Draft),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(backwards, Err(StoreError::DomainConflict(_))));

    // Cancellation is reachable from any non-terminal status.
    let cancelled = store
        .update_event(
            &event.id,
            EventPatch {
                status: Some(EventStatus::Cancelled),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(cancelled.status, EventStatus::Cancelled);

    let after_terminal = store
        .update_event(
            &event.id,
            EventPatch {
                status: Some(EventStatus::Published),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(after_terminal, Err(StoreError::DomainConflict(_))));
    Ok(())
}

#[tokio::test]
async fn test_plan_limit_reports_upgrade_required() -> Result<()> {
    let (_backend, store) = memory_store(Latency::none(), Some(1));

    store.create_event(sample_event("Within plan")).await?;
    let gated = store.create_event(sample_event("Over plan")).await;
    assert!(matches!(gated, Err(StoreError::UpgradeRequired(_))));

    // The cap is per organizer.
    let mut other = sample_event("Someone else's event");
    other.organizer_id = "usr_test_other".to_string();
    store.create_event(other).await?;
    Ok(())
}

#[tokio::test]
async fn test_list_events_filters_and_paginates() -> Result<()> {
    let (_backend, store) = memory_store(Latency::none(), None);

    for i in 0..4 {
        let mut new = sample_event(&format!("Conf {}", i));
        new.starts_at = Utc.with_ymd_and_hms(2026, 5, 1 + i, 9, 0, 0).unwrap();
        store.create_event(new).await?;
    }
    let mut workshop = sample_event("Workshop");
    workshop.category = EventCategory::Workshop;
    workshop.status = Some(EventStatus::Published);
    store.create_event(workshop).await?;

    let drafts = store
        .list_events(&EventFilter {
            status: Some(EventStatus::Draft),
            ..Default::default()
        })
        .await?;
    assert_eq!(drafts.len(), 4);

    let workshops = store
        .list_events(&EventFilter {
            category: Some(EventCategory::Workshop),
            ..Default::default()
        })
        .await?;
    assert_eq!(workshops.len(), 1);

    let page = store
        .list_events(&EventFilter {
            status: Some(EventStatus::Draft),
            offset: Some(1),
            limit: Some(2),
            ..Default::default()
        })
        .await?;
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].title, "Conf 1");

    // Pagination past the end yields an empty page, not an error.
    let past_end = store
        .list_events(&EventFilter {
            offset: Some(50),
            limit: Some(10),
            ..Default::default()
        })
        .await?;
    assert!(past_end.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_registration_updates_inventory_and_analytics() -> Result<()> {
    let (_backend, store) = memory_store(Latency::none(), None);
    let event = store.create_event(sample_event("Popular")).await?;
    let ticket = store.create_ticket_type(sample_ticket(&event.id, "GA")).await?;

    for i in 0..2 {
        store
            .register_attendee(NewRegistration {
                event_id: event.id.clone(),
                ticket_type_id: Some(ticket.id.clone()),
                user_id: format!("usr_test_{}", i),
            })
            .await?;
    }

    // quantity is 2, so the third registration is a sell-out.
    let sold_out = store
        .register_attendee(NewRegistration {
            event_id: event.id.clone(),
            ticket_type_id: Some(ticket.id.clone()),
            user_id: "usr_test_late".to_string(),
        })
        .await;
    assert!(matches!(sold_out, Err(StoreError::DomainConflict(_))));

    let tickets = store.list_ticket_types(&event.id).await?;
    assert_eq!(tickets[0].sold, 2);
    assert_eq!(tickets[0].remaining(), 0);

    let analytics = store.get_analytics(&event.id).await?;
    assert_eq!(analytics.registrations, 2);
    assert!((analytics.revenue - 50.0).abs() < f64::EPSILON);
    assert_eq!(analytics.conversion_rate(), 0.0);

    for _ in 0..4 {
        store.record_event_view(&event.id).await?;
    }
    let analytics = store.get_analytics(&event.id).await?;
    assert_eq!(analytics.views, 4);
    assert!((analytics.conversion_rate() - 0.5).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test_missing_analytics_are_lazily_created() -> Result<()> {
    let (backend, store) = memory_store(Latency::none(), None);
    let event = store.create_event(sample_event("Analyzed")).await?;

    // Drop the analytics collection behind the store's back.
    backend.remove(ANALYTICS_KEY)?;

    let snapshot = store.get_analytics(&event.id).await?;
    assert_eq!(snapshot.event_id, event.id);
    assert!(snapshot.views > 0);

    // The lazily created snapshot is persisted, not regenerated.
    let again = store.get_analytics(&event.id).await?;
    assert_eq!(again.id, snapshot.id);
    assert_eq!(again.views, snapshot.views);

    let unknown = store.get_analytics("evt_missing").await;
    assert!(matches!(unknown, Err(StoreError::NotFound { .. })));
    Ok(())
}

#[tokio::test]
async fn test_ticket_validation_rejects_bad_windows() -> Result<()> {
    let (_backend, store) = memory_store(Latency::none(), None);
    let event = store.create_event(sample_event("Strict")).await?;

    let mut inverted = sample_ticket(&event.id, "Backwards");
    std::mem::swap(&mut inverted.sale_starts_at, &mut inverted.sale_ends_at);
    match store.create_ticket_type(inverted).await {
        Err(StoreError::Validation(errors)) => {
            assert!(errors.contains("sale_ends_at"));
        }
        other => panic!("expected validation failure, got {:?}", other.map(|t| t.id)),
    }

    // Shrinking quantity below sold is refused at update time.
    let ticket = store.create_ticket_type(sample_ticket(&event.id, "GA")).await?;
    store
        .register_attendee(NewRegistration {
            event_id: event.id.clone(),
            ticket_type_id: Some(ticket.id.clone()),
            user_id: "usr_test_guest".to_string(),
        })
        .await?;
    let shrink = store
        .update_ticket_type(
            &ticket.id,
            TicketTypePatch {
                quantity: Some(0),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(shrink, Err(StoreError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn test_check_in_updates_one_attendee() -> Result<()> {
    let (_backend, store) = memory_store(Latency::none(), None);
    let event = store.create_event(sample_event("Door list")).await?;
    let attendee = store
        .register_attendee(NewRegistration {
            event_id: event.id.clone(),
            ticket_type_id: None,
            user_id: "usr_test_guest".to_string(),
        })
        .await?;
    assert_eq!(attendee.check_in, CheckInStatus::Pending);

    let updated = store
        .set_attendee_check_in(&attendee.id, CheckInStatus::CheckedIn)
        .await?;
    assert_eq!(updated.check_in, CheckInStatus::CheckedIn);

    let missing = store
        .set_attendee_check_in("att_missing", CheckInStatus::NoShow)
        .await;
    assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    Ok(())
}

#[tokio::test]
async fn test_campaign_dispatch_stamps_sent_metadata() -> Result<()> {
    let (_backend, store) = memory_store(Latency::none(), None);
    let event = store.create_event(sample_event("Promoted")).await?;
    let campaign = store
        .create_campaign(NewCampaign {
            event_id: event.id.clone(),
            name: "Launch".to_string(),
            channel: eventdesk::domain::CampaignChannel::Email,
            subject: "We're live".to_string(),
            content: "Tickets on sale now".to_string(),
            audience: "subscribers".to_string(),
        })
        .await?;
    assert_eq!(campaign.status, eventdesk::domain::CampaignStatus::Draft);
    assert!(campaign.sent_at.is_none());

    let sent = store
        .update_campaign(
            &campaign.id,
            eventdesk::domain::CampaignPatch {
                status: Some(eventdesk::domain::CampaignStatus::Sent),
                ..Default::default()
            },
        )
        .await?;
    assert!(sent.sent_at.is_some());
    let open_rate = sent.open_rate.unwrap();
    let click_rate = sent.click_rate.unwrap();
    assert!(open_rate > 0.0 && open_rate < 1.0);
    assert!(click_rate > 0.0 && click_rate < open_rate);

    // Sent campaigns are terminal.
    let cancel = store
        .update_campaign(
            &campaign.id,
            eventdesk::domain::CampaignPatch {
                status: Some(eventdesk::domain::CampaignStatus::Cancelled),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(cancel, Err(StoreError::DomainConflict(_))));

    store.delete_campaign(&campaign.id).await?;
    assert!(store.list_campaigns(&event.id).await?.is_empty());
    Ok(())
}
