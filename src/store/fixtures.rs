//! Fixture collections written on first open of an empty data directory.

use crate::domain::*;
use chrono::{DateTime, TimeZone, Utc};

pub const FIXTURE_ORGANIZER_ID: &str = "usr_fx_organizer";
pub const FIXTURE_ADMIN_ID: &str = "usr_fx_admin";

pub struct FixtureSet {
    pub events: Vec<EventRecord>,
    pub ticket_types: Vec<TicketType>,
    pub attendees: Vec<Attendee>,
    pub analytics: Vec<AnalyticsSnapshot>,
    pub campaigns: Vec<MarketingCampaign>,
    pub users: Vec<UserAccount>,
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub fn fixture_set() -> FixtureSet {
    let seeded_at = at(2025, 6, 1, 9);

    let events = vec![
        EventRecord {
            id: "evt_fx_cascadia".to_string(),
            organizer_id: FIXTURE_ORGANIZER_ID.to_string(),
            title: "Cascadia Tech Summit".to_string(),
            description: Some("Two days of talks on cloud, data, and developer tooling.".to_string()),
            category: EventCategory::Conference,
            starts_at: at(2025, 10, 16, 9),
            venue: VenueInfo {
                name: "Harborview Convention Center".to_string(),
                address: "705 Pike St, Seattle, WA".to_string(),
                capacity: 1200,
            },
            cover_image_url: Some("https://cdn.eventdesk.io/covers/cascadia.jpg".to_string()),
            status: EventStatus::Published,
            visibility: Visibility::Public,
            price: Some(249.0),
            currency: Some("USD".to_string()),
            created_at: seeded_at,
            updated_at: seeded_at,
        },
        EventRecord {
            id: "evt_fx_harborlights".to_string(),
            organizer_id: FIXTURE_ORGANIZER_ID.to_string(),
            title: "Harbor Lights Music Festival".to_string(),
            description: Some("An evening festival on the waterfront with four stages.".to_string()),
            category: EventCategory::Festival,
            starts_at: at(2025, 8, 22, 17),
            venue: VenueInfo {
                name: "Pier 62 Park".to_string(),
                address: "1951 Alaskan Way, Seattle, WA".to_string(),
                capacity: 3500,
            },
            cover_image_url: Some("https://cdn.eventdesk.io/covers/harborlights.jpg".to_string()),
            status: EventStatus::Published,
            visibility: Visibility::Public,
            price: Some(85.0),
            currency: Some("USD".to_string()),
            created_at: seeded_at,
            updated_at: seeded_at,
        },
        EventRecord {
            id: "evt_fx_watercolor".to_string(),
            organizer_id: FIXTURE_ORGANIZER_ID.to_string(),
            title: "Watercolor Weekend Workshop".to_string(),
            description: Some("Small-group painting workshop, materials included.".to_string()),
            category: EventCategory::Workshop,
            starts_at: at(2025, 9, 6, 10),
            venue: VenueInfo {
                name: "Fremont Arts Loft".to_string(),
                address: "3412 Evanston Ave N, Seattle, WA".to_string(),
                capacity: 24,
            },
            cover_image_url: None,
            status: EventStatus::Draft,
            visibility: Visibility::Unlisted,
            price: Some(120.0),
            currency: Some("USD".to_string()),
            created_at: seeded_at,
            updated_at: seeded_at,
        },
    ];

    let ticket_types = vec![
        TicketType {
            id: "tkt_fx_cascadia_ga".to_string(),
            event_id: "evt_fx_cascadia".to_string(),
            name: "General Admission".to_string(),
            description: Some("Access to all talks and the expo floor.".to_string()),
            price: 249.0,
            currency: "USD".to_string(),
            quantity: 1000,
            sold: 412,
            sale_starts_at: at(2025, 6, 1, 10),
            sale_ends_at: at(2025, 10, 15, 23),
            active: true,
            benefits: vec!["All sessions".to_string(), "Expo access".to_string()],
            restrictions: vec!["Non-transferable".to_string()],
        },
        TicketType {
            id: "tkt_fx_cascadia_vip".to_string(),
            event_id: "evt_fx_cascadia".to_string(),
            name: "VIP".to_string(),
            description: Some("Front-row seating plus the speaker dinner.".to_string()),
            price: 549.0,
            currency: "USD".to_string(),
            quantity: 100,
            sold: 37,
            sale_starts_at: at(2025, 6, 1, 10),
            sale_ends_at: at(2025, 10, 10, 23),
            active: true,
            benefits: vec![
                "All sessions".to_string(),
                "Speaker dinner".to_string(),
                "Recorded sessions".to_string(),
            ],
            restrictions: Vec::new(),
        },
        TicketType {
            id: "tkt_fx_harborlights_ga".to_string(),
            event_id: "evt_fx_harborlights".to_string(),
            name: "Festival Pass".to_string(),
            description: None,
            price: 85.0,
            currency: "USD".to_string(),
            quantity: 3000,
            sold: 1904,
            sale_starts_at: at(2025, 5, 1, 10),
            sale_ends_at: at(2025, 8, 22, 16),
            active: true,
            benefits: vec!["All four stages".to_string()],
            restrictions: vec!["21+ only in the beer garden".to_string()],
        },
    ];

    let attendees = vec![
        Attendee {
            id: "att_fx_0001".to_string(),
            event_id: "evt_fx_cascadia".to_string(),
            ticket_type_id: Some("tkt_fx_cascadia_ga".to_string()),
            user_id: "usr_fx_jordan".to_string(),
            registered_at: at(2025, 6, 12, 14),
            check_in: CheckInStatus::Pending,
            payment: PaymentStatus::Completed,
        },
        Attendee {
            id: "att_fx_0002".to_string(),
            event_id: "evt_fx_cascadia".to_string(),
            ticket_type_id: Some("tkt_fx_cascadia_vip".to_string()),
            user_id: "usr_fx_casey".to_string(),
            registered_at: at(2025, 6, 18, 9),
            check_in: CheckInStatus::Pending,
            payment: PaymentStatus::Completed,
        },
        Attendee {
            id: "att_fx_0003".to_string(),
            event_id: "evt_fx_harborlights".to_string(),
            ticket_type_id: Some("tkt_fx_harborlights_ga".to_string()),
            user_id: "usr_fx_jordan".to_string(),
            registered_at: at(2025, 7, 2, 20),
            check_in: CheckInStatus::Pending,
            payment: PaymentStatus::Refunded,
        },
    ];

    let analytics = vec![
        AnalyticsSnapshot {
            id: "ana_fx_cascadia".to_string(),
            event_id: "evt_fx_cascadia".to_string(),
            views: 18_430,
            registrations: 449,
            revenue: 122_901.0,
            referrers: vec![
                ReferrerSource {
                    source: "search".to_string(),
                    visits: 7_911,
                },
                ReferrerSource {
                    source: "direct".to_string(),
                    visits: 6_102,
                },
                ReferrerSource {
                    source: "social".to_string(),
                    visits: 3_240,
                },
                ReferrerSource {
                    source: "email".to_string(),
                    visits: 1_177,
                },
            ],
            updated_at: seeded_at,
        },
        AnalyticsSnapshot {
            id: "ana_fx_harborlights".to_string(),
            event_id: "evt_fx_harborlights".to_string(),
            views: 52_118,
            registrations: 1_904,
            revenue: 161_840.0,
            referrers: vec![
                ReferrerSource {
                    source: "social".to_string(),
                    visits: 24_551,
                },
                ReferrerSource {
                    source: "search".to_string(),
                    visits: 15_009,
                },
                ReferrerSource {
                    source: "direct".to_string(),
                    visits: 12_558,
                },
            ],
            updated_at: seeded_at,
        },
        AnalyticsSnapshot::zeroed(
            "ana_fx_watercolor".to_string(),
            "evt_fx_watercolor",
            seeded_at,
        ),
    ];

    let campaigns = vec![
        MarketingCampaign {
            id: "cmp_fx_cascadia_launch".to_string(),
            event_id: "evt_fx_cascadia".to_string(),
            name: "Launch announcement".to_string(),
            channel: CampaignChannel::Email,
            subject: "Cascadia Tech Summit tickets are live".to_string(),
            content: "Early-bird pricing ends June 30.".to_string(),
            audience: "2024 attendees".to_string(),
            status: CampaignStatus::Sent,
            sent_at: Some(at(2025, 6, 2, 16)),
            open_rate: Some(0.41),
            click_rate: Some(0.12),
            created_at: seeded_at,
            updated_at: at(2025, 6, 2, 16),
        },
        MarketingCampaign {
            id: "cmp_fx_harborlights_lineup".to_string(),
            event_id: "evt_fx_harborlights".to_string(),
            name: "Lineup reveal".to_string(),
            channel: CampaignChannel::Social,
            subject: "The Harbor Lights lineup is here".to_string(),
            content: "Four stages. One night. See who's playing.".to_string(),
            audience: "followers".to_string(),
            status: CampaignStatus::Scheduled,
            sent_at: None,
            open_rate: None,
            click_rate: None,
            created_at: seeded_at,
            updated_at: seeded_at,
        },
    ];

    let users = vec![
        UserAccount {
            id: FIXTURE_ADMIN_ID.to_string(),
            email: "admin@eventdesk.io".to_string(),
            display_name: "Portal Admin".to_string(),
            password: "admin-demo-password".to_string(),
            role: UserRole::Admin,
            created_at: seeded_at,
        },
        UserAccount {
            id: FIXTURE_ORGANIZER_ID.to_string(),
            email: "organizer@eventdesk.io".to_string(),
            display_name: "Riley Organizer".to_string(),
            password: "organizer-demo-password".to_string(),
            role: UserRole::Organizer,
            created_at: seeded_at,
        },
    ];

    FixtureSet {
        events,
        ticket_types,
        attendees,
        analytics,
        campaigns,
        users,
    }
}
