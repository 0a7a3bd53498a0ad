use anyhow::Result;
use clap::{Parser, Subcommand};
use eventdesk::config::Config;
use eventdesk::domain::{CheckInStatus, EventCategory, EventFilter, EventStatus};
use eventdesk::identity::TokenIdGenerator;
use eventdesk::logging::init_logging;
use eventdesk::service::RecordService;
use eventdesk::session::{AuthService, LocalAuthService};
use eventdesk::store::{FileBackend, RecordStore};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "eventdesk")]
#[command(about = "EventDesk portal data store operations")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-seed the fixture collections, replacing stored data
    Seed,
    /// List events, optionally filtered
    Events {
        /// Filter by status: draft, published, ongoing, completed, cancelled
        #[arg(long)]
        status: Option<String>,
        /// Filter by category, e.g. conference, workshop, concert
        #[arg(long)]
        category: Option<String>,
        /// Filter by organizer identity
        #[arg(long)]
        organizer: Option<String>,
    },
    /// Show one event with its ticket types and analytics
    Show { id: String },
    /// List attendees for an event
    Attendees { event_id: String },
    /// Update an attendee's check-in status
    CheckIn {
        attendee_id: String,
        /// pending, checked-in, or no-show
        status: String,
    },
    /// Delete an event and all of its dependent rows
    Delete { id: String },
    /// Sign in against the stored user collection
    SignIn { email: String, password: String },
    /// Show the current session, if one is active
    Session,
    /// Clear the current session
    SignOut,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let config = Config::load().unwrap_or_else(|e| {
        info!("No usable config file ({}), falling back to defaults", e);
        Config::default()
    });
    let store = RecordStore::open(&config.store)?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Seed => {
            store.seed_fixtures()?;
            println!("Fixture collections written to '{}'", config.store.data_dir);
        }
        Commands::Events {
            status,
            category,
            organizer,
        } => {
            let filter = EventFilter {
                status: parse_arg::<EventStatus>(status)?,
                category: parse_arg::<EventCategory>(category)?,
                organizer_id: organizer,
                ..Default::default()
            };
            let events = store.list_events(&filter).await?;
            println!("{} event(s)", events.len());
            for event in &events {
                println!(
                    "  {}  {}  [{}/{}]  {}",
                    event.id,
                    event.starts_at.format("%Y-%m-%d %H:%M"),
                    event.status,
                    event.visibility,
                    event.title
                );
            }
        }
        Commands::Show { id } => {
            let event = store.get_event(&id).await?;
            println!("{}  ({})", event.title, event.id);
            println!("  organizer: {}", event.organizer_id);
            println!("  category:  {}", event.category);
            println!("  starts:    {}", event.starts_at.format("%Y-%m-%d %H:%M"));
            println!(
                "  venue:     {}, {} (capacity {})",
                event.venue.name, event.venue.address, event.venue.capacity
            );
            println!("  status:    {} / {}", event.status, event.visibility);

            let tickets = store.list_ticket_types(&id).await?;
            println!("  ticket types:");
            for ticket in &tickets {
                println!(
                    "    {}  {}  {:.2} {}  {}/{} sold",
                    ticket.id, ticket.name, ticket.price, ticket.currency, ticket.sold, ticket.quantity
                );
            }

            let analytics = store.get_analytics(&id).await?;
            println!(
                "  analytics: {} views, {} registrations ({:.1}% conversion), {:.2} revenue",
                analytics.views,
                analytics.registrations,
                analytics.conversion_rate() * 100.0,
                analytics.revenue
            );
        }
        Commands::Attendees { event_id } => {
            let attendees = store.list_attendees(&event_id).await?;
            println!("{} attendee(s) for {}", attendees.len(), event_id);
            for attendee in &attendees {
                println!(
                    "  {}  user={}  {}  registered {}",
                    attendee.id,
                    attendee.user_id,
                    attendee.check_in,
                    attendee.registered_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Commands::CheckIn {
            attendee_id,
            status,
        } => {
            let status: CheckInStatus = status.parse().map_err(anyhow::Error::msg)?;
            let attendee = store.set_attendee_check_in(&attendee_id, status).await?;
            println!("{} is now {}", attendee.id, attendee.check_in);
        }
        Commands::Delete { id } => {
            store.delete_event(&id).await?;
            println!("Deleted {} (dependent rows removed)", id);
        }
        Commands::SignIn { email, password } => {
            let auth = auth_service(&config)?;
            let session = auth.sign_in(&email, &password).await?;
            let role = if session.user.is_admin() { "admin" } else { "member" };
            println!("Signed in as {} ({})", session.user.display_name, role);
            println!(
                "Session expires {}",
                session.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        Commands::Session => {
            let auth = auth_service(&config)?;
            match auth.current_session().await? {
                Some(session) => println!(
                    "{} <{}> until {}",
                    session.user.display_name,
                    session.user.email,
                    session.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
                ),
                None => println!("No active session"),
            }
        }
        Commands::SignOut => {
            let auth = auth_service(&config)?;
            auth.sign_out().await?;
            println!("Signed out");
        }
    }

    Ok(())
}

fn auth_service(config: &Config) -> Result<LocalAuthService> {
    let backend = Arc::new(FileBackend::open(config.store.data_dir.as_str())?);
    Ok(LocalAuthService::new(
        backend,
        Arc::new(TokenIdGenerator::new()),
        config.session.ttl_minutes,
    ))
}

fn parse_arg<T>(value: Option<String>) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = String>,
{
    match value {
        Some(raw) => raw.parse().map(Some).map_err(anyhow::Error::msg),
        None => Ok(None),
    }
}
