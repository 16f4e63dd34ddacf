use rsvp_server::{
    config::{AppConfig, Environment},
    create_router,
    group::repository::{GroupRepository, InMemoryGroupRepository, PostgresGroupRepository},
    rsvp::repository::{InMemoryRsvpRepository, PostgresRsvpRepository, RsvpRepository},
    session::{
        cleanup_task::start_cleanup_task,
        repository::{InMemorySessionRepository, PostgresSessionRepository, SessionRepository},
    },
    shared::AppState,
    track::repository::{InMemoryTrackRepository, PostgresTrackRepository, TrackRepository},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const MAX_DB_CONNECTIONS: u32 = 10;

struct Repositories {
    session: Arc<dyn SessionRepository + Send + Sync>,
    group: Arc<dyn GroupRepository + Send + Sync>,
    rsvp: Arc<dyn RsvpRepository + Send + Sync>,
    track: Arc<dyn TrackRepository + Send + Sync>,
}

/// One pool for the whole process when DATABASE_URL is set, in-memory
/// stores otherwise. Production refuses to start without a database.
async fn build_repositories(
    config: &AppConfig,
) -> Result<Repositories, Box<dyn std::error::Error>> {
    let database_url = match config.require_database_url() {
        Ok(url) => url,
        Err(e) if config.environment == Environment::Production => return Err(e.into()),
        Err(_) => {
            warn!("DATABASE_URL not set, using in-memory repositories");
            return Ok(Repositories {
                session: Arc::new(InMemorySessionRepository::new()),
                group: Arc::new(InMemoryGroupRepository::new()),
                rsvp: Arc::new(InMemoryRsvpRepository::new()),
                track: Arc::new(InMemoryTrackRepository::new()),
            });
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Connected to PostgreSQL and applied migrations");

    Ok(Repositories {
        session: Arc::new(PostgresSessionRepository::new(pool.clone())),
        group: Arc::new(PostgresGroupRepository::new(pool.clone())),
        rsvp: Arc::new(PostgresRsvpRepository::new(pool.clone())),
        track: Arc::new(PostgresTrackRepository::new(pool)),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rsvp_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    info!(environment = %config.environment, "Starting RSVP server");

    let repositories = build_repositories(&config).await?;
    let cleanup_interval = config.session_cleanup_interval;
    let bind_address = config.bind_address();

    let app_state = AppState::new(
        config,
        repositories.session,
        repositories.group,
        repositories.rsvp,
        repositories.track,
    );

    tokio::spawn(start_cleanup_task(
        Arc::clone(&app_state.session_service),
        cleanup_interval,
    ));

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server running on http://{bind_address}");
    axum::serve(listener, app).await?;

    Ok(())
}
