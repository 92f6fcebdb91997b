//! Campus-rs server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, middleware};
use campus_api::{middleware::AppState, router as api_router};
use campus_common::{
    Config,
    storage::{LocalStorage, StorageBackend},
};
use campus_core::{
    AccountService, ClubService, EventService, FeedBroadcaster, FeedPublisher, PostService,
    ProfileService,
};
use campus_db::repositories::{
    ClubRepository, EventRepository, MajorRepository, PostRepository, ProfileRepository,
    UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting campus-rs server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = campus_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    campus_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let major_repo = MajorRepository::new(Arc::clone(&db));
    let club_repo = ClubRepository::new(Arc::clone(&db));
    let event_repo = EventRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));

    // In-process feed fanout, shared by the post service (publish side)
    // and the SSE endpoint (subscribe side).
    let feed_broadcaster = FeedBroadcaster::new();
    let feed_publisher: Arc<dyn FeedPublisher> = Arc::new(feed_broadcaster.clone());

    // File storage for avatars and club covers
    let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(
        PathBuf::from(&config.storage.base_path),
        config.storage.base_url.clone(),
    ));

    // Initialize services
    let account_service = AccountService::new(user_repo, profile_repo.clone());
    let profile_service = ProfileService::new(profile_repo.clone(), major_repo);
    let club_service = ClubService::new(club_repo.clone(), profile_repo.clone());
    let event_service = EventService::new(event_repo, club_repo.clone());
    let post_service = PostService::new(post_repo, club_repo, profile_repo, feed_publisher);

    let state = AppState {
        account_service,
        profile_service,
        club_service,
        event_service,
        post_service,
        feed_broadcaster,
        storage,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            campus_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
