use axum::{
    routing::{get, post},
    Router,
};
use ghostwriter_access::{Authenticator, SessionManager};
use ghostwriter_farcaster::cache::CachePolicy;
use ghostwriter_farcaster::{DirectoryClient, SignInClient};
use ghostwriter_server::{
    auth::{self, AppState},
    config::ServerConfig,
    db::UserRepository,
    routes,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    // Create database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("failed to run migrations");

    // Wire the Farcaster service clients
    let sign_in = SignInClient::new(config.farcaster.sign_in_verifier_url.clone())
        .expect("failed to build sign-in client");
    let directory = match &config.farcaster.api_base_url {
        Some(base_url) => DirectoryClient::with_base_url(&config.farcaster.api_key, base_url),
        None => DirectoryClient::new(&config.farcaster.api_key),
    }
    .expect("failed to build directory client");

    let authenticator = Authenticator::new(
        config.farcaster.domain(),
        Arc::new(sign_in),
        Arc::new(directory.clone()),
        Arc::new(UserRepository::new(db_pool.clone())),
    );

    let sessions = SessionManager::new(
        &config.session.secret_list(),
        config.session.secure_cookies,
    )
    .expect("failed to build session manager");

    let cache_policy = CachePolicy::new(config.cache.development);
    if config.cache.development {
        tracing::info!("Lookup cache running in development mode (no expiry)");
    }

    // Create application state
    let app_state = Arc::new(AppState::new(
        db_pool,
        sessions,
        authenticator,
        directory,
        cache_policy,
        config.session.failure_redirect.clone(),
    ));

    let app = Router::new()
        // Auth routes
        .route("/auth/siwf", get(auth::siwf_login))
        .route("/auth/signer", get(auth::signer_login))
        .route("/auth/logout", post(auth::logout))
        // Team routes
        .route("/teams", get(routes::list_teams).post(routes::create_team))
        .route("/teams/{id}", get(routes::team_page))
        .route("/teams/{id}/teammates", post(routes::add_teammate))
        .route("/teams/{id}/connect", get(routes::connect))
        .route("/teams/{id}/casts", post(routes::publish_cast))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}
