use axum::Router;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

use turnstile_server::auth::{Identity, Role, TokenDirectory};
use turnstile_server::config::{connect_database, Config};
use turnstile_server::routes::{create_routes, AppState};
use turnstile_server::services::{
    CapacityLedger, EventService, LogNotifier, NotifierBridge, TicketService, UuidCodes,
};
use turnstile_server::store::SqliteStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let pool = connect_database(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let store = Arc::new(SqliteStore::new(pool));
    let notifier = NotifierBridge::new(Arc::new(LogNotifier));
    let ledger = CapacityLedger::new(store.clone());

    let events = EventService::new(store.clone(), notifier.clone());
    let tickets = TicketService::new(
        store.clone(),
        store.clone(),
        ledger,
        Arc::new(UuidCodes),
        notifier,
    );

    let directory = TokenDirectory::new();
    seed_dev_tokens(&directory, &config).await;

    let state = AppState {
        events,
        tickets,
        identity: Arc::new(directory),
    };

    let app: Router = create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}

/// Registers the development tokens named in the environment so the API is
/// usable before a real identity provider is wired in.
async fn seed_dev_tokens(directory: &TokenDirectory, config: &Config) {
    if let Some(token) = &config.dev_admin_token {
        let identity = Identity::new(Uuid::new_v4(), "admin@turnstile.dev", Role::Admin);
        tracing::info!(user_id = %identity.user_id, "registered development admin token");
        directory.register(token.clone(), identity).await;
    }
    if let Some(token) = &config.dev_user_token {
        let identity = Identity::new(Uuid::new_v4(), "user@turnstile.dev", Role::User);
        tracing::info!(user_id = %identity.user_id, "registered development user token");
        directory.register(token.clone(), identity).await;
    }
}
