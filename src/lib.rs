pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    routing::{get, post},
    Router,
};
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use std::sync::Arc;
use time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use config::Config;
use services::billing::BillingEngine;
use services::repository::{StockRepository, TransactionRepository, UserRepository};
use services::sales::SalesReporter;
use services::stores::{StockLedger, TransactionStore, UserStore};

/// Shared application state: injected storage handles plus the components
/// built over them.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub stock: Arc<dyn StockLedger>,
    pub billing: BillingEngine,
    pub sales: SalesReporter,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        stock: Arc<dyn StockLedger>,
        transactions: Arc<dyn TransactionStore>,
    ) -> Self {
        let billing = BillingEngine::new(stock.clone(), transactions.clone());
        let sales = SalesReporter::new(transactions);
        Self {
            users,
            stock,
            billing,
            sales,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Sessions are process-local; the cookie is an opaque token.
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false) // Set to true in production with HTTPS
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)));

    Router::new()
        .route("/", get(handlers::home).post(handlers::home))
        .route("/health", get(handlers::health_check))
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route(
            "/stock",
            get(handlers::stock::list_stock).post(handlers::stock::add_stock),
        )
        .route("/billing", post(handlers::billing::create_bill))
        .route("/sales", get(handlers::sales::sales_report))
        .route("/medicines", get(handlers::stock::list_medicines))
        .layer(session_layer)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: tokio::net::TcpListener,
    router: Router,
}

impl Application {
    /// Connect to MongoDB, prepare indexes, and bind the listener
    /// (port 0 picks a free port).
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let mut client_options = ClientOptions::parse(config.database.url.expose_secret()).await?;
        client_options.app_name = Some("pharmacy-service".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database.db_name);

        let users = UserRepository::new(&db);
        let stock = StockRepository::new(&db);
        let transactions = TransactionRepository::new(&db);

        users.init_indexes().await?;
        stock.init_indexes().await?;
        transactions.init_indexes().await?;
        tracing::info!("Database indexes initialized");

        let state = AppState::new(Arc::new(users), Arc::new(stock), Arc::new(transactions));
        let router = build_router(state);

        let address = format!("{}:{}", config.server.host, config.server.port);
        let listener = tokio::net::TcpListener::bind(&address).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Pharmacy service listening on port {}", self.port);
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
