use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use invoice_risk_api::config::Config;
use invoice_risk_api::handlers::{self, AppState};
use invoice_risk_api::repository::InMemoryInvoiceRepository;
use invoice_risk_api::risk_client::RiskModelClient;

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The invoice repository (in-memory, seeded with sample data).
/// - The external risk model client.
/// - HTTP routes and middleware (CORS, Rate Limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invoice_risk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Seed the in-memory invoice store with the demo dataset
    let repository = Arc::new(InMemoryInvoiceRepository::with_sample_data());
    tracing::info!("Invoice repository initialized with sample data");

    // Initialize the risk model client
    let risk_client = RiskModelClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize risk model client: {}", e))?;
    tracing::info!("✓ Risk model client initialized: {}", config.model_name);

    // View refresh channel; a successful submission nudges both display views
    let (refresh_tx, mut refresh_rx) = broadcast::channel(16);
    tokio::spawn(async move {
        while let Ok(view) = refresh_rx.recv().await {
            tracing::debug!("View refresh signal: {:?}", view);
        }
    });

    // Build application state
    let app_state = Arc::new(AppState {
        config: config.clone(),
        repository,
        risk_client,
        refresh_tx,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Build protected routes with security layers
    let protected_routes = Router::new()
        // Upload flow + dashboard listing
        .route(
            "/api/v1/invoices",
            post(handlers::submit_invoice).get(handlers::list_invoices),
        )
        // Display views
        .route("/api/v1/invoices/:id", get(handlers::get_invoice))
        .route("/api/v1/marketplace", get(handlers::marketplace))
        .layer(
            ServiceBuilder::new()
                // Request size limit: 1MB max payload (form submissions are small)
                .layer(RequestBodyLimitLayer::new(1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Build final app with health check (bypasses rate limiting)
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
