//! Pesa API Server
//!
//! Main entry point for the Pesa wallet service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pesa_api::{AppState, create_router};
use pesa_db::connect;
use pesa_shared::{AppConfig, CheckoutService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pesa=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database).await?;
    info!("Connected to database");

    // Create checkout-provider client
    let checkout = CheckoutService::new(config.checkout.clone());
    info!(
        checkout_url = %config.checkout.checkout_url,
        "Checkout provider configured"
    );

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        checkout: Arc::new(checkout),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
