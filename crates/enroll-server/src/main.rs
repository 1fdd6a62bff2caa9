//! Enrollment HTTP Server
//!
//! Axum-based server for course registration and payment checkout: form
//! submissions are validated and persisted, checkout requests open a hosted
//! gateway payment page, and the gateway's webhook confirms payments
//! asynchronously.

mod app;
mod config;
mod error;
mod handlers;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use enroll_core::{LogNotifier, MemoryStudentStore, Notifier, StudentStore};
use enroll_payments::{EnrollmentService, HttpGateway, PaymentGateway, ReconciliationHandler};
use enroll_store::{connect_with_retry, ConnectOptions, MongoStudentStore};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Student store: MongoDB when configured, in-memory otherwise
    let store: Arc<dyn StudentStore> = match config.mongo_url {
        Some(ref url) => {
            let db = connect_with_retry(url, &config.db_name, &ConnectOptions::default()).await?;
            Arc::new(MongoStudentStore::new(&db).await?)
        }
        None => {
            tracing::warn!("⚠ MONGO_URL not set - using in-memory store");
            tracing::warn!("  Records are lost on restart");
            Arc::new(MemoryStudentStore::new())
        }
    };

    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    // Payment gateway (optional - checkout answers 503 without it)
    let gateway: Option<Arc<dyn PaymentGateway>> = config
        .gateway
        .as_ref()
        .map(|g| Arc::new(HttpGateway::new(&g.base_url, &g.api_key)) as Arc<dyn PaymentGateway>);

    if let Some(ref gateway) = gateway {
        tracing::info!("✓ Payment gateway configured: {}", gateway.name());
    } else {
        tracing::warn!("⚠ Payment gateway not configured - checkout disabled");
        tracing::warn!("  Set GATEWAY_API_KEY in .env");
    }

    if config.webhook_secret.is_none() {
        tracing::warn!("⚠ WEBHOOK_SECRET not set - webhook deliveries will be rejected");
    }

    let mut service = EnrollmentService::new(store.clone(), notifier.clone());
    if let Some(gateway) = gateway {
        service = service.with_gateway(gateway, config.checkout.clone());
    }

    let state = AppState {
        service: Arc::new(service),
        reconciliation: Arc::new(ReconciliationHandler::new(store, notifier)),
        webhook_secret: config.webhook_secret.as_deref().map(Arc::from),
        environment: config.environment,
    };

    let app = app::router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 enroll-server running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /api/health                       - Health check");
    tracing::info!("  GET  /api/verificar-email?email=       - Email availability");
    tracing::info!("  POST /api/inscricao                    - Register student");
    tracing::info!("  POST /api/checkout                     - Register + hosted checkout");
    tracing::info!("  POST /webhook                          - Gateway payment events");
    tracing::info!("  PUT  /api/confirm-payment/{{id}}         - Manual confirmation");

    axum::serve(listener, app).await?;

    Ok(())
}
