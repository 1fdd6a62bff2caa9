//! Connection Lifecycle
//!
//! Supervised startup connect: bounded retries with a fixed backoff, short
//! server-selection timeouts, and a ping to verify the deployment before the
//! handle is handed to the application.

use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use enroll_core::error::{CoreError, Result};

/// Retry policy and timeouts for the startup connect
#[derive(Clone, Debug)]
pub struct ConnectOptions {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub server_selection_timeout: Duration,
    pub connect_timeout: Duration,
    pub app_name: String,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_delay: Duration::from_secs(5),
            server_selection_timeout: Duration::from_secs(3),
            connect_timeout: Duration::from_secs(3),
            app_name: "enroll-server".into(),
        }
    }
}

/// Connect to the deployment, retrying up to `max_retries` times.
///
/// Each attempt parses the connection string, applies the timeouts, and
/// pings the target database; only a successful ping yields a handle.
pub async fn connect_with_retry(
    url: &str,
    db_name: &str,
    options: &ConnectOptions,
) -> Result<Database> {
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match try_connect(url, db_name, options).await {
            Ok(db) => {
                tracing::info!(db = %db_name, attempt, "connected to MongoDB");
                return Ok(db);
            }
            Err(e) if attempt < options.max_retries => {
                tracing::error!(
                    attempt,
                    max = options.max_retries,
                    error = %e,
                    "MongoDB connection failed, retrying"
                );
                tokio::time::sleep(options.retry_delay).await;
            }
            Err(e) => {
                tracing::error!(attempt, error = %e, "MongoDB connection failed, giving up");
                return Err(e);
            }
        }
    }
}

async fn try_connect(url: &str, db_name: &str, options: &ConnectOptions) -> Result<Database> {
    let mut client_options = ClientOptions::parse(url)
        .await
        .map_err(|e| CoreError::Store(e.to_string()))?;

    client_options.app_name = Some(options.app_name.clone());
    client_options.server_selection_timeout = Some(options.server_selection_timeout);
    client_options.connect_timeout = Some(options.connect_timeout);

    let client = Client::with_options(client_options).map_err(|e| CoreError::Store(e.to_string()))?;
    let db = client.database(db_name);

    // The driver connects lazily; ping so a bad deployment fails here, not
    // on the first request.
    db.run_command(doc! { "ping": 1 }, None)
        .await
        .map_err(|e| CoreError::Store(e.to_string()))?;

    Ok(db)
}
