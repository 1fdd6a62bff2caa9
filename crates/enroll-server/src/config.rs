//! Server Configuration
//!
//! Everything comes from the environment (after `dotenvy` loads `.env`).
//! The gateway and the database are both optional: without a gateway key
//! the checkout endpoint answers 503, and without `MONGO_URL` the server
//! falls back to the in-memory store for local development.

use enroll_payments::CheckoutSettings;

/// Deployment environment; controls whether internal error detail is echoed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

/// Gateway credentials and endpoint
#[derive(Clone, Debug)]
pub struct GatewaySettings {
    pub api_key: String,
    pub base_url: String,
}

/// Full server configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub mongo_url: Option<String>,
    pub db_name: String,
    pub webhook_secret: Option<String>,
    pub gateway: Option<GatewaySettings>,
    pub checkout: CheckoutSettings,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        // MONGO_URL from the hosting platform, MONGO_URI as fallback.
        let mongo_url = std::env::var("MONGO_URL")
            .or_else(|_| std::env::var("MONGO_URI"))
            .ok();
        let db_name = std::env::var("MONGO_DB").unwrap_or_else(|_| "enrollment".into());

        let gateway = std::env::var("GATEWAY_API_KEY").ok().map(|api_key| {
            let base_url = std::env::var("GATEWAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.abacatepay.com".into());
            GatewaySettings { api_key, base_url }
        });

        let mut checkout = CheckoutSettings::default();
        if let Ok(url) = std::env::var("PAYMENT_RETURN_URL") {
            checkout.return_url = url;
        }
        if let Ok(url) = std::env::var("PAYMENT_SUCCESS_URL") {
            checkout.completion_url = url;
        }
        if let Some(amount) = std::env::var("CHECKOUT_AMOUNT_CENTS")
            .ok()
            .and_then(|a| a.parse().ok())
        {
            checkout.amount_cents = amount;
        }

        Self {
            port,
            mongo_url,
            db_name,
            webhook_secret: std::env::var("WEBHOOK_SECRET").ok(),
            gateway,
            checkout,
            environment: Environment::from_env(),
        }
    }
}
