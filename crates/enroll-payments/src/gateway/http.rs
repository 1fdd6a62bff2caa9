//! HTTP Gateway Client
//!
//! Bearer-authenticated client for the hosted payment gateway. Response
//! shapes drifted across gateway minor versions, so identifiers are read
//! through an ordered list of candidate paths, first hit wins.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{BillingRequest, CustomerRequest, GatewayBilling, GatewayCustomer, PaymentGateway};
use crate::error::{PaymentError, Result};

const DEFAULT_BASE_URL: &str = "https://api.abacatepay.com";

/// Candidate response paths for the customer id
const CUSTOMER_ID_PATHS: &[&[&str]] = &[&["customerId"], &["id"], &["data", "id"]];

/// Candidate response paths for the billing id and checkout URL
const BILLING_ID_PATHS: &[&[&str]] = &[&["id"], &["data", "id"]];
const CHECKOUT_URL_PATHS: &[&[&str]] = &[&["data", "url"], &["url"]];

/// reqwest-backed gateway client
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpGateway {
    /// Create a client for the given base URL and bearer credential
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Create from environment variables
    ///
    /// Requires `GATEWAY_API_KEY`; `GATEWAY_BASE_URL` overrides the hosted
    /// default.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GATEWAY_API_KEY")
            .map_err(|_| PaymentError::Config("GATEWAY_API_KEY not set".into()))?;
        let base_url =
            std::env::var("GATEWAY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        Ok(Self::new(base_url, api_key))
    }

    /// POST a JSON body and return the parsed response payload.
    ///
    /// Non-2xx responses and transport failures become `Gateway` errors; the
    /// raw payload goes to the log, never to the end user.
    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(path = %path, error = %e, "gateway request failed");
                PaymentError::Gateway {
                    status: None,
                    detail: e.to_string(),
                }
            })?;

        let status = response.status();
        let payload = response.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::error!(path = %path, status = %status, payload = %payload, "gateway returned error");
            return Err(PaymentError::Gateway {
                status: Some(status.as_u16()),
                detail: payload,
            });
        }

        serde_json::from_str(&payload).map_err(|e| PaymentError::Gateway {
            status: Some(status.as_u16()),
            detail: format!("invalid gateway response: {e}"),
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn create_customer(&self, request: &CustomerRequest) -> Result<GatewayCustomer> {
        let body = json!({
            "name": request.name,
            "cellphone": request.cellphone,
            "taxId": request.tax_id,
            "email": request.email,
            // Correlation key for the webhook path
            "metadata": { "email": request.email },
        });

        let payload = self.post("/v1/customer/create", &body).await?;

        let customer_id =
            string_at_any(&payload, CUSTOMER_ID_PATHS).ok_or_else(|| PaymentError::Gateway {
                status: None,
                detail: "no customer id in gateway response".into(),
            })?;

        Ok(GatewayCustomer { customer_id })
    }

    async fn create_billing(&self, request: &BillingRequest) -> Result<GatewayBilling> {
        let body = json!({
            "frequency": "ONE_TIME",
            "methods": ["PIX"],
            "products": [{
                "externalId": "prod-matricula",
                "name": request.product_name,
                "description": request.product_description,
                "quantity": 1,
                "price": request.amount_cents,
            }],
            "returnUrl": request.return_url,
            "completionUrl": request.completion_url,
            "customerId": request.customer_id,
        });

        let payload = self.post("/v1/billing/create", &body).await?;

        let billing_id =
            string_at_any(&payload, BILLING_ID_PATHS).ok_or_else(|| PaymentError::Gateway {
                status: None,
                detail: "no billing id in gateway response".into(),
            })?;
        let checkout_url =
            string_at_any(&payload, CHECKOUT_URL_PATHS).ok_or_else(|| PaymentError::Gateway {
                status: None,
                detail: "no checkout URL in gateway response".into(),
            })?;

        Ok(GatewayBilling {
            billing_id,
            checkout_url,
        })
    }

    fn name(&self) -> &str {
        "AbacatePay"
    }
}

/// Walk a nested path through a JSON value, expecting a string leaf
fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str().map(str::to_owned)
}

/// Try each candidate path in order; first string found wins
pub(crate) fn string_at_any(value: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| string_at(value, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_id_read_from_any_known_shape() {
        let flat = json!({"customerId": "cust_1"});
        let bare = json!({"id": "cust_2"});
        let nested = json!({"data": {"id": "cust_3"}});

        assert_eq!(
            string_at_any(&flat, CUSTOMER_ID_PATHS).as_deref(),
            Some("cust_1")
        );
        assert_eq!(
            string_at_any(&bare, CUSTOMER_ID_PATHS).as_deref(),
            Some("cust_2")
        );
        assert_eq!(
            string_at_any(&nested, CUSTOMER_ID_PATHS).as_deref(),
            Some("cust_3")
        );
    }

    #[test]
    fn checkout_url_prefers_nested_shape() {
        let both = json!({"url": "https://old", "data": {"url": "https://new"}});
        assert_eq!(
            string_at_any(&both, CHECKOUT_URL_PATHS).as_deref(),
            Some("https://new")
        );
    }

    #[test]
    fn missing_fields_yield_none() {
        let empty = json!({});
        assert!(string_at_any(&empty, CUSTOMER_ID_PATHS).is_none());
        assert!(string_at_any(&empty, CHECKOUT_URL_PATHS).is_none());
    }
}
