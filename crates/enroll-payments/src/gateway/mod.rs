//! Payment Gateway Integration
//!
//! Abstraction over the remote payment service's two-resource model:
//! customers and billings. Implement [`PaymentGateway`] per provider.

mod http;
mod mock;

pub use http::HttpGateway;
pub use mock::MockGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Request to register a customer with the gateway.
///
/// The email is repeated under `metadata` so webhook events can be
/// correlated back to a local record even when the gateway omits the
/// top-level customer email.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomerRequest {
    pub name: String,
    pub cellphone: String,
    #[serde(rename = "taxId", skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    pub email: String,
}

/// Customer resource created at the gateway
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayCustomer {
    pub customer_id: String,
}

/// Request for a one-time billing/charge
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BillingRequest {
    pub customer_id: String,
    pub amount_cents: i64,
    pub product_name: String,
    pub product_description: String,
    /// Where the gateway sends the user if they abandon checkout
    pub return_url: String,
    /// Where the gateway sends the user after a completed payment
    pub completion_url: String,
}

/// Billing resource plus the hosted checkout URL
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayBilling {
    pub billing_id: String,
    pub checkout_url: String,
}

/// Gateway client trait (Strategy pattern)
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a customer resource; returns the gateway-assigned id
    async fn create_customer(&self, request: &CustomerRequest) -> Result<GatewayCustomer>;

    /// Create a billing/charge for an existing customer
    async fn create_billing(&self, request: &BillingRequest) -> Result<GatewayBilling>;

    /// Provider name, for logs
    fn name(&self) -> &str;
}
