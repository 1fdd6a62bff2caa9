//! Mock Gateway
//!
//! Deterministic in-memory gateway for tests and local development. Records
//! every request and supports failure injection per operation.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use super::{BillingRequest, CustomerRequest, GatewayBilling, GatewayCustomer, PaymentGateway};
use crate::error::{PaymentError, Result};

/// In-memory gateway double
#[derive(Default)]
pub struct MockGateway {
    counter: AtomicU64,
    customers: RwLock<Vec<CustomerRequest>>,
    billings: RwLock<Vec<BillingRequest>>,
    fail_customer: bool,
    fail_billing: bool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway whose customer-creation step always fails
    pub fn failing_customer() -> Self {
        Self {
            fail_customer: true,
            ..Self::default()
        }
    }

    /// Gateway whose billing-creation step always fails
    pub fn failing_billing() -> Self {
        Self {
            fail_billing: true,
            ..Self::default()
        }
    }

    /// Customer requests seen so far
    pub fn customers(&self) -> Vec<CustomerRequest> {
        self.customers.read().unwrap().clone()
    }

    /// Billing requests seen so far
    pub fn billings(&self) -> Vec<BillingRequest> {
        self.billings.read().unwrap().clone()
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_customer(&self, request: &CustomerRequest) -> Result<GatewayCustomer> {
        if self.fail_customer {
            return Err(PaymentError::Gateway {
                status: Some(500),
                detail: "mock customer failure".into(),
            });
        }

        self.customers.write().unwrap().push(request.clone());
        Ok(GatewayCustomer {
            customer_id: format!("cust_mock_{}", self.next()),
        })
    }

    async fn create_billing(&self, request: &BillingRequest) -> Result<GatewayBilling> {
        if self.fail_billing {
            return Err(PaymentError::Gateway {
                status: Some(500),
                detail: "mock billing failure".into(),
            });
        }

        self.billings.write().unwrap().push(request.clone());
        let id = self.next();
        Ok(GatewayBilling {
            billing_id: format!("bill_mock_{id}"),
            checkout_url: format!("https://gateway.example/pay/bill_mock_{id}"),
        })
    }

    fn name(&self) -> &str {
        "MockGateway"
    }
}
