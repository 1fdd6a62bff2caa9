//! # enroll-payments
//!
//! Payment integration for the enrollment service.
//!
//! ## Checkout flow
//!
//! The gateway exposes two resources, mirrored by [`PaymentGateway`]:
//!
//! ```text
//! ┌────────────┐   create_customer    ┌───────────────┐
//! │ Enrollment │─────────────────────▶│    Gateway    │
//! │  Workflow  │   create_billing     │  (hosted      │
//! │            │─────────────────────▶│   checkout)   │
//! └────────────┘  ◀── checkout_url ── └───────────────┘
//! ```
//!
//! Customer creation is separate from billing creation so the workflow can
//! persist the customer id immediately: a billing-step failure leaves a
//! linked, recoverable student record instead of an orphaned payment
//! attempt.
//!
//! ## Reconciliation
//!
//! The gateway later calls back over a shared-secret webhook. The
//! [`ReconciliationHandler`] maps the inbound `billing.paid` event to a
//! local student by email and flips the payment-confirmed flag exactly once.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use enroll_payments::{EnrollmentService, CheckoutSettings, HttpGateway};
//!
//! let service = EnrollmentService::new(store, notifier)
//!     .with_gateway(Arc::new(HttpGateway::from_env()?), CheckoutSettings::default());
//!
//! let outcome = service.checkout(&input).await?;
//! // Redirect the client to: outcome.checkout_url
//! ```

mod enrollment;
mod error;
mod gateway;
mod webhook;

pub use enrollment::{CheckoutOutcome, CheckoutSettings, EnrollmentService};
pub use error::{PaymentError, Result};
pub use gateway::{
    BillingRequest, CustomerRequest, GatewayBilling, GatewayCustomer, HttpGateway, MockGateway,
    PaymentGateway,
};
pub use webhook::{secret_matches, ReconciliationHandler, WebhookEvent, WebhookOutcome};
