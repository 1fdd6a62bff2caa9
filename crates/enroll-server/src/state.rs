//! Application State

use std::sync::Arc;

use enroll_payments::{EnrollmentService, ReconciliationHandler};

use crate::config::Environment;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Registration and checkout workflow
    pub service: Arc<EnrollmentService>,

    /// Webhook payment-event handler
    pub reconciliation: Arc<ReconciliationHandler>,

    /// Shared secret for inbound webhooks (None disables the route)
    pub webhook_secret: Option<Arc<str>>,

    /// Controls error-detail exposure in responses
    pub environment: Environment,
}
