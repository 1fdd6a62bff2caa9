//! Webhook Reconciliation
//!
//! Inbound payment events from the gateway. Authentication is a shared
//! secret checked before any body evaluation; accepted events are mapped
//! back to a local student by email and the payment-confirmed transition is
//! applied idempotently.

use std::sync::Arc;

use serde_json::Value;

use enroll_core::notify::spawn_notification;
use enroll_core::{Notifier, Student, StudentPatch, StudentStore};

use crate::error::Result;

/// The one event type that mutates local state
pub const BILLING_PAID: &str = "billing.paid";

/// Customer-email locations across gateway minor versions, tried in order;
/// first hit wins.
const EMAIL_PATHS: &[&[&str]] = &[
    &["data", "billing", "customer", "email"],
    &["data", "billing", "customer", "metadata", "email"],
    &["data", "customer", "email"],
    &["data", "customer", "metadata", "email"],
];

/// Constant-time shared-secret check to avoid timing side-channels
pub fn secret_matches(provided: Option<&str>, expected: &str) -> bool {
    provided.is_some_and(|p| constant_time_eq(p, expected))
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Parsed gateway event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookEvent {
    pub event_type: Option<String>,
    pub customer_email: Option<String>,
}

impl WebhookEvent {
    /// Extract the event type and customer email from a raw payload
    pub fn from_value(payload: &Value) -> Self {
        let event_type = payload
            .get("event")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let customer_email = EMAIL_PATHS
            .iter()
            .find_map(|path| string_at(payload, path))
            .map(|email| email.to_lowercase());

        Self {
            event_type,
            customer_email,
        }
    }
}

fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str().map(str::to_owned)
}

/// Result of processing an accepted webhook call
#[derive(Clone, Debug)]
pub enum WebhookOutcome {
    /// Payment transition applied; confirmation notification dispatched
    Confirmed(Student),
    /// Repeat delivery for an already-confirmed student; no-op success,
    /// no repeat notification
    AlreadyConfirmed(Student),
    /// `billing.paid` for an email with no matching record; event dropped
    StudentNotFound(String),
    /// No customer email could be extracted; nothing evaluated further
    MissingEmail,
    /// Forward-compatible no-op for unrecognized event types
    Ignored(String),
}

/// Maps accepted payment events onto student records
pub struct ReconciliationHandler {
    store: Arc<dyn StudentStore>,
    notifier: Arc<dyn Notifier>,
}

impl ReconciliationHandler {
    pub fn new(store: Arc<dyn StudentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Process an authenticated event
    pub async fn handle(&self, event: &WebhookEvent) -> Result<WebhookOutcome> {
        tracing::info!(event_type = ?event.event_type, "processing payment webhook");

        let Some(ref email) = event.customer_email else {
            tracing::warn!("webhook payload carries no customer email");
            return Ok(WebhookOutcome::MissingEmail);
        };

        if event.event_type.as_deref() != Some(BILLING_PAID) {
            let event_type = event.event_type.clone().unwrap_or_default();
            tracing::debug!(event_type = %event_type, "unhandled webhook event");
            return Ok(WebhookOutcome::Ignored(event_type));
        }

        let Some(student) = self.store.find_by_email(email).await? else {
            tracing::warn!(email = %email, "no student for paid billing");
            return Ok(WebhookOutcome::StudentNotFound(email.clone()));
        };

        if student.payment_confirmed {
            tracing::info!(student = %student.id, "payment already confirmed, skipping");
            return Ok(WebhookOutcome::AlreadyConfirmed(student));
        }

        let Some(updated) = self
            .store
            .update_by_email(email, StudentPatch::payment_confirmed())
            .await?
        else {
            return Ok(WebhookOutcome::StudentNotFound(email.clone()));
        };

        tracing::info!(student = %updated.id, email = %email, "payment confirmed");

        // The mutation is durable; the notification is best-effort on top.
        spawn_notification(
            self.notifier.clone(),
            updated.email.clone(),
            "Confirmação de Pagamento 🎉".into(),
            format!("Olá {}, seu pagamento foi confirmado!", updated.name),
        );

        Ok(WebhookOutcome::Confirmed(updated))
    }
}
