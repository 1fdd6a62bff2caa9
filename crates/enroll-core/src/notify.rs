//! Notification Dispatch
//!
//! The email subsystem is a black box behind the `Notifier` trait. Sends are
//! always best-effort: callers dispatch through [`spawn_notification`] and a
//! delivery failure is logged, never propagated to the request that
//! triggered it.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::Result;

/// Outbound notification sender
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a message; implementations decide the transport
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Notifier that only logs the send (local development)
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<()> {
        tracing::info!(to = %to, subject = %subject, "notification sent (log only)");
        Ok(())
    }
}

/// A message captured by [`MemoryNotifier`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Notifier that records every message (test double)
#[derive(Default)]
pub struct MemoryNotifier {
    sent: RwLock<Vec<SentMessage>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        self.sent.write().unwrap().push(SentMessage {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        });
        Ok(())
    }
}

/// Fire-and-forget send on its own task.
///
/// The enrollment is already durable by the time this runs; a failed send
/// must not fail the request, so the error channel ends in the log.
pub fn spawn_notification(
    notifier: Arc<dyn Notifier>,
    to: String,
    subject: String,
    body: String,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = notifier.send(&to, &subject, &body).await {
            tracing::error!(to = %to, error = %e, "notification send failed");
        }
    })
}
