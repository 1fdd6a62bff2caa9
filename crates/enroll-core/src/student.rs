//! Student Record
//!
//! One record per enrolled individual. The id doubles as the public
//! transaction id returned by the registration endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validate::Registration;

/// A student enrollment record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Student {
    /// Record id (UUID v4)
    pub id: Uuid,

    /// Full name (trimmed, markup-escaped, min 3 chars)
    pub name: String,

    /// Age in years (1-120)
    pub age: u8,

    /// Lowercased email, unique across the store
    pub email: String,

    /// Phone number, digits only (10-15)
    pub phone: String,

    /// Optional national tax id (CPF/CNPJ), digits only
    pub tax_id: Option<String>,

    /// Enrollment timestamp, set at creation
    pub enrolled_at: DateTime<Utc>,

    /// Whether payment has been confirmed; transitions false -> true only
    pub payment_confirmed: bool,

    /// Set together with `payment_confirmed`, never alone
    pub payment_confirmed_at: Option<DateTime<Utc>>,

    /// Customer id assigned by the payment gateway
    pub gateway_customer_id: Option<String>,

    /// Billing/charge id assigned by the payment gateway
    pub gateway_transaction_id: Option<String>,
}

impl Student {
    /// Create a new unconfirmed record from validated registration data
    pub fn new(registration: Registration) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: registration.name,
            age: registration.age,
            email: registration.email,
            phone: registration.phone,
            tax_id: registration.tax_id,
            enrolled_at: Utc::now(),
            payment_confirmed: false,
            payment_confirmed_at: None,
            gateway_customer_id: None,
            gateway_transaction_id: None,
        }
    }

    /// Apply a partial update in place, preserving the payment invariants
    pub fn apply(&mut self, patch: &StudentPatch) {
        if let Some(ref customer_id) = patch.gateway_customer_id {
            self.gateway_customer_id = Some(customer_id.clone());
        }
        if let Some(ref transaction_id) = patch.gateway_transaction_id {
            self.gateway_transaction_id = Some(transaction_id.clone());
        }
        // The confirmed flag only ever moves false -> true; a patch carrying
        // `false` is ignored rather than resetting a confirmed payment.
        if patch.confirm_payment && !self.payment_confirmed {
            self.payment_confirmed = true;
            self.payment_confirmed_at = Some(patch.confirmed_at.unwrap_or_else(Utc::now));
        }
    }
}

/// Partial update for a student record
///
/// Only the mutable fields are patchable; identity and registration data are
/// immutable after creation.
#[derive(Clone, Debug, Default)]
pub struct StudentPatch {
    pub gateway_customer_id: Option<String>,
    pub gateway_transaction_id: Option<String>,
    pub confirm_payment: bool,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl StudentPatch {
    /// Patch that records the gateway customer id
    pub fn customer(customer_id: impl Into<String>) -> Self {
        Self {
            gateway_customer_id: Some(customer_id.into()),
            ..Self::default()
        }
    }

    /// Patch that records the gateway billing/transaction id
    pub fn transaction(transaction_id: impl Into<String>) -> Self {
        Self {
            gateway_transaction_id: Some(transaction_id.into()),
            ..Self::default()
        }
    }

    /// Patch that marks the payment as confirmed now
    pub fn payment_confirmed() -> Self {
        Self {
            confirm_payment: true,
            confirmed_at: Some(Utc::now()),
            ..Self::default()
        }
    }
}
