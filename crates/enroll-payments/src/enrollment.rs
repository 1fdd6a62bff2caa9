//! Enrollment Workflow
//!
//! Orchestrates registration and checkout per submission:
//! validate → duplicate check → persist → (customer → billing) → respond.
//! Terminal on success or first failure; the registration write happens
//! before any gateway call so a gateway failure never loses the enrollment.

use std::sync::Arc;

use enroll_core::notify::spawn_notification;
use enroll_core::validate::validate_registration;
use enroll_core::{Notifier, RegistrationInput, Student, StudentPatch, StudentStore};

use crate::error::{PaymentError, Result};
use crate::gateway::{BillingRequest, CustomerRequest, PaymentGateway};

/// Product and redirect settings for the checkout path
#[derive(Clone, Debug)]
pub struct CheckoutSettings {
    /// Charge amount in cents
    pub amount_cents: i64,
    pub product_name: String,
    pub product_description: String,
    pub return_url: String,
    pub completion_url: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            amount_cents: 2000,
            product_name: "Assinatura de Programa Fitness".into(),
            product_description: "Acesso ao programa fitness premium por 1 mês.".into(),
            return_url: "https://localhost/pagamento".into(),
            completion_url: "https://localhost/sucesso".into(),
        }
    }
}

/// Successful checkout: the persisted student plus the hosted-checkout URL
#[derive(Clone, Debug)]
pub struct CheckoutOutcome {
    pub student: Student,
    pub checkout_url: String,
}

/// Per-submission workflow over the store, notifier, and optional gateway
pub struct EnrollmentService {
    store: Arc<dyn StudentStore>,
    notifier: Arc<dyn Notifier>,
    gateway: Option<Arc<dyn PaymentGateway>>,
    checkout: CheckoutSettings,
}

impl EnrollmentService {
    pub fn new(store: Arc<dyn StudentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            gateway: None,
            checkout: CheckoutSettings::default(),
        }
    }

    /// Enable the checkout path
    #[must_use]
    pub fn with_gateway(
        mut self,
        gateway: Arc<dyn PaymentGateway>,
        settings: CheckoutSettings,
    ) -> Self {
        self.gateway = Some(gateway);
        self.checkout = settings;
        self
    }

    pub fn gateway_configured(&self) -> bool {
        self.gateway.is_some()
    }

    pub fn store(&self) -> Arc<dyn StudentStore> {
        self.store.clone()
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }

    /// Whether no record holds this email yet
    pub async fn email_available(&self, email: &str) -> Result<bool> {
        let existing = self.store.find_by_email(email.trim()).await?;
        Ok(existing.is_none())
    }

    /// Register a student without a payment step
    pub async fn register(&self, input: &RegistrationInput) -> Result<Student> {
        let student = self.persist_new(input).await?;
        self.send_registration_notice(&student);
        Ok(student)
    }

    /// Register a student and open a gateway checkout.
    ///
    /// The customer id is persisted as soon as the gateway returns it, so a
    /// billing-step failure still leaves a linked record.
    pub async fn checkout(&self, input: &RegistrationInput) -> Result<CheckoutOutcome> {
        let gateway = self
            .gateway
            .as_ref()
            .ok_or(PaymentError::GatewayUnavailable)?;

        let student = self.persist_new(input).await?;
        self.send_registration_notice(&student);

        let customer = gateway
            .create_customer(&CustomerRequest {
                name: student.name.clone(),
                cellphone: student.phone.clone(),
                tax_id: student.tax_id.clone(),
                email: student.email.clone(),
            })
            .await?;

        let id = student.id.to_string();
        self.store
            .update_by_id(&id, StudentPatch::customer(&customer.customer_id))
            .await?;

        let billing = gateway
            .create_billing(&BillingRequest {
                customer_id: customer.customer_id,
                amount_cents: self.checkout.amount_cents,
                product_name: self.checkout.product_name.clone(),
                product_description: self.checkout.product_description.clone(),
                return_url: self.checkout.return_url.clone(),
                completion_url: self.checkout.completion_url.clone(),
            })
            .await?;

        let student = self
            .store
            .update_by_id(&id, StudentPatch::transaction(&billing.billing_id))
            .await?
            .ok_or_else(|| PaymentError::NotFound(id))?;

        tracing::info!(
            student = %student.id,
            billing = %billing.billing_id,
            "checkout created"
        );

        Ok(CheckoutOutcome {
            student,
            checkout_url: billing.checkout_url,
        })
    }

    /// Administrative override: confirm payment by record id
    pub async fn confirm_manual(&self, id: &str) -> Result<Option<Student>> {
        let updated = self
            .store
            .update_by_id(id, StudentPatch::payment_confirmed())
            .await?;

        if let Some(ref student) = updated {
            tracing::info!(student = %student.id, "payment confirmed manually");
        }
        Ok(updated)
    }

    /// Validate, check for a duplicate, and persist the new record.
    ///
    /// The pre-check gives the common case a clean 409; the store-level
    /// uniqueness constraint catches the raced case.
    async fn persist_new(&self, input: &RegistrationInput) -> Result<Student> {
        let registration = validate_registration(input).map_err(PaymentError::Validation)?;

        if let Some(existing) = self.store.find_by_email(&registration.email).await? {
            return Err(PaymentError::DuplicateEmail(existing.email));
        }

        let student = self.store.create(&Student::new(registration)).await?;
        tracing::info!(student = %student.id, email = %student.email, "student enrolled");
        Ok(student)
    }

    fn send_registration_notice(&self, student: &Student) {
        spawn_notification(
            self.notifier.clone(),
            student.email.clone(),
            "Confirmação de Inscrição".into(),
            format!(
                "Olá {}, sua inscrição foi realizada com sucesso!",
                student.name
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enroll_core::{MemoryNotifier, MemoryStudentStore};

    use crate::gateway::MockGateway;

    fn input(email: &str) -> RegistrationInput {
        RegistrationInput {
            nome: Some("Ana Silva".into()),
            idade: Some(25),
            email: Some(email.into()),
            celular: Some("11999998888".into()),
            tax_id: None,
        }
    }

    fn service(store: Arc<MemoryStudentStore>, notifier: Arc<MemoryNotifier>) -> EnrollmentService {
        EnrollmentService::new(store, notifier)
    }

    #[tokio::test]
    async fn register_persists_unconfirmed_student() {
        let store = Arc::new(MemoryStudentStore::new());
        let svc = service(store.clone(), Arc::new(MemoryNotifier::new()));

        let student = svc.register(&input("ana@example.com")).await.unwrap();
        assert_eq!(student.email, "ana@example.com");
        assert!(!student.payment_confirmed);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let store = Arc::new(MemoryStudentStore::new());
        let svc = service(store.clone(), Arc::new(MemoryNotifier::new()));

        svc.register(&input("ana@example.com")).await.unwrap();
        let second = svc.register(&input("ana@example.com")).await;

        assert!(matches!(second, Err(PaymentError::DuplicateEmail(_))));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn invalid_input_never_touches_the_store() {
        let store = Arc::new(MemoryStudentStore::new());
        let svc = service(store.clone(), Arc::new(MemoryNotifier::new()));

        let mut bad = input("ana@example.com");
        bad.idade = Some(200);
        let result = svc.register(&bad).await;

        assert!(matches!(result, Err(PaymentError::Validation(_))));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn email_availability_flips_after_registration() {
        let svc = service(
            Arc::new(MemoryStudentStore::new()),
            Arc::new(MemoryNotifier::new()),
        );

        assert!(svc.email_available("ana@example.com").await.unwrap());
        svc.register(&input("ana@example.com")).await.unwrap();
        assert!(!svc.email_available("ana@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn checkout_links_gateway_ids_and_returns_url() {
        let store = Arc::new(MemoryStudentStore::new());
        let gateway = Arc::new(MockGateway::new());
        let svc = service(store.clone(), Arc::new(MemoryNotifier::new()))
            .with_gateway(gateway.clone(), CheckoutSettings::default());

        let outcome = svc.checkout(&input("ana@example.com")).await.unwrap();

        assert!(outcome.checkout_url.starts_with("https://"));
        assert_eq!(
            outcome.student.gateway_customer_id.as_deref(),
            Some("cust_mock_1")
        );
        assert!(outcome.student.gateway_transaction_id.is_some());
        assert_eq!(gateway.customers()[0].email, "ana@example.com");
    }

    #[tokio::test]
    async fn checkout_without_gateway_is_unavailable() {
        let svc = service(
            Arc::new(MemoryStudentStore::new()),
            Arc::new(MemoryNotifier::new()),
        );
        let result = svc.checkout(&input("ana@example.com")).await;
        assert!(matches!(result, Err(PaymentError::GatewayUnavailable)));
    }

    #[tokio::test]
    async fn billing_failure_still_leaves_linked_record() {
        let store = Arc::new(MemoryStudentStore::new());
        let svc = service(store.clone(), Arc::new(MemoryNotifier::new())).with_gateway(
            Arc::new(MockGateway::failing_billing()),
            CheckoutSettings::default(),
        );

        let result = svc.checkout(&input("ana@example.com")).await;
        assert!(matches!(result, Err(PaymentError::Gateway { .. })));

        // The row exists and already carries the customer id.
        let student = store
            .find_by_email("ana@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(student.gateway_customer_id.as_deref(), Some("cust_mock_1"));
        assert!(student.gateway_transaction_id.is_none());
    }

    #[tokio::test]
    async fn manual_confirmation_by_id() {
        let store = Arc::new(MemoryStudentStore::new());
        let svc = service(store, Arc::new(MemoryNotifier::new()));

        let student = svc.register(&input("ana@example.com")).await.unwrap();
        let confirmed = svc
            .confirm_manual(&student.id.to_string())
            .await
            .unwrap()
            .unwrap();
        assert!(confirmed.payment_confirmed);

        let missing = svc
            .confirm_manual(&uuid::Uuid::new_v4().to_string())
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
