//! Collection Document Shape
//!
//! BSON representation of a student record. Field names match the original
//! collection schema; timestamps are stored as RFC 3339 strings via chrono's
//! serde support.

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use enroll_core::error::{CoreError, Result};
use enroll_core::{Student, StudentPatch};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct StudentDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub nome: String,
    pub idade: u8,
    pub email: String,
    pub celular: String,
    #[serde(rename = "taxId", skip_serializing_if = "Option::is_none", default)]
    pub tax_id: Option<String>,
    #[serde(rename = "dataInscricao")]
    pub enrolled_at: DateTime<Utc>,
    #[serde(rename = "pagamentoConfirmado", default)]
    pub payment_confirmed: bool,
    #[serde(rename = "dataPagamento", skip_serializing_if = "Option::is_none", default)]
    pub payment_confirmed_at: Option<DateTime<Utc>>,
    #[serde(rename = "customerId", skip_serializing_if = "Option::is_none", default)]
    pub gateway_customer_id: Option<String>,
    #[serde(
        rename = "transactionId",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub gateway_transaction_id: Option<String>,
}

impl From<&Student> for StudentDocument {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.to_string(),
            nome: student.name.clone(),
            idade: student.age,
            email: student.email.clone(),
            celular: student.phone.clone(),
            tax_id: student.tax_id.clone(),
            enrolled_at: student.enrolled_at,
            payment_confirmed: student.payment_confirmed,
            payment_confirmed_at: student.payment_confirmed_at,
            gateway_customer_id: student.gateway_customer_id.clone(),
            gateway_transaction_id: student.gateway_transaction_id.clone(),
        }
    }
}

impl TryFrom<StudentDocument> for Student {
    type Error = CoreError;

    fn try_from(document: StudentDocument) -> Result<Student> {
        let id = Uuid::parse_str(&document.id)
            .map_err(|e| CoreError::Store(format!("malformed record id: {e}")))?;

        Ok(Student {
            id,
            name: document.nome,
            age: document.idade,
            email: document.email,
            phone: document.celular,
            tax_id: document.tax_id,
            enrolled_at: document.enrolled_at,
            payment_confirmed: document.payment_confirmed,
            payment_confirmed_at: document.payment_confirmed_at,
            gateway_customer_id: document.gateway_customer_id,
            gateway_transaction_id: document.gateway_transaction_id,
        })
    }
}

/// Build the `$set` update for a partial patch.
///
/// A patch never carries `pagamentoConfirmado: false`, so the false→true-only
/// invariant holds at the collection too.
pub(crate) fn update_document(patch: &StudentPatch) -> Document {
    let mut set = Document::new();

    if let Some(ref customer_id) = patch.gateway_customer_id {
        set.insert("customerId", customer_id);
    }
    if let Some(ref transaction_id) = patch.gateway_transaction_id {
        set.insert("transactionId", transaction_id);
    }
    if patch.confirm_payment {
        set.insert("pagamentoConfirmado", true);
        set.insert(
            "dataPagamento",
            patch
                .confirmed_at
                .unwrap_or_else(Utc::now)
                .to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
        );
    }

    doc! { "$set": set }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enroll_core::validate::Registration;

    fn student() -> Student {
        Student::new(Registration {
            name: "Ana Silva".into(),
            age: 25,
            email: "ana@example.com".into(),
            phone: "11999998888".into(),
            tax_id: Some("52998224725".into()),
        })
    }

    #[test]
    fn document_round_trip_preserves_the_record() {
        let original = student();
        let document = StudentDocument::from(&original);
        let restored = Student::try_from(document).unwrap();

        assert_eq!(restored.id, original.id);
        assert_eq!(restored.email, original.email);
        assert_eq!(restored.tax_id, original.tax_id);
        assert!(!restored.payment_confirmed);
    }

    #[test]
    fn malformed_id_is_a_store_error() {
        let mut document = StudentDocument::from(&student());
        document.id = "not-a-uuid".into();
        assert!(Student::try_from(document).is_err());
    }

    #[test]
    fn confirm_patch_sets_flag_and_timestamp() {
        let update = update_document(&StudentPatch::payment_confirmed());
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_bool("pagamentoConfirmado"), Ok(true));
        assert!(set.get_str("dataPagamento").is_ok());
    }

    #[test]
    fn gateway_patches_touch_only_their_fields() {
        let update = update_document(&StudentPatch::customer("cust_1"));
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("customerId"), Ok("cust_1"));
        assert!(set.get_bool("pagamentoConfirmado").is_err());
    }
}
