//! Payment Error Types

use enroll_core::{CoreError, FieldError};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Errors surfaced by the enrollment workflow and gateway integration
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Registration input failed validation (full ordered field list)
    #[error("dados de inscrição inválidos")]
    Validation(Vec<FieldError>),

    /// A record with this email already exists
    #[error("e-mail já cadastrado: {0}")]
    DuplicateEmail(String),

    /// No student matches the given id or email
    #[error("inscrição não encontrada: {0}")]
    NotFound(String),

    /// Remote gateway call failed; detail is logged, never shown verbatim
    #[error("gateway error (status {status:?})")]
    Gateway {
        status: Option<u16>,
        detail: String,
    },

    /// No gateway configured for this deployment
    #[error("payment gateway not configured")]
    GatewayUnavailable,

    /// Store backend failure
    #[error("store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// User-facing message; internal detail stays server-side
    pub fn user_message(&self) -> &str {
        match self {
            PaymentError::Validation(_) => "Dados de inscrição inválidos",
            PaymentError::DuplicateEmail(_) => "E-mail já cadastrado",
            PaymentError::NotFound(_) => "Inscrição não encontrada",
            PaymentError::Gateway { .. } => "Falha ao processar o pagamento. Tente novamente.",
            PaymentError::GatewayUnavailable => "Pagamentos indisponíveis no momento",
            PaymentError::Store(_) | PaymentError::Config(_) => "Erro interno no servidor",
        }
    }
}

impl From<CoreError> for PaymentError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DuplicateEmail(email) => PaymentError::DuplicateEmail(email),
            CoreError::Config(msg) => PaymentError::Config(msg),
            other => PaymentError::Store(other.to_string()),
        }
    }
}
