//! Error Types

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum CoreError {
    /// A record with this email already exists
    #[error("duplicate email: {0}")]
    DuplicateEmail(String),

    /// Store backend failure (connection, query, serialization)
    #[error("store error: {0}")]
    Store(String),

    /// Notification delivery failure
    #[error("notification error: {0}")]
    Notification(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Store(_) | CoreError::Notification(_))
    }

    /// Convert to a user-friendly message (backend detail stays in the logs)
    pub fn user_message(&self) -> &str {
        match self {
            CoreError::DuplicateEmail(_) => "E-mail já cadastrado",
            CoreError::Store(_) => "Erro interno no servidor",
            CoreError::Notification(_) => "Falha ao enviar notificação",
            CoreError::Config(_) => "Erro de configuração do serviço",
        }
    }
}
