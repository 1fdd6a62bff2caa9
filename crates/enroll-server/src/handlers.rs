//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use enroll_core::{RegistrationInput, Student};
use enroll_payments::{secret_matches, WebhookEvent, WebhookOutcome};

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct EmailQuery {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct EmailAvailabilityResponse {
    pub success: bool,
    #[serde(rename = "emailDisponivel")]
    pub email_available: bool,
}

#[derive(Serialize)]
pub struct AlunoSummary {
    pub id: String,
    pub nome: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
}

impl AlunoSummary {
    fn from_student(student: &Student) -> Self {
        Self {
            id: student.id.to_string(),
            nome: student.name.clone(),
            email: student.email.clone(),
            status: None,
        }
    }

    fn confirmed(student: &Student) -> Self {
        Self {
            status: Some("confirmed"),
            ..Self::from_student(student)
        }
    }
}

#[derive(Serialize)]
pub struct RegistrationResponse {
    pub success: bool,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    pub aluno: AlunoSummary,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    #[serde(rename = "checkoutUrl")]
    pub checkout_url: String,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
}

#[derive(Serialize)]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    pub message: &'static str,
    pub aluno: AlunoSummary,
}

#[derive(Deserialize)]
pub struct WebhookQuery {
    #[serde(default)]
    pub secret: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
    })
}

/// Email availability for the registration form
pub async fn verificar_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<EmailAvailabilityResponse>, ApiError> {
    let email = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            ApiError::new(StatusCode::BAD_REQUEST, "Parâmetro email é obrigatório")
        })?;

    let available = state
        .service
        .email_available(email)
        .await
        .map_err(|e| ApiError::from_payment(e, state.environment))?;

    Ok(Json(EmailAvailabilityResponse {
        success: true,
        email_available: available,
    }))
}

/// Register a student (no payment step)
pub async fn inscricao(
    State(state): State<AppState>,
    Json(input): Json<RegistrationInput>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    let student = state
        .service
        .register(&input)
        .await
        .map_err(|e| ApiError::from_payment(e, state.environment))?;

    Ok(Json(RegistrationResponse {
        success: true,
        transaction_id: student.id.to_string(),
        aluno: AlunoSummary::from_student(&student),
    }))
}

/// Register a student and open a hosted checkout
pub async fn checkout(
    State(state): State<AppState>,
    Json(input): Json<RegistrationInput>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let outcome = state
        .service
        .checkout(&input)
        .await
        .map_err(|e| ApiError::from_payment(e, state.environment))?;

    Ok(Json(CheckoutResponse {
        success: true,
        checkout_url: outcome.checkout_url,
        transaction_id: outcome.student.id.to_string(),
    }))
}

/// Gateway payment-event webhook.
///
/// The shared secret is checked before the body is even parsed; a mismatch
/// never evaluates the payload.
pub async fn webhook(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, String), ApiError> {
    let Some(ref expected) = state.webhook_secret else {
        tracing::warn!("webhook called but no WEBHOOK_SECRET configured");
        return Err(ApiError::new(StatusCode::FORBIDDEN, "Acesso negado"));
    };

    let provided = query
        .secret
        .as_deref()
        .or_else(|| headers.get("x-webhook-secret").and_then(|v| v.to_str().ok()));

    if !secret_matches(provided, expected) {
        tracing::warn!("webhook rejected: invalid secret");
        return Err(ApiError::new(StatusCode::FORBIDDEN, "Acesso negado"));
    }

    let payload: serde_json::Value = serde_json::from_str(&body)
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Payload inválido"))?;

    let event = WebhookEvent::from_value(&payload);
    let outcome = state
        .reconciliation
        .handle(&event)
        .await
        .map_err(|e| ApiError::from_payment(e, state.environment))?;

    match outcome {
        WebhookOutcome::Confirmed(_) | WebhookOutcome::AlreadyConfirmed(_) => {
            Ok((StatusCode::OK, "Webhook processado com sucesso".into()))
        }
        WebhookOutcome::Ignored(_) => Ok((StatusCode::OK, "Evento não tratado".into())),
        WebhookOutcome::MissingEmail => Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Email não encontrado",
        )),
        WebhookOutcome::StudentNotFound(_) => {
            Err(ApiError::new(StatusCode::NOT_FOUND, "Aluno não encontrado"))
        }
    }
}

/// Administrative override: confirm a payment by transaction id
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<ConfirmPaymentResponse>, ApiError> {
    let student = state
        .service
        .confirm_manual(&transaction_id)
        .await
        .map_err(|e| ApiError::from_payment(e, state.environment))?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Inscrição não encontrada"))?;

    Ok(Json(ConfirmPaymentResponse {
        success: true,
        message: "Pagamento confirmado com sucesso",
        aluno: AlunoSummary::confirmed(&student),
    }))
}
