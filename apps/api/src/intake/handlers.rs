//! Axum route handlers for the intake API.

use axum::{body::Bytes, extract::State, Json};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::errors::AppError;
use crate::intake::pipeline::generate_and_send;
use crate::models::intake::{lenient_id, IntakeRecord, IntakeSubmission, Verdict};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: &'static str,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Bodies are read raw so that an absent body, bad JSON and a bad field all
/// come back as the same 400 shape instead of the extractor's own rejection.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::Validation("No data received".to_string()));
    }
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /submit
///
/// Stores a new intake submission, unverified and unsent.
pub async fn handle_submit(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, AppError> {
    let submission: IntakeSubmission = parse_body(&body)?;
    if submission.is_empty() {
        return Err(AppError::Validation("No data received".to_string()));
    }

    let id = state.store.create(&submission).await?;

    Ok(Json(SubmitResponse {
        message: "Data saved successfully",
        id,
    }))
}

/// GET /all
///
/// Every submission in insertion order, status fields included.
pub async fn handle_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<IntakeRecord>>, AppError> {
    Ok(Json(state.store.list().await?))
}

/// POST /verify_payment
///
/// Applies the operator's verdict. `action` is "verify" (the default) or "reject".
pub async fn handle_verify(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let request: VerifyRequest = parse_body(&body)?;
    let id = request
        .id
        .ok_or_else(|| AppError::Validation("Missing ID".to_string()))?;
    let verdict = Verdict::from_action(request.action.as_deref().unwrap_or("verify"))
        .ok_or_else(|| AppError::Validation("Invalid action".to_string()))?;

    state.store.set_verification(id, verdict).await?;

    let outcome = match verdict {
        Verdict::Approve => "verified",
        Verdict::Reject => "rejected",
    };
    Ok(Json(MessageResponse {
        message: format!("Submission {outcome} successfully"),
    }))
}

/// POST /generate_resume
///
/// Runs generate-and-send for one verified submission.
pub async fn handle_generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let request: GenerateRequest = parse_body(&body)?;
    let id = request
        .id
        .ok_or_else(|| AppError::Validation("Missing ID".to_string()))?;

    generate_and_send(&state, id).await?;

    Ok(Json(MessageResponse {
        message: "Resume generated and emailed successfully.".to_string(),
    }))
}
