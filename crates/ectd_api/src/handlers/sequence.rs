use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use ectd_core::models::{AuditEvent, PlannedDocumentEntry};
use ectd_service::{parse_base, PlanValidation, SequenceSummary};

use crate::error::ApiError;
use crate::AppState;

pub const USER_HEADER: &str = "x-user-id";

#[derive(Debug, Deserialize)]
pub struct CreateSequenceRequest {
    pub base: Option<String>,
    pub plan: Option<Vec<PlannedDocumentEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct ValidatePlanRequest {
    pub plan: Option<Vec<PlannedDocumentEntry>>,
}

pub async fn last_sequence(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let sequence = state.service.last_sequence().await?;
    Ok(Json(json!({ "sequence": sequence })))
}

pub async fn create_sequence(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateSequenceRequest>, JsonRejection>,
) -> Result<Json<SequenceSummary>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let (Some(base), Some(plan)) = (request.base, request.plan) else {
        return Err(ApiError::bad_request("Missing base sequence or plan"));
    };
    let base = parse_base(&base)?;

    let actor = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(state.default_actor.as_str())
        .to_string();

    let summary = state.service.build_sequence(base, &plan, &actor).await?;
    Ok(Json(summary))
}

pub async fn validate_plan(
    State(state): State<AppState>,
    body: Result<Json<ValidatePlanRequest>, JsonRejection>,
) -> Result<Json<PlanValidation>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let plan = request.plan.ok_or_else(|| ApiError::bad_request("Missing plan"))?;

    Ok(Json(state.service.validate_plan(&plan).await?))
}

pub async fn audit_trail(
    State(state): State<AppState>,
    Path(sequence): Path<String>,
) -> Result<Json<Vec<AuditEvent>>, ApiError> {
    let sequence = parse_base(&sequence)?;
    Ok(Json(state.service.audit_trail(sequence).await?))
}
