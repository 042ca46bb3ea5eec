//! Manual ledger entry point.
//!
//! Unlike the fire-and-forget notifications issued by the storage and
//! medical handlers, notifying the ledger *is* the primary operation
//! here, so its failure is surfaced to the caller.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};

#[derive(Deserialize)]
pub struct LogAccessRequest {
    pub record_id: Option<i64>,
    pub patient_id: Option<String>,
    pub accessor: Option<String>,
}

#[derive(Serialize)]
pub struct LogAccessResponse {
    pub message: &'static str,
    pub confirmation: String,
}

/// `POST /api/ledger/log-access`
pub async fn log_access(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AuthContext>,
    Json(payload): Json<LogAccessRequest>,
) -> Result<Json<LogAccessResponse>, ApiError> {
    let (Some(record_id), Some(patient_id), Some(accessor)) =
        (payload.record_id, payload.patient_id, payload.accessor)
    else {
        return Err(ApiError::BadRequest(
            "Missing required fields: record_id, patient_id, accessor".into(),
        ));
    };

    let subject = format!("{patient_id}/{record_id}");
    let confirmation = ctx
        .state
        .ledger
        .notify(&subject, &accessor, "manual_log")
        .await
        .map_err(|e| ApiError::LedgerUnavailable(e.to_string()))?;

    Ok(Json(LogAccessResponse {
        message: "Access logged successfully",
        confirmation,
    }))
}
