//! Medical forms and prescriptions.
//!
//! Forms move `pending → reviewed | approved` exactly once; the
//! reviewing doctor is bound on that transition and never reassigned.
//! Prescription status moves freely among active/completed/cancelled,
//! but only for the owning patient or the issuing doctor.

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::models::{
    FormStatus, FormType, MedicalForm, NewPrescription, Prescription, PrescriptionStatus, Role,
};

// ── Forms ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitFormRequest {
    pub form_type: Option<String>,
    pub form_data: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct SubmitFormResponse {
    pub message: &'static str,
    pub form_id: i64,
    pub status: FormStatus,
}

/// `POST /api/medical/forms` — patient submits a structured form.
pub async fn submit_form(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<SubmitFormRequest>,
) -> Result<(axum::http::StatusCode, Json<SubmitFormResponse>), ApiError> {
    if auth.role != Role::Patient {
        return Err(ApiError::Forbidden(
            "Only patients can submit medical forms".into(),
        ));
    }

    let form_type = payload
        .form_type
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("form_type and form_data are required".into()))?;
    let form_type = FormType::from_str(form_type).map_err(|_| {
        ApiError::BadRequest(
            "Invalid form_type. Must be one of: health_profile, symptoms, vitals, medications, family_history"
                .into(),
        )
    })?;
    let form_data = payload
        .form_data
        .ok_or_else(|| ApiError::BadRequest("form_type and form_data are required".into()))?;

    let conn = ctx.state.open_db()?;
    let form_id = repository::insert_form(&conn, &auth.email, form_type, &form_data, Utc::now())?;
    tracing::info!(form_id, patient = %auth.email, form_type = form_type.as_str(), "form submitted");

    Ok((
        axum::http::StatusCode::CREATED,
        Json(SubmitFormResponse {
            message: "Form submitted successfully",
            form_id,
            status: FormStatus::Pending,
        }),
    ))
}

#[derive(Serialize)]
pub struct FormListResponse {
    pub forms: Vec<MedicalForm>,
}

/// `GET /api/medical/forms` — patients see their own forms, doctors see
/// every pending form plus the forms they reviewed.
pub async fn list_forms(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<FormListResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let forms = match auth.role {
        Role::Patient => repository::list_forms_for_patient(&conn, &auth.email)?,
        Role::Doctor => repository::list_forms_for_doctor(&conn, &auth.email)?,
    };
    Ok(Json(FormListResponse { forms }))
}

#[derive(Deserialize)]
pub struct ReviewFormRequest {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct ReviewFormResponse {
    pub message: String,
    pub form_id: i64,
    pub status: FormStatus,
}

/// `POST /api/medical/forms/:id/review` — doctor reviews a pending form.
pub async fn review_form(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(form_id): Path<i64>,
    Json(payload): Json<ReviewFormRequest>,
) -> Result<Json<ReviewFormResponse>, ApiError> {
    if auth.role != Role::Doctor {
        return Err(ApiError::Forbidden("Only doctors can review forms".into()));
    }

    let status = payload.status.as_deref().unwrap_or("reviewed");
    let status = FormStatus::from_str(status)
        .ok()
        .filter(|s| matches!(s, FormStatus::Reviewed | FormStatus::Approved))
        .ok_or_else(|| ApiError::BadRequest("Status must be 'reviewed' or 'approved'".into()))?;

    let conn = ctx.state.open_db()?;
    let form = repository::get_form(&conn, form_id)?
        .ok_or_else(|| ApiError::NotFound("Form not found".into()))?;
    if form.status != FormStatus::Pending {
        return Err(ApiError::BadRequest("Form has already been reviewed".into()));
    }

    // The UPDATE is guarded on status='pending'; zero rows means another
    // reviewer won the race.
    let updated = repository::apply_form_review(&conn, form_id, &auth.email, status)?;
    if updated == 0 {
        return Err(ApiError::BadRequest("Form has already been reviewed".into()));
    }

    tracing::info!(form_id, doctor = %auth.email, status = status.as_str(), "form reviewed");
    ctx.state
        .ledger
        .dispatch(&form.patient_email, &auth.email, "form_review");

    Ok(Json(ReviewFormResponse {
        message: format!("Form {} successfully", status.as_str()),
        form_id,
        status,
    }))
}

// ── Prescriptions ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreatePrescriptionRequest {
    pub patient_email: Option<String>,
    pub medication_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Serialize)]
pub struct CreatePrescriptionResponse {
    pub message: &'static str,
    pub prescription_id: i64,
}

/// `POST /api/medical/prescriptions` — doctor issues a prescription.
pub async fn create_prescription(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreatePrescriptionRequest>,
) -> Result<(axum::http::StatusCode, Json<CreatePrescriptionResponse>), ApiError> {
    if auth.role != Role::Doctor {
        return Err(ApiError::Forbidden(
            "Only doctors can create prescriptions".into(),
        ));
    }

    let missing = || ApiError::BadRequest("Missing required fields".into());
    let rx = NewPrescription {
        patient_email: payload.patient_email.filter(|v| !v.is_empty()).ok_or_else(missing)?,
        doctor_email: auth.email.clone(),
        medication_name: payload.medication_name.filter(|v| !v.is_empty()).ok_or_else(missing)?,
        dosage: payload.dosage.filter(|v| !v.is_empty()).ok_or_else(missing)?,
        frequency: payload.frequency.filter(|v| !v.is_empty()).ok_or_else(missing)?,
        duration: payload.duration.filter(|v| !v.is_empty()).ok_or_else(missing)?,
        instructions: payload.instructions,
    };

    let conn = ctx.state.open_db()?;
    let prescription_id = repository::insert_prescription(&conn, &rx, Utc::now())?;
    tracing::info!(prescription_id, patient = %rx.patient_email, doctor = %auth.email, "prescription created");

    Ok((
        axum::http::StatusCode::CREATED,
        Json(CreatePrescriptionResponse {
            message: "Prescription created successfully",
            prescription_id,
        }),
    ))
}

#[derive(Serialize)]
pub struct PrescriptionListResponse {
    pub prescriptions: Vec<Prescription>,
}

/// `GET /api/medical/prescriptions` — patients see their own, doctors
/// see the ones they issued.
pub async fn list_prescriptions(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<PrescriptionListResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let prescriptions = match auth.role {
        Role::Patient => repository::list_prescriptions_for_patient(&conn, &auth.email)?,
        Role::Doctor => repository::list_prescriptions_for_doctor(&conn, &auth.email)?,
    };
    Ok(Json(PrescriptionListResponse { prescriptions }))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct UpdateStatusResponse {
    pub message: &'static str,
    pub prescription_id: i64,
    pub status: PrescriptionStatus,
}

/// `PUT /api/medical/prescriptions/:id/status`
pub async fn update_prescription_status(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(prescription_id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    let status = payload
        .status
        .as_deref()
        .and_then(|s| PrescriptionStatus::from_str(s).ok())
        .ok_or_else(|| ApiError::BadRequest("Invalid status".into()))?;

    let conn = ctx.state.open_db()?;
    let rx = repository::get_prescription(&conn, prescription_id)?
        .ok_or_else(|| ApiError::NotFound("Prescription not found".into()))?;

    let permitted = rx.patient_email == auth.email || rx.doctor_email == auth.email;
    if !permitted {
        return Err(ApiError::Forbidden(
            "Only the prescription's patient or doctor may change its status".into(),
        ));
    }

    repository::update_prescription_status(&conn, prescription_id, status)?;
    tracing::info!(prescription_id, accessor = %auth.email, status = status.as_str(), "prescription status updated");

    Ok(Json(UpdateStatusResponse {
        message: "Prescription status updated successfully",
        prescription_id,
        status,
    }))
}
