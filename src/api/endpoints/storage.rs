//! Document upload, listing, download/preview, and access-log queries.
//!
//! Authorization rule for record access: a patient may only touch keys
//! whose owning patient is their own identity; a doctor may touch any
//! key. Every authorized read appends one access-log entry before the
//! payload is returned, and cross-identity reads are mirrored to the
//! ledger fire-and-forget.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::models::Record;
use crate::storage::{allowed_file, sanitize_filename, storage_key, valid_email_segment};

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub record_id: i64,
    pub storage_key: String,
    pub patient_email: String,
}

/// `POST /api/storage/upload` — multipart with a `file` part and an
/// optional `patientEmail` part (defaults to the caller).
pub async fn upload(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut patient_email: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {e}")))?;
                file = Some((filename, bytes.to_vec()));
            }
            "patientEmail" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {e}")))?;
                patient_email = Some(value);
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| ApiError::BadRequest("No file provided".into()))?;
    if filename.is_empty() {
        return Err(ApiError::BadRequest("No file selected".into()));
    }

    let patient_email = patient_email.unwrap_or_else(|| auth.email.clone());
    if !valid_email_segment(&patient_email) {
        return Err(ApiError::BadRequest("Invalid patient email".into()));
    }

    let filename = sanitize_filename(&filename);
    if !allowed_file(&filename) {
        let ext = filename.rsplit_once('.').map(|(_, e)| e).unwrap_or("none");
        return Err(ApiError::UnsupportedFileType(ext.to_string()));
    }

    // Blob first, then metadata: a metadata failure rolls back the
    // transaction and leaves at worst an orphaned blob.
    let key = storage_key(&patient_email, &filename);
    let blob_path = ctx.state.blobs.put(&key, &bytes)?;

    let mut conn = ctx.state.open_db()?;
    let tx = conn.transaction().map_err(ApiError::from)?;
    let record_id = repository::upsert_record(
        &tx,
        &patient_email,
        &key,
        &blob_path.to_string_lossy(),
        Utc::now(),
    )?;
    tx.commit().map_err(ApiError::from)?;

    tracing::info!(%key, accessor = %auth.email, "document uploaded");
    ctx.state.ledger.dispatch(&key, &auth.email, "upload");

    Ok(Json(UploadResponse {
        message: "File uploaded successfully",
        record_id,
        storage_key: key,
        patient_email,
    }))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub patient: Option<String>,
}

#[derive(Serialize)]
pub struct FileEntry {
    pub id: i64,
    pub patient_email: String,
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct FileListResponse {
    pub files: Vec<FileEntry>,
}

impl From<Record> for FileEntry {
    fn from(r: Record) -> Self {
        Self {
            id: r.id,
            patient_email: r.patient_email,
            storage_key: r.storage_key,
            uploaded_at: r.uploaded_at,
        }
    }
}

/// `GET /api/storage/list?patient=` — record metadata for one patient.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<FileListResponse>, ApiError> {
    let target = query.patient.unwrap_or_else(|| auth.email.clone());
    if !auth.is_doctor() && target != auth.email {
        return Err(ApiError::Forbidden(
            "Patients may only list their own records".into(),
        ));
    }

    let conn = ctx.state.open_db()?;
    let records = repository::get_records_by_patient(&conn, &target)?;

    // Cross-patient listing is itself an auditable event.
    if target != auth.email {
        ctx.state.ledger.dispatch(&target, &auth.email, "list");
    }

    Ok(Json(FileListResponse {
        files: records.into_iter().map(FileEntry::from).collect(),
    }))
}

/// `GET /api/storage/records` — full catalog, doctors only.
pub async fn records(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<FileListResponse>, ApiError> {
    if !auth.is_doctor() {
        return Err(ApiError::Forbidden("Doctor role required".into()));
    }

    let conn = ctx.state.open_db()?;
    let records = repository::get_all_records(&conn)?;
    Ok(Json(FileListResponse {
        files: records.into_iter().map(FileEntry::from).collect(),
    }))
}

/// Look up a record by key and apply the ownership rule. No access-log
/// entry is written for a forbidden attempt.
fn fetch_authorized(
    conn: &rusqlite::Connection,
    auth: &AuthContext,
    key: &str,
) -> Result<Record, ApiError> {
    let record = repository::get_record_by_key(conn, key)?
        .ok_or_else(|| ApiError::NotFound("Record not found".into()))?;

    if !auth.is_doctor() && record.patient_email != auth.email {
        return Err(ApiError::Forbidden(
            "Patients may only access their own records".into(),
        ));
    }
    Ok(record)
}

/// Append the access-log entry and, for cross-identity access, notify
/// the ledger. Runs on the success path only.
fn log_authorized_access(
    conn: &rusqlite::Connection,
    ctx: &ApiContext,
    auth: &AuthContext,
    record: &Record,
    action: &'static str,
) -> Result<(), ApiError> {
    repository::insert_access_entry(conn, record.id, &auth.email, Utc::now())?;
    if auth.email != record.patient_email {
        ctx.state
            .ledger
            .dispatch(&record.storage_key, &auth.email, action);
    }
    Ok(())
}

/// `GET /api/storage/download/*key` — document bytes.
pub async fn download(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let conn = ctx.state.open_db()?;
    let record = fetch_authorized(&conn, &auth, &key)?;

    log_authorized_access(&conn, &ctx, &auth, &record, "download")?;
    let bytes = ctx.state.blobs.get(&key)?;

    let filename = key.rsplit('/').next().unwrap_or(&key).to_string();
    let mime = mime_guess::from_path(&filename).first_or_octet_stream();
    let headers = [
        (header::CONTENT_TYPE, mime.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub content: String,
}

/// `GET /api/storage/preview/*key` — document decoded as text.
pub async fn preview(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(key): Path<String>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let record = fetch_authorized(&conn, &auth, &key)?;

    log_authorized_access(&conn, &ctx, &auth, &record, "preview")?;
    let bytes = ctx.state.blobs.get(&key)?;
    let content = String::from_utf8(bytes).map_err(|_| ApiError::UndecodableContent)?;

    Ok(Json(PreviewResponse { content }))
}

#[derive(Serialize)]
pub struct AccessLogView {
    pub record_id: i64,
    pub accessed_by: String,
    pub access_time: DateTime<Utc>,
}

/// `GET /api/storage/access-logs/:patient` — who touched this patient's
/// records, most recent first.
pub async fn access_logs(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(patient): Path<String>,
) -> Result<Json<Vec<AccessLogView>>, ApiError> {
    if !auth.is_doctor() && patient != auth.email {
        return Err(ApiError::Forbidden(
            "Patients may only view their own access logs".into(),
        ));
    }

    let conn = ctx.state.open_db()?;
    let records = repository::get_records_by_patient(&conn, &patient)?;
    if records.is_empty() {
        return Err(ApiError::NotFound("No records found for this patient".into()));
    }

    let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
    let entries = repository::get_access_entries_for_records(&conn, &ids)?;

    if patient != auth.email {
        ctx.state.ledger.dispatch(&patient, &auth.email, "access_logs");
    }

    Ok(Json(
        entries
            .into_iter()
            .map(|e| AccessLogView {
                record_id: e.record_id,
                accessed_by: e.accessed_by,
                access_time: e.access_time,
            })
            .collect(),
    ))
}
