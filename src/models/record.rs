use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata row describing one uploaded document and its storage location.
///
/// The storage key is deterministic from `(patient_email, filename)`;
/// re-uploading the same key overwrites the blob and refreshes this row
/// rather than creating a second record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub patient_email: String,
    pub storage_key: String,
    pub blob_path: String,
    pub uploaded_at: DateTime<Utc>,
}

/// One authorized read/download/preview of a record. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessLogEntry {
    pub id: i64,
    pub record_id: i64,
    pub accessed_by: String,
    pub access_time: DateTime<Utc>,
}
