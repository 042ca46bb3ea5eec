use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::Record;

fn record_from_row(row: &Row<'_>) -> Result<Record, rusqlite::Error> {
    Ok(Record {
        id: row.get(0)?,
        patient_email: row.get(1)?,
        storage_key: row.get(2)?,
        blob_path: row.get(3)?,
        uploaded_at: row.get(4)?,
    })
}

/// Insert a record row, or refresh it when the storage key already exists
/// (re-upload overwrites, no versioning). Returns the row id.
pub fn upsert_record(
    conn: &Connection,
    patient_email: &str,
    storage_key: &str,
    blob_path: &str,
    uploaded_at: DateTime<Utc>,
) -> Result<i64, DatabaseError> {
    let id = conn.query_row(
        "INSERT INTO records (patient_email, storage_key, blob_path, uploaded_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(storage_key) DO UPDATE SET
             blob_path = excluded.blob_path,
             uploaded_at = excluded.uploaded_at
         RETURNING id",
        params![patient_email, storage_key, blob_path, uploaded_at],
        |row| row.get(0),
    )?;
    Ok(id)
}

pub fn get_record_by_key(
    conn: &Connection,
    storage_key: &str,
) -> Result<Option<Record>, DatabaseError> {
    let record = conn
        .query_row(
            "SELECT id, patient_email, storage_key, blob_path, uploaded_at
             FROM records WHERE storage_key = ?1",
            params![storage_key],
            record_from_row,
        )
        .optional()?;
    Ok(record)
}

pub fn get_records_by_patient(
    conn: &Connection,
    patient_email: &str,
) -> Result<Vec<Record>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_email, storage_key, blob_path, uploaded_at
         FROM records WHERE patient_email = ?1 ORDER BY uploaded_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![patient_email], record_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn get_all_records(conn: &Connection) -> Result<Vec<Record>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_email, storage_key, blob_path, uploaded_at
         FROM records ORDER BY uploaded_at DESC, id DESC",
    )?;
    let rows = stmt.query_map([], record_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
