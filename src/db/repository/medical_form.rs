use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::{FormStatus, FormType, MedicalForm};

fn form_from_row(row: &Row<'_>) -> Result<MedicalForm, DatabaseError> {
    let form_type: String = row.get(2)?;
    let form_data: String = row.get(3)?;
    let status: String = row.get(6)?;
    Ok(MedicalForm {
        id: row.get(0)?,
        patient_email: row.get(1)?,
        form_type: FormType::from_str(&form_type)?,
        form_data: serde_json::from_str(&form_data)
            .unwrap_or(serde_json::Value::Null),
        submitted_at: row.get(4)?,
        doctor_email: row.get(5)?,
        status: FormStatus::from_str(&status)?,
    })
}

const FORM_COLUMNS: &str =
    "id, patient_email, form_type, form_data, submitted_at, doctor_email, status";

pub fn insert_form(
    conn: &Connection,
    patient_email: &str,
    form_type: FormType,
    form_data: &serde_json::Value,
    submitted_at: DateTime<Utc>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO medical_forms (patient_email, form_type, form_data, submitted_at, status)
         VALUES (?1, ?2, ?3, ?4, 'pending')",
        params![
            patient_email,
            form_type.as_str(),
            serde_json::to_string(form_data).unwrap_or_else(|_| "null".to_string()),
            submitted_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_form(conn: &Connection, form_id: i64) -> Result<Option<MedicalForm>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {FORM_COLUMNS} FROM medical_forms WHERE id = ?1"),
            params![form_id],
            |row| Ok(form_from_row(row)),
        )
        .optional()?;
    row.transpose()
}

pub fn list_forms_for_patient(
    conn: &Connection,
    patient_email: &str,
) -> Result<Vec<MedicalForm>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FORM_COLUMNS} FROM medical_forms
         WHERE patient_email = ?1 ORDER BY submitted_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![patient_email], |row| Ok(form_from_row(row)))?;
    collect_forms(rows)
}

/// Doctors see every pending form plus the forms they reviewed themselves.
pub fn list_forms_for_doctor(
    conn: &Connection,
    doctor_email: &str,
) -> Result<Vec<MedicalForm>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FORM_COLUMNS} FROM medical_forms
         WHERE status = 'pending' OR doctor_email = ?1
         ORDER BY submitted_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![doctor_email], |row| Ok(form_from_row(row)))?;
    collect_forms(rows)
}

/// Review transition: only a `pending` form is touched, so the reviewer
/// binding can never be overwritten by a later review. Returns the number
/// of rows updated (0 means the form was already reviewed).
pub fn apply_form_review(
    conn: &Connection,
    form_id: i64,
    doctor_email: &str,
    status: FormStatus,
) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE medical_forms SET doctor_email = ?1, status = ?2
         WHERE id = ?3 AND status = 'pending'",
        params![doctor_email, status.as_str(), form_id],
    )?;
    Ok(updated)
}

fn collect_forms(
    rows: impl Iterator<Item = Result<Result<MedicalForm, DatabaseError>, rusqlite::Error>>,
) -> Result<Vec<MedicalForm>, DatabaseError> {
    let mut forms = Vec::new();
    for row in rows {
        forms.push(row??);
    }
    Ok(forms)
}
