use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::{NewPrescription, Prescription, PrescriptionStatus};

const PRESCRIPTION_COLUMNS: &str = "id, patient_email, doctor_email, medication_name, dosage, \
     frequency, duration, instructions, created_at, status";

fn prescription_from_row(row: &Row<'_>) -> Result<Prescription, DatabaseError> {
    let status: String = row.get(9)?;
    Ok(Prescription {
        id: row.get(0)?,
        patient_email: row.get(1)?,
        doctor_email: row.get(2)?,
        medication_name: row.get(3)?,
        dosage: row.get(4)?,
        frequency: row.get(5)?,
        duration: row.get(6)?,
        instructions: row.get(7)?,
        created_at: row.get(8)?,
        status: PrescriptionStatus::from_str(&status)?,
    })
}

pub fn insert_prescription(
    conn: &Connection,
    rx: &NewPrescription,
    created_at: DateTime<Utc>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (patient_email, doctor_email, medication_name, dosage,
         frequency, duration, instructions, created_at, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'active')",
        params![
            rx.patient_email,
            rx.doctor_email,
            rx.medication_name,
            rx.dosage,
            rx.frequency,
            rx.duration,
            rx.instructions,
            created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_prescription(
    conn: &Connection,
    prescription_id: i64,
) -> Result<Option<Prescription>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions WHERE id = ?1"),
            params![prescription_id],
            |row| Ok(prescription_from_row(row)),
        )
        .optional()?;
    row.transpose()
}

pub fn list_prescriptions_for_patient(
    conn: &Connection,
    patient_email: &str,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions
         WHERE patient_email = ?1 ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![patient_email], |row| Ok(prescription_from_row(row)))?;
    collect_prescriptions(rows)
}

pub fn list_prescriptions_for_doctor(
    conn: &Connection,
    doctor_email: &str,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions
         WHERE doctor_email = ?1 ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![doctor_email], |row| Ok(prescription_from_row(row)))?;
    collect_prescriptions(rows)
}

pub fn update_prescription_status(
    conn: &Connection,
    prescription_id: i64,
    status: PrescriptionStatus,
) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE prescriptions SET status = ?1 WHERE id = ?2",
        params![status.as_str(), prescription_id],
    )?;
    Ok(updated)
}

fn collect_prescriptions(
    rows: impl Iterator<Item = Result<Result<Prescription, DatabaseError>, rusqlite::Error>>,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut prescriptions = Vec::new();
    for row in rows {
        prescriptions.push(row??);
    }
    Ok(prescriptions)
}
