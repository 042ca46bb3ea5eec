use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::PrescriptionStatus;

/// Doctor-issued prescription. Status transitions freely among
/// active/completed/cancelled, but only the owning patient or the
/// issuing doctor may change it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: i64,
    pub patient_email: String,
    pub doctor_email: String,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: PrescriptionStatus,
}

/// Fields supplied by the issuing doctor at creation time.
#[derive(Debug, Clone)]
pub struct NewPrescription {
    pub patient_email: String,
    pub doctor_email: String,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: Option<String>,
}
