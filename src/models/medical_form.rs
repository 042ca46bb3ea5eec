use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{FormStatus, FormType};

/// Patient-submitted structured form.
///
/// `form_data` is an opaque JSON payload stored verbatim. Status moves
/// from `pending` to `reviewed` or `approved` exactly once; the reviewing
/// doctor is bound at that moment and never reassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalForm {
    pub id: i64,
    pub patient_email: String,
    pub form_type: FormType,
    pub form_data: serde_json::Value,
    pub submitted_at: DateTime<Utc>,
    pub doctor_email: Option<String>,
    pub status: FormStatus,
}
