//! Repository layer — entity-scoped database operations.
//!
//! Free functions over `&Connection`, split into one module per entity.
//! All public functions are re-exported here.

mod access_log;
mod account;
mod medical_form;
mod prescription;
mod record;

pub use access_log::*;
pub use account::*;
pub use medical_form::*;
pub use prescription::*;
pub use record::*;

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rusqlite::Connection;

    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn seed_record(conn: &Connection, patient: &str, filename: &str) -> i64 {
        let key = format!("{patient}/{filename}");
        upsert_record(conn, patient, &key, &format!("/tmp/{key}"), Utc::now()).unwrap()
    }

    // ── accounts ────────────────────────────────────────────

    #[test]
    fn account_insert_and_lookup() {
        let conn = test_db();
        insert_account(&conn, "a@x.com", "hash", Role::Patient).unwrap();

        let account = get_account_by_email(&conn, "a@x.com").unwrap().unwrap();
        assert_eq!(account.email, "a@x.com");
        assert_eq!(account.role, Role::Patient);
        assert!(get_account_by_email(&conn, "b@x.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_violates_constraint() {
        let conn = test_db();
        insert_account(&conn, "a@x.com", "hash", Role::Patient).unwrap();
        let result = insert_account(&conn, "a@x.com", "hash2", Role::Doctor);
        assert!(result.is_err());
        assert!(email_exists(&conn, "a@x.com").unwrap());
    }

    // ── records ─────────────────────────────────────────────

    #[test]
    fn record_upsert_overwrites_same_key() {
        let conn = test_db();
        let first = seed_record(&conn, "a@x.com", "report.pdf");
        let second = seed_record(&conn, "a@x.com", "report.pdf");

        // Same storage key resolves to the same row, not a duplicate.
        assert_eq!(first, second);
        assert_eq!(get_records_by_patient(&conn, "a@x.com").unwrap().len(), 1);
    }

    #[test]
    fn record_lookup_by_key() {
        let conn = test_db();
        seed_record(&conn, "a@x.com", "report.pdf");

        let record = get_record_by_key(&conn, "a@x.com/report.pdf").unwrap().unwrap();
        assert_eq!(record.patient_email, "a@x.com");
        assert!(get_record_by_key(&conn, "a@x.com/missing.pdf").unwrap().is_none());
    }

    #[test]
    fn records_listed_per_patient_and_globally() {
        let conn = test_db();
        seed_record(&conn, "a@x.com", "one.pdf");
        seed_record(&conn, "a@x.com", "two.txt");
        seed_record(&conn, "b@x.com", "other.txt");

        assert_eq!(get_records_by_patient(&conn, "a@x.com").unwrap().len(), 2);
        assert_eq!(get_records_by_patient(&conn, "b@x.com").unwrap().len(), 1);
        assert_eq!(get_all_records(&conn).unwrap().len(), 3);
    }

    // ── access log ──────────────────────────────────────────

    #[test]
    fn access_entries_queried_per_record_set() {
        let conn = test_db();
        let r1 = seed_record(&conn, "a@x.com", "one.pdf");
        let r2 = seed_record(&conn, "a@x.com", "two.txt");
        let other = seed_record(&conn, "b@x.com", "other.txt");

        insert_access_entry(&conn, r1, "d@y.com", Utc::now()).unwrap();
        insert_access_entry(&conn, r2, "a@x.com", Utc::now()).unwrap();
        insert_access_entry(&conn, other, "d@y.com", Utc::now()).unwrap();

        let entries = get_access_entries_for_records(&conn, &[r1, r2]).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.record_id == r1 || e.record_id == r2));
    }

    #[test]
    fn access_entries_ordered_most_recent_first() {
        let conn = test_db();
        let r1 = seed_record(&conn, "a@x.com", "one.pdf");

        insert_access_entry(&conn, r1, "first@x.com", Utc::now()).unwrap();
        insert_access_entry(&conn, r1, "second@x.com", Utc::now()).unwrap();

        let entries = get_access_entries_for_records(&conn, &[r1]).unwrap();
        assert_eq!(entries[0].accessed_by, "second@x.com");
        assert_eq!(entries[1].accessed_by, "first@x.com");
    }

    #[test]
    fn empty_record_set_yields_no_entries() {
        let conn = test_db();
        assert!(get_access_entries_for_records(&conn, &[]).unwrap().is_empty());
    }

    // ── medical forms ───────────────────────────────────────

    #[test]
    fn form_insert_and_get() {
        let conn = test_db();
        let id = insert_form(
            &conn,
            "a@x.com",
            FormType::Vitals,
            &serde_json::json!({"bp": "120/80"}),
            Utc::now(),
        )
        .unwrap();

        let form = get_form(&conn, id).unwrap().unwrap();
        assert_eq!(form.status, FormStatus::Pending);
        assert_eq!(form.form_type, FormType::Vitals);
        assert_eq!(form.form_data["bp"], "120/80");
        assert!(form.doctor_email.is_none());
    }

    #[test]
    fn form_review_binds_doctor_once() {
        let conn = test_db();
        let id = insert_form(&conn, "a@x.com", FormType::Symptoms, &serde_json::json!({}), Utc::now())
            .unwrap();

        let updated = apply_form_review(&conn, id, "d@y.com", FormStatus::Reviewed).unwrap();
        assert_eq!(updated, 1);

        // Second review attempt matches no pending row.
        let updated = apply_form_review(&conn, id, "d2@y.com", FormStatus::Approved).unwrap();
        assert_eq!(updated, 0);

        let form = get_form(&conn, id).unwrap().unwrap();
        assert_eq!(form.status, FormStatus::Reviewed);
        assert_eq!(form.doctor_email.as_deref(), Some("d@y.com"));
    }

    #[test]
    fn doctor_form_listing_includes_pending_and_own_reviews() {
        let conn = test_db();
        let pending =
            insert_form(&conn, "a@x.com", FormType::Vitals, &serde_json::json!({}), Utc::now()).unwrap();
        let mine =
            insert_form(&conn, "b@x.com", FormType::Symptoms, &serde_json::json!({}), Utc::now()).unwrap();
        let theirs =
            insert_form(&conn, "c@x.com", FormType::Vitals, &serde_json::json!({}), Utc::now()).unwrap();
        apply_form_review(&conn, mine, "d@y.com", FormStatus::Approved).unwrap();
        apply_form_review(&conn, theirs, "other@y.com", FormStatus::Reviewed).unwrap();

        let visible = list_forms_for_doctor(&conn, "d@y.com").unwrap();
        let ids: Vec<i64> = visible.iter().map(|f| f.id).collect();
        assert!(ids.contains(&pending));
        assert!(ids.contains(&mine));
        assert!(!ids.contains(&theirs));
    }

    #[test]
    fn patient_form_listing_scoped_to_owner() {
        let conn = test_db();
        insert_form(&conn, "a@x.com", FormType::Vitals, &serde_json::json!({}), Utc::now()).unwrap();
        insert_form(&conn, "b@x.com", FormType::Vitals, &serde_json::json!({}), Utc::now()).unwrap();

        let forms = list_forms_for_patient(&conn, "a@x.com").unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].patient_email, "a@x.com");
    }

    // ── prescriptions ───────────────────────────────────────

    fn sample_prescription(patient: &str, doctor: &str) -> NewPrescription {
        NewPrescription {
            patient_email: patient.to_string(),
            doctor_email: doctor.to_string(),
            medication_name: "Amoxicillin".to_string(),
            dosage: "500mg".to_string(),
            frequency: "3x daily".to_string(),
            duration: "7 days".to_string(),
            instructions: Some("Take with food".to_string()),
        }
    }

    #[test]
    fn prescription_insert_starts_active() {
        let conn = test_db();
        let id = insert_prescription(&conn, &sample_prescription("a@x.com", "d@y.com"), Utc::now())
            .unwrap();

        let rx = get_prescription(&conn, id).unwrap().unwrap();
        assert_eq!(rx.status, PrescriptionStatus::Active);
        assert_eq!(rx.doctor_email, "d@y.com");
        assert_eq!(rx.instructions.as_deref(), Some("Take with food"));
    }

    #[test]
    fn prescription_status_updates_freely() {
        let conn = test_db();
        let id = insert_prescription(&conn, &sample_prescription("a@x.com", "d@y.com"), Utc::now())
            .unwrap();

        update_prescription_status(&conn, id, PrescriptionStatus::Completed).unwrap();
        assert_eq!(
            get_prescription(&conn, id).unwrap().unwrap().status,
            PrescriptionStatus::Completed
        );

        // No forward-only constraint, unlike forms.
        update_prescription_status(&conn, id, PrescriptionStatus::Active).unwrap();
        assert_eq!(
            get_prescription(&conn, id).unwrap().unwrap().status,
            PrescriptionStatus::Active
        );
    }

    #[test]
    fn prescriptions_listed_by_patient_and_doctor() {
        let conn = test_db();
        insert_prescription(&conn, &sample_prescription("a@x.com", "d@y.com"), Utc::now()).unwrap();
        insert_prescription(&conn, &sample_prescription("b@x.com", "d@y.com"), Utc::now()).unwrap();

        assert_eq!(list_prescriptions_for_patient(&conn, "a@x.com").unwrap().len(), 1);
        assert_eq!(list_prescriptions_for_doctor(&conn, "d@y.com").unwrap().len(), 2);
        assert!(list_prescriptions_for_patient(&conn, "c@x.com").unwrap().is_empty());
    }
}
