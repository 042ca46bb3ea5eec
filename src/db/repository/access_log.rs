use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection};

use crate::db::DatabaseError;
use crate::models::AccessLogEntry;

/// Append one access entry. There is deliberately no update or delete
/// counterpart; the table is append-only.
pub fn insert_access_entry(
    conn: &Connection,
    record_id: i64,
    accessed_by: &str,
    access_time: DateTime<Utc>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO access_log (record_id, accessed_by, access_time) VALUES (?1, ?2, ?3)",
        params![record_id, accessed_by, access_time],
    )?;
    Ok(conn.last_insert_rowid())
}

/// All entries for the given record set, most recent first. The ordering
/// is for display; completeness is what matters for the audit trail.
pub fn get_access_entries_for_records(
    conn: &Connection,
    record_ids: &[i64],
) -> Result<Vec<AccessLogEntry>, DatabaseError> {
    if record_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; record_ids.len()].join(",");
    let sql = format!(
        "SELECT id, record_id, accessed_by, access_time FROM access_log
         WHERE record_id IN ({placeholders}) ORDER BY access_time DESC, id DESC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(record_ids.iter()), |row| {
        Ok(AccessLogEntry {
            id: row.get(0)?,
            record_id: row.get(1)?,
            accessed_by: row.get(2)?,
            access_time: row.get(3)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Number of entries referencing a single record (used by tests and
/// consistency checks).
pub fn count_access_entries(conn: &Connection, record_id: i64) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM access_log WHERE record_id = ?1",
        params![record_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
