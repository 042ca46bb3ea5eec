use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{Account, Role};

pub fn insert_account(
    conn: &Connection,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO accounts (email, password_hash, role) VALUES (?1, ?2, ?3)",
        params![email, password_hash, role.as_str()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_account_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Account>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, email, password_hash, role FROM accounts WHERE email = ?1",
            params![email],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((id, email, password_hash, role)) => Ok(Some(Account {
            id,
            email,
            password_hash,
            role: Role::from_str(&role)?,
        })),
        None => Ok(None),
    }
}

pub fn email_exists(conn: &Connection, email: &str) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM accounts WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
