use serde::{Deserialize, Serialize};

use super::enums::Role;

/// Registered user. Roles are immutable after creation and accounts
/// are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}
