//! Shared types for the API layer.

use std::sync::Arc;

use crate::models::Role;
use crate::state::AppState;

/// Shared context for all routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub state: Arc<AppState>,
}

impl ApiContext {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

/// Verified caller identity, injected into request extensions by the
/// auth middleware. The `(email, role)` pair is the sole authority
/// source for authorization decisions downstream.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub email: String,
    pub role: Role,
}

impl AuthContext {
    pub fn is_doctor(&self) -> bool {
        self.role == Role::Doctor
    }
}
