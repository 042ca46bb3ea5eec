//! Registration and login.

use std::str::FromStr;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::password;
use crate::db::repository;
use crate::models::Role;
use crate::storage::valid_email_segment;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub message: &'static str,
}

/// `POST /api/auth/register`
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = payload
        .email
        .filter(|e| valid_email_segment(e))
        .ok_or_else(|| ApiError::BadRequest("A valid email is required".into()))?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("A password is required".into()))?;
    let role = payload
        .role
        .as_deref()
        .and_then(|r| Role::from_str(r).ok())
        .ok_or_else(|| ApiError::BadRequest("Role must be 'patient' or 'doctor'".into()))?;

    let conn = ctx.state.open_db()?;
    if repository::email_exists(&conn, &email)? {
        return Err(ApiError::BadRequest("User already exists".into()));
    }

    let hash = password::hash_password(&password);
    repository::insert_account(&conn, &email, &hash, role)?;
    tracing::info!(%email, role = role.as_str(), "account registered");

    Ok(Json(TokenResponse {
        token: ctx.state.tokens.issue(&email, role),
        message: "Registration successful",
    }))
}

/// `POST /api/auth/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = payload
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Email and password are required".into()))?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Email and password are required".into()))?;

    let conn = ctx.state.open_db()?;
    let account = repository::get_account_by_email(&conn, &email)?
        .ok_or(ApiError::InvalidCredentials)?;

    if !password::verify_password(&password, &account.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    Ok(Json(TokenResponse {
        token: ctx.state.tokens.issue(&account.email, account.role),
        message: "Login successful",
    }))
}
