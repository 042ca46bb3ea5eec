//! API router.
//!
//! Layout mirrors the HTTP surface: `/auth` is open, everything under
//! `/storage`, `/medical`, and `/ledger` requires a bearer token whose
//! claims drive all role/ownership checks in the handlers.

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::state::AppState;

/// Build the full application router.
pub fn api_router(state: Arc<AppState>) -> Router {
    let ctx = ApiContext::new(state);

    // The Extension layer sits outermost so the auth middleware can
    // reach the ApiContext before any handler runs.
    let protected = Router::new()
        .route("/storage/upload", post(endpoints::storage::upload))
        .route("/storage/list", get(endpoints::storage::list))
        .route("/storage/records", get(endpoints::storage::records))
        .route("/storage/download/*key", get(endpoints::storage::download))
        .route("/storage/preview/*key", get(endpoints::storage::preview))
        .route(
            "/storage/access-logs/:patient",
            get(endpoints::storage::access_logs),
        )
        .route(
            "/medical/forms",
            post(endpoints::medical::submit_form).get(endpoints::medical::list_forms),
        )
        .route(
            "/medical/forms/:id/review",
            post(endpoints::medical::review_form),
        )
        .route(
            "/medical/prescriptions",
            post(endpoints::medical::create_prescription)
                .get(endpoints::medical::list_prescriptions),
        )
        .route(
            "/medical/prescriptions/:id/status",
            put(endpoints::medical::update_prescription_status),
        )
        .route("/ledger/log-access", post(endpoints::ledger::log_access))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    // Open routes — registration, login, liveness.
    let open = Router::new()
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx);

    Router::new()
        .route("/", get(endpoints::health::check))
        .route("/health", get(endpoints::health::check))
        .nest("/api", open.merge(protected))
}
