//! HTTP surface.
//!
//! `api_router()` returns a composable `Router` with all endpoints
//! nested under `/api/`, protected routes behind the bearer-token
//! middleware. Liveness endpoints live at the root.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod types;

pub use router::api_router;
pub use types::{ApiContext, AuthContext};
