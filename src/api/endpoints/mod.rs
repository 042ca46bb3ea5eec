//! API endpoint handlers, one module per surface.

pub mod auth;
pub mod health;
pub mod ledger;
pub mod medical;
pub mod storage;
