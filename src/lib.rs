//! Clinivault — healthcare record-sharing backend.
//!
//! Patients upload documents, doctors review them, and an append-only
//! access log records who viewed what. Read and download events are
//! additionally mirrored to an external ledger on a best-effort basis.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod ledger;
pub mod models;
pub mod state;
pub mod storage;
