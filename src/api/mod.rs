//! HTTP layer.
//!
//! Exposes the analysis pipeline and the admin dashboard over JSON
//! endpoints under `/api/`, and serves the frontend's static files.

pub mod auth;
pub mod endpoints;
pub mod error;
pub mod router;
pub mod types;

pub use router::build_router;
pub use types::AppState;
