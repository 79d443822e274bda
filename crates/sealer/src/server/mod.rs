//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Inject shared application state (`AppState`) into handlers.
//! - Translate round-trip outcomes into a redirect or an error response.

pub mod handlers;
pub mod page;
pub mod router;
pub mod state;
