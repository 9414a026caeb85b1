//! Axum-based HTTP server for the folio gateway.
//!
//! # Components
//!
//! - `handlers`: The prompt endpoint plus diagnostic endpoints (health, info, test, metrics).
//! - `middleware`: Request ID tracking and CORS.
//! - `routes`: The main router configuration that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use handlers::{PromptRequest, PromptResponse};
pub use routes::{create_router, AppState};
