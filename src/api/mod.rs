//! HTTP Inspection API
//! Read-only view of the lookup pipeline and bot counters

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::{AppState, SharedChain};
pub use routes::{create_router, serve};
pub use types::*;
