//! HTTP server layer for the conversion gateway.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │                 POST /convert    GET /health                    │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    auth     │  │        routes           │  │
//! │  │ (convert)   │  │  (bearer)   │  │ (limits, timeout, CORS) │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{auth_middleware, AuthError, BearerAuth};
pub use handlers::{convert_handler, health_handler, AppState, ErrorResponse, HealthResponse};
pub use routes::{create_router, RouterConfig};
