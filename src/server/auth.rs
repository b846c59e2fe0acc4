//! Bearer token authentication.
//!
//! Every conversion request must carry `Authorization: Bearer <token>` where the
//! token equals the configured shared secret. Rejection happens before the body
//! is read, so an unauthenticated request never touches the filesystem or the
//! transcoder.
//!
//! # Example
//!
//! ```rust
//! use conversion_gateway::server::auth::BearerAuth;
//!
//! let auth = BearerAuth::new("my-secret-token");
//! assert!(auth.verify_header(Some("Bearer my-secret-token")).is_ok());
//! assert!(auth.verify_header(Some("Bearer wrong")).is_err());
//! assert!(auth.verify_header(None).is_err());
//! ```

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use super::handlers::ErrorResponse;

/// Scheme prefix expected in the `Authorization` header.
const BEARER_PREFIX: &str = "Bearer ";

// =============================================================================
// Types
// =============================================================================

/// Authentication error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Header absent, not UTF-8, or not using the Bearer scheme
    MissingOrMalformed,

    /// Token present but not the configured one
    InvalidToken,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingOrMalformed => {
                write!(f, "Unauthorized: token ausente ou inválido")
            }
            AuthError::InvalidToken => write!(f, "Unauthorized: token inválido"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::InvalidToken => warn!(status = 401, "Authentication failed: {}", self),
            AuthError::MissingOrMalformed => {
                debug!(status = 401, "Authentication failed: {}", self)
            }
        }

        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(self.to_string())),
        )
            .into_response()
    }
}

// =============================================================================
// Bearer Authentication
// =============================================================================

/// Shared-secret bearer token verifier.
#[derive(Clone)]
pub struct BearerAuth {
    token: Vec<u8>,
}

impl BearerAuth {
    /// Create a verifier for the given token.
    pub fn new(token: impl AsRef<[u8]>) -> Self {
        Self {
            token: token.as_ref().to_vec(),
        }
    }

    /// Verify a raw `Authorization` header value.
    ///
    /// The token is everything after `Bearer `, with surrounding whitespace
    /// trimmed, and is compared in constant time.
    pub fn verify_header(&self, header: Option<&str>) -> Result<(), AuthError> {
        let token = header
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .ok_or(AuthError::MissingOrMalformed)?
            .trim();

        if token.as_bytes().ct_eq(&self.token).into() {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

impl std::fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuth").finish_non_exhaustive()
    }
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// Axum middleware rejecting requests without the configured bearer token.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware, routing::post};
/// use conversion_gateway::server::auth::{BearerAuth, auth_middleware};
///
/// let auth = BearerAuth::new("secret-token");
/// let app = Router::new()
///     .route("/convert", post(convert_handler))
///     .route_layer(middleware::from_fn_with_state(auth, auth_middleware));
/// ```
pub async fn auth_middleware(
    State(auth): State<BearerAuth>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    auth.verify_header(header)?;

    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
