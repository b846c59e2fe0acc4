//! Router configuration for the conversion gateway.
//!
//! # Route Structure
//!
//! ```text
//! /health     - Health check (public)
//! /convert    - Conversion endpoint (bearer token required)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use conversion_gateway::server::routes::{create_router, RouterConfig};
//! use conversion_gateway::storage::Workspace;
//! use conversion_gateway::transcode::FfmpegTranscoder;
//!
//! let config = RouterConfig::new("my-secret-token")
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(
//!     FfmpegTranscoder::default(),
//!     Workspace::new("uploads", "outputs"),
//!     config,
//! );
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::auth::{auth_middleware, BearerAuth};
use super::handlers::{convert_handler, health_handler, AppState};
use crate::config::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::storage::Workspace;
use crate::transcode::{OutputFormat, Transcoder, DEFAULT_AUDIO_BITRATE_KBPS};

/// Room for multipart boundaries and part headers on top of the file limit.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Bearer token required on /convert
    pub auth_token: String,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,

    /// Largest accepted upload in bytes
    pub max_upload_bytes: u64,

    /// Time budget for receiving, converting and starting the response
    pub request_timeout: Duration,

    /// Target container
    pub output_format: OutputFormat,

    /// Target audio bitrate in kbps
    pub audio_bitrate_kbps: u32,
}

impl RouterConfig {
    /// Create a new router configuration with the given bearer token.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Tracing is enabled
    /// - Uploads are limited to 100 MiB
    /// - Requests time out after 5 minutes
    /// - Output is 64 kbps WebM audio
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            cors_origins: None,
            enable_tracing: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            output_format: OutputFormat::default(),
            audio_bitrate_kbps: DEFAULT_AUDIO_BITRATE_KBPS,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_audio_bitrate(mut self, kbps: u32) -> Self {
        self.audio_bitrate_kbps = kbps;
        self
    }

    /// Body limit handed to axum: the file limit plus multipart framing.
    fn body_limit(&self) -> usize {
        usize::try_from(self.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES))
            .unwrap_or(usize::MAX)
    }
}

impl std::fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterConfig")
            .field("cors_origins", &self.cors_origins)
            .field("enable_tracing", &self.enable_tracing)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("request_timeout", &self.request_timeout)
            .field("output_format", &self.output_format)
            .field("audio_bitrate_kbps", &self.audio_bitrate_kbps)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// This function builds the complete Axum router with:
/// - Public routes (health check)
/// - The bearer-protected conversion route with its body limit
/// - Request timeout
/// - CORS configuration
/// - Request tracing (optional)
pub fn create_router<T>(transcoder: T, workspace: Workspace, config: RouterConfig) -> Router
where
    T: Transcoder + 'static,
{
    let app_state = AppState::new(transcoder, workspace)
        .with_output_format(config.output_format)
        .with_audio_bitrate(config.audio_bitrate_kbps)
        .with_max_upload_bytes(config.max_upload_bytes);

    let auth = BearerAuth::new(&config.auth_token);
    let cors = build_cors_layer(&config);

    // route_layer so auth runs only for matched routes and before the body is read
    let convert_routes = Router::new()
        .route("/convert", post(convert_handler::<T>))
        .route_layer(middleware::from_fn_with_state(auth, auth_middleware))
        .layer(DefaultBodyLimit::max(config.body_limit()))
        .with_state(app_state);

    let public_routes = Router::new().route("/health", get(health_handler));

    let router = Router::new()
        .merge(convert_routes)
        .merge(public_routes)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers([http::header::CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
