//! Conversion Gateway - transcode uploaded media to compact audio.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use conversion_gateway::{
    config::Config,
    server::{create_router, RouterConfig},
    storage::Workspace,
    transcode::FfmpegTranscoder,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Conversion Gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Upload dir: {}", config.upload_dir.display());
    info!("  Output dir: {}", config.output_dir.display());
    info!(
        "  Output: {} at {} kbps",
        config.output_format, config.audio_bitrate
    );
    info!("  Max upload: {} bytes", config.max_upload_bytes);
    info!("  Request timeout: {}s", config.request_timeout_secs);

    let transcoder = FfmpegTranscoder::new(&config.ffmpeg_path);

    info!("Checking transcoder...");
    match transcoder.probe().await {
        Ok(version) => info!("  {}", version),
        Err(e) => {
            error!("  Transcoder unavailable: {}", e);
            error!("  Install ffmpeg or point --ffmpeg-path at the binary");
            return ExitCode::FAILURE;
        }
    }

    let workspace = Workspace::new(&config.upload_dir, &config.output_dir);
    if let Err(e) = workspace.ensure_dirs().await {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    let router = create_router(transcoder, workspace, build_router_config(&config));

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on: http://{}", addr);
    info!(
        "  curl -H 'Authorization: Bearer <token>' -F file=@input.mp4 http://{}/convert -o out.{}",
        addr, config.output_format
    );

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "conversion_gateway=debug,tower_http=debug"
    } else {
        "conversion_gateway=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new(config.api_token_or_empty())
        .with_max_upload_bytes(config.max_upload_bytes)
        .with_request_timeout(config.request_timeout())
        .with_output_format(config.output_format)
        .with_audio_bitrate(config.audio_bitrate)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}
