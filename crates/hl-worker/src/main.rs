//! Highlights pipeline binary: one run per invocation.

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hl_worker::{archive_config_failure, LogTarget, PipelineConfig, PipelineOrchestrator};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider already installed");
    }

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            if let Some(target) = LogTarget::from_env() {
                let store = target.storage.open(&target.region).await;
                archive_config_failure(store.as_ref(), &target.bucket, &e).await;
            }
            std::process::exit(2);
        }
    };
    for warning in &config.warnings {
        warn!("{}", warning);
    }

    let pipeline = match PipelineOrchestrator::from_config(&config).await {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("Failed to build pipeline: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = config.run_context();
    info!(run_id = %ctx.run_id, "Starting hl-worker for {} on {}", ctx.league, ctx.date_str());

    let result = pipeline.run(&ctx).await;
    info!(run_id = %ctx.run_id, "Run finished: {}", result.summary());
}

/// Plain output by default, JSON when `LOG_FORMAT=json`. `RUST_LOG` wins over `LOG_LEVEL`.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let level = std::env::var("LOG_LEVEL")
        .map(|v| v.to_lowercase())
        .unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}
