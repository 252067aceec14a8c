use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{error, info};

use health_probe::config::Config;
use health_probe::health::{checks, CheckError, HandlerOptions, HealthHandler};

/// Connect timeout for TCP checks when HEALTH_CHECK_TIMEOUT is off.
const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(5);

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    health_probe::logging::init(&config.logging);

    info!("Starting health_probe {}...", health_probe::VERSION);
    config.log_summary();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut metadata = config.health.metadata.clone();
    metadata
        .entry("version".to_string())
        .or_insert_with(|| health_probe::PKG_VERSION.to_string());

    let handler = Arc::new(HealthHandler::new(HandlerOptions {
        metadata,
        paths: config.health.paths.clone(),
    }));

    // Not ready until the listener is bound
    let startup_complete = Arc::new(AtomicBool::new(false));
    let started = Arc::clone(&startup_complete);
    handler.add_readiness_check("startup_complete", move || -> Result<(), CheckError> {
        if started.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(CheckError::new("startup in progress"))
        }
    });

    let dial_timeout = config.health.check_timeout.unwrap_or(DEFAULT_DIAL_TIMEOUT);
    for (name, addr) in &config.health.tcp_checks {
        let check = checks::tcp_dial(addr.clone(), dial_timeout);
        match config.health.check_timeout {
            Some(limit) => handler.add_readiness_check(name.as_str(), checks::timeout(check, limit)),
            None => handler.add_readiness_check(name.as_str(), check),
        }
    }

    let listener = TcpListener::bind(config.server.listen_addr).await?;
    info!(
        "Health server listening on http://{} (live: {}, ready: {})",
        listener.local_addr()?,
        handler.paths().liveness,
        handler.paths().readiness
    );
    startup_complete.store(true, Ordering::Relaxed);

    // Handle shutdown gracefully
    tokio::select! {
        result = health_probe::server::serve(listener, handler) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
    }

    Ok(())
}
