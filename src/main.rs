//! Countdown Timer - a drift-correcting countdown served over HTTP
//!
//! This is the main entry point for the countdown-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use countdown_timer::{
    config::Config,
    state::AppState,
    api::create_router,
    services::ScrollSource,
    tasks::{event_log_task, frame_driver_task},
    utils::{shutdown_signal, visibility_signal_task},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-timer server v{}", env!("CARGO_PKG_VERSION"));
    let options = config.countdown_options()?;
    info!("Configuration: host={}, port={}, duration={}ms, interval={}ms, frame={}ms",
          config.host, config.port, options.duration_ms, options.interval_ms, config.frame_ms);

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        options,
        config.format.formatter(),
        config.frame_period(),
    )?);

    // Start the background tasks before auto-start requests the first frame
    let log_state = Arc::clone(&state);
    tokio::spawn(async move {
        event_log_task(log_state).await;
    });
    tokio::spawn(frame_driver_task(
        state.countdown.clone(),
        state.frames.clone(),
        state.frame_period,
    ));
    tokio::spawn(visibility_signal_task(Arc::clone(&state)));

    // Bind host listeners for the lifetime of the server
    let attachment = state
        .countdown
        .attach(Arc::clone(&state.page) as Arc<dyn ScrollSource>)?;

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start               - Start the countdown");
    info!("  POST /stop                - Abort the countdown");
    info!("  POST /pause               - Pause the countdown");
    info!("  POST /continue            - Resume a paused countdown");
    info!("  PUT  /duration            - Replace the duration");
    info!("  POST /visibility/hidden   - Report the surface hidden");
    info!("  POST /visibility/visible  - Report the surface visible");
    info!("  POST /scroll              - Report a finished scroll");
    info!("  GET  /status              - Check the countdown");
    info!("  GET  /health              - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    attachment.detach();
    info!("Server shutdown complete");
    Ok(())
}
