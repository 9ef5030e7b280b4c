//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    error::CountdownError,
    services::Visibility,
    state::{AppState, CountdownSnapshot},
};
use super::responses::{ApiResponse, DurationRequest, HealthResponse, StatusResponse};

type ApiResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

/// Turn an operation outcome into the endpoint response
fn respond(action: &str, result: Result<CountdownSnapshot, CountdownError>) -> ApiResult {
    match result {
        Ok(countdown) => {
            info!("{} endpoint called - countdown is {:?}", action, countdown.phase);
            Ok(Json(ApiResponse::ok(format!("{} applied", action), countdown)))
        }
        Err(e) if e.is_validation() => {
            warn!("Rejected {} request: {}", action, e);
            Err((StatusCode::BAD_REQUEST, Json(ApiResponse::error(e.to_string()))))
        }
        Err(e) => {
            error!("Failed to apply {}: {}", action, e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::error(e.to_string()))))
        }
    }
}

/// Handle POST /start - Start the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond("start", state.start())
}

/// Handle POST /stop - Abort the countdown
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond("stop", state.stop())
}

/// Handle POST /pause - Pause the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond("pause", state.pause())
}

/// Handle POST /continue - Resume a paused countdown
pub async fn continue_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond("continue", state.resume())
}

/// Handle PUT /duration - Replace the countdown duration
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DurationRequest>,
) -> ApiResult {
    respond("duration", state.set_duration(request.duration_ms))
}

/// Handle POST /visibility/hidden - Report the host surface as hidden
pub async fn hidden_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond("visibility-hidden", state.set_visibility(Visibility::Hidden))
}

/// Handle POST /visibility/visible - Report the host surface as visible
pub async fn visible_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond("visibility-visible", state.set_visibility(Visibility::Visible))
}

/// Handle POST /scroll - Report a finished scroll gesture
pub async fn scroll_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    respond("scroll", state.scroll_ended())
}

/// Handle GET /status - Return current countdown status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let countdown = match state.get_snapshot() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to get countdown snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        countdown,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
