//! Runtime API backing `window.htapp`.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::state::AppState;

/// Request body for POST /api/log.
#[derive(Deserialize)]
pub(crate) struct LogRequest {
    message: String,
}

/// Response for POST /api/log.
#[derive(Serialize)]
pub(crate) struct StatusResponse {
    status: &'static str,
}

/// Request body for POST /api/core/convertFileSrc.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConvertFileSrcRequest {
    file_path: String,
}

/// Handle POST /api/log.
///
/// Writes a message from the page to the server log.
pub(crate) async fn log_message(
    payload: Result<Json<LogRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ServerError> {
    let Json(request) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    tracing::info!(target: "htapp::page", "{}", request.message);
    Ok(Json(StatusResponse { status: "ok" }))
}

/// Handle POST /api/core/convertFileSrc.
pub(crate) async fn convert_file_src(
    payload: Result<Json<ConvertFileSrcRequest>, JsonRejection>,
) -> Result<Json<String>, ServerError> {
    let Json(request) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    Ok(Json(htapp_html::convert_file_src(&request.file_path)))
}

/// Handle GET /api/core/getArgs.
pub(crate) async fn get_args(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.app_args.clone())
}
