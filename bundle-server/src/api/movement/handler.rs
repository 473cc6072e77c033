//! Move API Handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use shared::models::{MoveRequest, MoveResponse};

use crate::core::ServerState;
use crate::utils::AppResult;

/// POST /api/move - 批量出库
///
/// `moveData` 为逗号分隔的流水号，`ref` 为出库单号
pub async fn move_bundles(
    State(state): State<ServerState>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> AppResult<Json<MoveResponse>> {
    let Json(request) = payload?;
    let response = state
        .lifecycle
        .move_batch(request.move_data.as_deref(), request.reference.as_deref())
        .await?;
    Ok(Json(response))
}
