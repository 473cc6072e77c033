//! Variant API Handlers

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Serialize;
use shared::models::{Variant, VariantSummary, VariantUpsert};

use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Serialize)]
pub struct VariantListResponse {
    pub variants: Vec<VariantSummary>,
}

/// GET /api/variant/all - 规格摘要列表
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<VariantListResponse>> {
    Ok(Json(VariantListResponse {
        variants: state.variants.list_summaries()?,
    }))
}

/// GET /api/variant/:s_no - 单个规格
pub async fn get_by_s_no(
    State(state): State<ServerState>,
    Path(s_no): Path<String>,
) -> AppResult<Json<Variant>> {
    Ok(Json(state.variants.get(&s_no)?))
}

/// PUT /api/variant - 导入或更新规格
pub async fn upsert(
    State(state): State<ServerState>,
    payload: Result<Json<VariantUpsert>, JsonRejection>,
) -> AppResult<Json<Variant>> {
    let Json(input) = payload?;
    Ok(Json(state.variants.upsert(input)?))
}
