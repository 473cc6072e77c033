//! Die Mutation API Handlers

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde::Serialize;
use shared::models::{DeletedBundle, DieMutationRequest, DieMutationResponse, ReturnedBundlesPage};

use crate::core::ServerState;
use crate::services::DEFAULT_PAGE_LIMIT;
use crate::utils::AppResult;
use crate::utils::validation::canonical_uid;

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: DeletedBundle,
}

/// Lenient paging: invalid or zero limit falls back to the default, invalid
/// offset to 0
fn page_params(params: &HashMap<String, String>) -> (usize, usize) {
    let limit = params
        .get("limit")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_PAGE_LIMIT);
    let offset = params
        .get("offset")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    (limit, offset)
}

/// GET /api/die-mutation/tasks - RETURNED 捆包列表
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ReturnedBundlesPage>> {
    let (limit, offset) = page_params(&params);
    Ok(Json(state.lifecycle.list_returned(limit, offset)?))
}

/// POST /api/die-mutation/tasks - 批量报废
pub async fn mutate(
    State(state): State<ServerState>,
    payload: Result<Json<DieMutationRequest>, JsonRejection>,
) -> AppResult<Json<DieMutationResponse>> {
    let Json(request) = payload?;
    Ok(Json(state.lifecycle.die_mutation_batch(request).await?))
}

/// DELETE /api/die-mutation/tasks/:uid - 永久删除
pub async fn delete(
    State(state): State<ServerState>,
    Path(uid): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    let deleted = state.lifecycle.permanent_delete(&canonical_uid(&uid))?;
    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_page_params_are_lenient() {
        assert_eq!(page_params(&params(&[])), (DEFAULT_PAGE_LIMIT, 0));
        assert_eq!(page_params(&params(&[("limit", "20"), ("offset", "40")])), (20, 40));
        assert_eq!(page_params(&params(&[("limit", "0")])), (DEFAULT_PAGE_LIMIT, 0));
        assert_eq!(
            page_params(&params(&[("limit", "abc"), ("offset", "-3")])),
            (DEFAULT_PAGE_LIMIT, 0)
        );
    }
}
