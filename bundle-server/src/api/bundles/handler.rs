//! Bundle API Handlers

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use shared::models::{Bundle, BundleDetail, BundleInput, NumberField};

use crate::core::ServerState;
use crate::printing::{JobId, PrintJobStatus, PrintResponse, parse_layout};
use crate::utils::validation::canonical_uid;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentNumberResponse {
    pub current_number: String,
}

#[derive(Debug, Deserialize)]
pub struct SetNumberRequest {
    pub number: Option<NumberField>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetNumberResponse {
    pub success: bool,
    pub new_number: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentsResponse {
    pub recent_bundles: Vec<Bundle>,
}

/// POST /api/bundle/create - 创建捆包
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<BundleInput>, JsonRejection>,
) -> AppResult<Json<Bundle>> {
    let Json(input) = payload?;
    let bundle = state.lifecycle.create(&input)?;
    Ok(Json(bundle))
}

/// PUT /api/bundle/modify/:uid - 修改捆包
pub async fn modify(
    State(state): State<ServerState>,
    Path(uid): Path<String>,
    payload: Result<Json<BundleInput>, JsonRejection>,
) -> AppResult<Json<Bundle>> {
    let Json(input) = payload?;
    let bundle = state.lifecycle.modify(&canonical_uid(&uid), &input)?;
    Ok(Json(bundle))
}

/// GET /api/bundle/current-number - 当前计数 (不存在时为空字符串)
pub async fn current_number(State(state): State<ServerState>) -> Json<CurrentNumberResponse> {
    Json(CurrentNumberResponse {
        current_number: state.lifecycle.counter().read(),
    })
}

/// POST /api/bundle/set-number - 覆盖计数
pub async fn set_number(
    State(state): State<ServerState>,
    payload: Result<Json<SetNumberRequest>, JsonRejection>,
) -> AppResult<Json<SetNumberResponse>> {
    let Json(request) = payload?;
    let raw = match request.number {
        Some(NumberField::Text(s)) => s,
        Some(NumberField::Number(n)) if n.fract() == 0.0 => format!("{n:.0}"),
        _ => return Err(AppError::validation("Invalid bundle number")),
    };
    let new_number = state.lifecycle.set_counter(&raw)?;
    Ok(Json(SetNumberResponse {
        success: true,
        new_number,
    }))
}

/// GET /api/bundle/recents - 在库捆包 (按创建时间倒序)
pub async fn recents(State(state): State<ServerState>) -> AppResult<Json<RecentsResponse>> {
    Ok(Json(RecentsResponse {
        recent_bundles: state.lifecycle.recents()?,
    }))
}

/// GET /api/bundle/:uid - 捆包详情
pub async fn get_by_uid(
    State(state): State<ServerState>,
    Path(uid): Path<String>,
) -> AppResult<Json<BundleDetail>> {
    Ok(Json(state.lifecycle.detail(&canonical_uid(&uid))?))
}

/// GET /api/bundle/print/:layout/:uid - 打印标签
pub async fn print(
    State(state): State<ServerState>,
    Path((layout, uid)): Path<(String, String)>,
) -> AppResult<Json<PrintResponse>> {
    let layout = parse_layout_param(&layout)?;
    let response = state.printing.print(&canonical_uid(&uid), layout).await?;
    Ok(Json(response))
}

/// GET /api/bundle/print/jobs/:id - 打印任务状态
pub async fn print_job(
    State(state): State<ServerState>,
    Path(id): Path<JobId>,
) -> AppResult<Json<PrintJobStatus>> {
    Ok(Json(state.printing.job_status(id)?))
}

/// GET /api/bundle/:uid/label/:layout - 标签 PNG (按需渲染并写入缓存)
pub async fn label(
    State(state): State<ServerState>,
    Path((uid, layout)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let layout = parse_layout_param(&layout)?;
    let uid = canonical_uid(&uid);
    let rendered = state
        .printing
        .render(&uid, layout)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No label for bundle: {uid}")))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], rendered.png))
}

fn parse_layout_param(raw: &str) -> AppResult<bundle_printer::LabelLayout> {
    let code = raw
        .trim()
        .parse::<u8>()
        .map_err(|_| AppError::validation(format!("Unknown label layout: {raw}")))?;
    parse_layout(code)
}
