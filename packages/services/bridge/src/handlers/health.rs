//! 상태 확인 / 카탈로그 조회

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// `GET /health`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Debug, Serialize)]
pub struct TablesResponse {
    pub data: Vec<String>,
}

/// `GET /tables` (이름순)
pub async fn list_tables(State(state): State<Arc<AppState>>) -> Json<TablesResponse> {
    let data = state
        .catalog
        .table_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(TablesResponse { data })
}
