//! 테이블 CRUD 핸들러
//!
//! `/{table}?{query}` 요청을 파싱해 SQL을 만들고 실행합니다.
//! 요청 → `BuiltStatement` 변환(plan_*)은 DB 없이 동작하는 순수 함수입니다.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use tbl_core::Catalog;
use tbl_sql::{
    row_from_json, rows_from_json, BuiltStatement, DeleteBuilder, InsertBuilder, Query,
    QueryParser, SelectBuilder, UpdateBuilder,
};

use crate::error::{BridgeError, Result};
use crate::executor;
use crate::state::AppState;

/// 성공 응답 `{"data": ...}`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// 변경된 행의 id 목록
#[derive(Debug, Serialize)]
pub struct Ids {
    pub ids: Vec<Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /{table}`
pub async fn select_rows(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    RawQuery(raw): RawQuery,
) -> Result<Json<DataResponse<Vec<Value>>>> {
    let statement = plan_select(&state.catalog, &table, raw.as_deref())?;
    let rows = executor::fetch_rows(&state.pool, &statement).await?;
    tracing::debug!(table = %table, rows = rows.len(), "select executed");
    Ok(Json(DataResponse { data: rows }))
}

/// `POST /{table}`
pub async fn insert_rows(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<DataResponse<Ids>>)> {
    let statement = plan_insert(&state.catalog, &table, parse_body(&body)?)?;
    let ids = executor::fetch_ids(&state.pool, &statement).await?;
    tracing::debug!(table = %table, rows = ids.len(), "insert executed");
    Ok((StatusCode::CREATED, Json(DataResponse { data: Ids { ids } })))
}

/// `PATCH /{table}`, `PUT /{table}`
pub async fn update_rows(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Result<Json<DataResponse<Ids>>> {
    let statement = plan_update(&state.catalog, &table, raw.as_deref(), parse_body(&body)?)?;
    let ids = executor::fetch_ids(&state.pool, &statement).await?;
    tracing::debug!(table = %table, rows = ids.len(), "update executed");
    Ok(Json(DataResponse { data: Ids { ids } }))
}

/// `DELETE /{table}`
pub async fn delete_rows(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    RawQuery(raw): RawQuery,
) -> Result<Json<DataResponse<Ids>>> {
    let statement = plan_delete(&state.catalog, &table, raw.as_deref())?;
    let ids = executor::fetch_ids(&state.pool, &statement).await?;
    tracing::debug!(table = %table, rows = ids.len(), "delete executed");
    Ok(Json(DataResponse { data: Ids { ids } }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Planning
// ─────────────────────────────────────────────────────────────────────────────

pub fn plan_select(catalog: &Catalog, table: &str, raw: Option<&str>) -> Result<BuiltStatement> {
    let query = parse_request(table, raw)?;
    Ok(SelectBuilder::new(catalog).build(&query)?)
}

/// 본문은 객체 하나 또는 객체 배열
pub fn plan_insert(catalog: &Catalog, table: &str, body: Value) -> Result<BuiltStatement> {
    let query = parse_request(table, None)?;
    let rows = rows_from_json(body)?;
    Ok(InsertBuilder::new(catalog).build(&query.table, &rows)?)
}

pub fn plan_update(
    catalog: &Catalog,
    table: &str,
    raw: Option<&str>,
    body: Value,
) -> Result<BuiltStatement> {
    let query = parse_request(table, raw)?;
    let data = row_from_json(body)?;
    Ok(UpdateBuilder::new(catalog).build(&query, &data)?)
}

pub fn plan_delete(catalog: &Catalog, table: &str, raw: Option<&str>) -> Result<BuiltStatement> {
    let query = parse_request(table, raw)?;
    Ok(DeleteBuilder::new(catalog).build(&query)?)
}

fn parse_request(table: &str, raw: Option<&str>) -> Result<Query> {
    let path = format!("/{}?{}", table, raw.unwrap_or(""));
    Ok(QueryParser::standard().parse_path(&path)?)
}

fn parse_body(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|e| BridgeError::BadRequest {
        message: format!("invalid JSON body: {}", e),
    })
}
