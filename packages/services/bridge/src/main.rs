//! Tabula Bridge
//!
//! 카탈로그에 등록된 테이블을 `/{table}?{query}` REST 엔드포인트로 노출합니다.
//! 쿼리 문자열은 파라미터 바인딩된 SQL로 변환되어 Postgres에서 실행됩니다.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod config;
mod error;
mod executor;
mod handlers;
mod middleware;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tbl_bridge=debug,tbl_sql=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("Starting Bridge with config: {:?}", config);

    // 앱 상태 초기화 (카탈로그는 여기서 한 번만 구성)
    let state = AppState::new(&config).await?;
    let state = Arc::new(state);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Bridge listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 라우터 생성
fn create_router(state: Arc<AppState>) -> Router {
    use handlers::crud;

    Router::new()
        // Health check / catalog
        .route("/health", get(handlers::health::health_check))
        .route("/tables", get(handlers::health::list_tables))
        // Table CRUD
        .route(
            "/:table",
            get(crud::select_rows)
                .post(crud::insert_rows)
                .patch(crud::update_rows)
                .put(crud::update_rows)
                .delete(crud::delete_rows),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(from_fn(middleware::request_id))
        // State
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use tbl_core::schema::{Catalog, Column, ColumnType, Table};

    /// DB에 접속하지 않는 라우터 (실행 단계 전에 끝나는 요청만 테스트)
    fn test_router() -> Router {
        let config = Config {
            port: 0,
            database_url: "postgres://localhost/tabula_test".to_string(),
            db_schema: "public".to_string(),
            db_max_connections: 1,
            catalog_file: None,
        };
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(&config.database_url)
            .unwrap();
        let catalog = Catalog::from_tables(vec![
            Table::new(
                "authors",
                vec![
                    Column::new("id", ColumnType::Int),
                    Column::new("surname", ColumnType::String),
                ],
            ),
            Table::new("books", vec![Column::new("id", ColumnType::Int)]),
        ]);

        create_router(Arc::new(AppState::from_parts(config, catalog, pool)))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value, Option<String>) {
        let response = test_router().oneshot(request).await.unwrap();
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap(), request_id)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body, _) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_tables() {
        let (status, body, _) = send(Request::get("/tables").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], serde_json::json!(["authors", "books"]));
    }

    #[tokio::test]
    async fn test_unknown_table_is_not_found() {
        let (status, body, _) = send(Request::get("/ghosts").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "TABLE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_unknown_column_is_bad_request() {
        let (status, body, _) = send(
            Request::get("/authors?where=age==3")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "COLUMN_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_without_conditions_is_rejected() {
        let (status, body, request_id) = send(
            Request::delete("/authors")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "NO_CONDITIONS");
        assert_eq!(body["error"]["requestId"], "req-123");
        assert_eq!(request_id.as_deref(), Some("req-123"));
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let (status, body, _) = send(
            Request::post("/authors")
                .header("content-type", "application/json")
                .body(Body::from("{oops"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_malformed_condition() {
        let (status, body, _) = send(
            Request::get("/authors?where=surname=between=a")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_OPERATOR");
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let (_, body, request_id) = send(Request::get("/ghosts").body(Body::empty()).unwrap()).await;
        let request_id = request_id.unwrap();
        assert!(uuid::Uuid::parse_str(&request_id).is_ok());
        assert_eq!(body["error"]["requestId"], request_id.as_str());
    }

    #[tokio::test]
    async fn test_scalar_body_is_invalid_payload() {
        let (status, body, _) = send(
            Request::post("/authors")
                .header("content-type", "application/json")
                .body(Body::from("[{\"surname\": \"Carson\"}, 3]"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_PAYLOAD");
    }

    #[tokio::test]
    async fn test_value_not_matching_column_type_is_rejected_before_execution() {
        let (status, body, _) = send(
            Request::get("/authors?where=id==abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(
            body["error"]["message"],
            "argument $1: invalid int value: \"abc\""
        );
    }
}
