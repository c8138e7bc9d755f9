//! Bridge 에러 타입

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use tbl_sql::SqlError;

/// Bridge 에러
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("query error: {0}")]
    Sql(#[from] SqlError),
}

/// 에러 응답 JSON
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            BridgeError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message.clone())
            }
            BridgeError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database operation failed".to_string(),
                )
            }
            BridgeError::Sql(e) => {
                let status =
                    StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
                (status, e.code(), e.to_string())
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                request_id: crate::middleware::current_request_id(),
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(error: BridgeError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_responses() {
        let (status, body) = render(BridgeError::BadRequest {
            message: "argument $1: invalid int value: \"x\"".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");

        let (status, body) = render(BridgeError::Sql(SqlError::TableNotFound {
            table: "ghosts".to_string(),
        }))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "TABLE_NOT_FOUND");

        let (status, body) = render(BridgeError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
        assert_eq!(body["error"]["message"], "Database operation failed");
        assert!(body["error"].get("requestId").is_none());
    }
}
