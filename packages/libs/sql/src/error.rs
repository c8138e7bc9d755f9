//! SQL 엔진 에러
//!
//! 세 종류로 나뉩니다.
//!
//! - 잘못된 입력: 파싱 단계에서 거부 (카탈로그 조회 전)
//! - 스키마 불일치: 빌드 단계에서 거부 (SQL 생성 전)
//! - 조건 없는 UPDATE/DELETE: 전용 sentinel [`SqlError::NoConditions`]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SqlError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    // ─────────────────────────────────────────────────────────────────────────────
    // Malformed input
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("invalid path: {path}")]
    InvalidPath { path: String },

    #[error("invalid clause: {clause}")]
    InvalidClause { clause: String },

    #[error("invalid clause keyword: {keyword}")]
    InvalidKeyword { keyword: String },

    #[error("invalid operator in condition: {condition}")]
    InvalidOperator { condition: String },

    #[error("condition with no values: {condition}")]
    NoValues { condition: String },

    #[error("null check takes no values: {condition}")]
    UnexpectedValues { condition: String },

    #[error("invalid column: {spec}")]
    InvalidColumn { spec: String },

    #[error("invalid join relation: {relation}")]
    InvalidJoin { relation: String },

    #[error("invalid {clause} value: {value}")]
    InvalidNumber { clause: String, value: String },

    #[error("invalid percent-encoding: {value}")]
    InvalidEncoding { value: String },

    #[error("{clause} is not supported for {operation}")]
    UnsupportedClause { clause: String, operation: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Write payload
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("{operation} requires at least one column value")]
    EmptyPayload { operation: String },

    #[error("row {row} does not match the columns of the first row")]
    ColumnMismatch { row: usize },

    #[error("payload must be {expected}, got {found}")]
    InvalidPayload {
        expected: &'static str,
        found: &'static str,
    },

    // ─────────────────────────────────────────────────────────────────────────────
    // Schema mismatch
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("table does not exist: {table}")]
    TableNotFound { table: String },

    #[error("column does not exist: {table}.{column}")]
    ColumnNotFound { table: String, column: String },

    #[error("table is not part of the query: {table}")]
    UnjoinedTable { table: String },

    #[error("column is ambiguous across joined tables: {column}")]
    AmbiguousColumn { column: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Unsafe statement guard
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("no conditions provided")]
    NoConditions,
}

impl SqlError {
    /// 조건 없는 UPDATE/DELETE 거부 여부
    pub fn is_no_conditions(&self) -> bool {
        matches!(self, SqlError::NoConditions)
    }

    /// 카탈로그 불일치 여부
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(
            self,
            SqlError::TableNotFound { .. }
                | SqlError::ColumnNotFound { .. }
                | SqlError::UnjoinedTable { .. }
                | SqlError::AmbiguousColumn { .. }
        )
    }

    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 404 Not Found
            SqlError::TableNotFound { .. } => 404,

            // 나머지는 모두 호출자 입력 문제
            _ => 400,
        }
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            SqlError::InvalidPath { .. } => "INVALID_PATH",
            SqlError::InvalidClause { .. } => "INVALID_CLAUSE",
            SqlError::InvalidKeyword { .. } => "INVALID_KEYWORD",
            SqlError::InvalidOperator { .. } => "INVALID_OPERATOR",
            SqlError::NoValues { .. } => "NO_VALUES",
            SqlError::UnexpectedValues { .. } => "UNEXPECTED_VALUES",
            SqlError::InvalidColumn { .. } => "INVALID_COLUMN",
            SqlError::InvalidJoin { .. } => "INVALID_JOIN",
            SqlError::InvalidNumber { .. } => "INVALID_NUMBER",
            SqlError::InvalidEncoding { .. } => "INVALID_ENCODING",
            SqlError::UnsupportedClause { .. } => "UNSUPPORTED_CLAUSE",
            SqlError::EmptyPayload { .. } => "EMPTY_PAYLOAD",
            SqlError::ColumnMismatch { .. } => "COLUMN_MISMATCH",
            SqlError::InvalidPayload { .. } => "INVALID_PAYLOAD",
            SqlError::TableNotFound { .. } => "TABLE_NOT_FOUND",
            SqlError::ColumnNotFound { .. } => "COLUMN_NOT_FOUND",
            SqlError::UnjoinedTable { .. } => "UNJOINED_TABLE",
            SqlError::AmbiguousColumn { .. } => "AMBIGUOUS_COLUMN",
            SqlError::NoConditions => "NO_CONDITIONS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_conditions_is_distinct() {
        assert!(SqlError::NoConditions.is_no_conditions());
        assert!(!SqlError::NoConditions.is_schema_mismatch());
        assert_eq!(SqlError::NoConditions.code(), "NO_CONDITIONS");
        assert_eq!(SqlError::NoConditions.to_string(), "no conditions provided");
    }

    #[test]
    fn test_status_codes() {
        let missing = SqlError::TableNotFound {
            table: "ghosts".to_string(),
        };
        assert_eq!(missing.status_code(), 404);
        assert!(missing.is_schema_mismatch());

        let column = SqlError::ColumnNotFound {
            table: "authors".to_string(),
            column: "ghost".to_string(),
        };
        assert_eq!(column.status_code(), 400);
        assert_eq!(column.to_string(), "column does not exist: authors.ghost");
    }
}
