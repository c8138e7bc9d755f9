//! 공통 에러 타입
//!
//! 카탈로그 구성 단계에서 발생하는 에러를 정의합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Tabula 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Schema Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("schema parse error: {message}")]
    SchemaParse { message: String },

    #[error("schema validation error: {message}")]
    SchemaValidation { message: String },

    #[error("duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Serialization Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
