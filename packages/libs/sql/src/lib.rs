//! tbl-sql: 쿼리 문자열 → 파라미터화된 SQL 컴파일러
//!
//! URL 쿼리 문자열(`where=`, `select=`, `join=` ...)을 구조화된 [`Query`]로 파싱하고,
//! 스키마 카탈로그로 검증한 뒤 `$n` 플레이스홀더를 쓰는 SQL과 인자 목록을 생성합니다.
//! 사용자 값은 절대 SQL 텍스트에 끼워 넣지 않고 항상 인자로 바인딩합니다.
//!
//! # 모듈 구조
//!
//! - `operator`: 필터 연산자 토큰 → SQL 연산자 매핑
//! - `query`: 파싱 결과 타입 (Query, Condition, JoinRelation ...)
//! - `parser`: 쿼리 문자열 파서
//! - `builder`: SELECT/INSERT/UPDATE/DELETE 빌더
//! - `error`: 에러 타입

pub mod builder;
pub mod error;
pub mod operator;
pub mod parser;
pub mod query;

pub use builder::{BuiltStatement, DeleteBuilder, InsertBuilder, SelectBuilder, UpdateBuilder};
pub use error::{Result, SqlError};
pub use operator::{OperatorTable, SqlOperator};
pub use parser::QueryParser;
pub use query::{
    row_from_json, rows_from_json, ColumnRef, Condition, JoinRelation, JoinType, Query, RowData,
};
