//! tbl-core: Tabula 공통 핵심 라이브러리
//!
//! Bridge, CLI, SQL 엔진이 공유하는 스키마 카탈로그와 에러 타입을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `schema`: 테이블/컬럼 카탈로그 (읽기 전용) 및 YAML 카탈로그 파서
//! - `error`: 공통 에러 타입

pub mod error;
pub mod schema;

pub use error::{Error, Result};
pub use schema::{Catalog, Column, ColumnType, SchemaParser, Table};
