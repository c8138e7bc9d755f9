//! 스키마 카탈로그
//!
//! # 개요
//!
//! 카탈로그는 프로세스 기동 시 한 번 구성되는 테이블/컬럼 목록입니다.
//! 구성 이후에는 변경되지 않으므로 잠금 없이 여러 요청이 동시에 읽을 수 있습니다.
//! 카탈로그는 DB introspection(Bridge) 또는 YAML 파일(`SchemaParser`)로 만들어집니다.
//!
//! # 모듈 구조
//!
//! - `types`: 논리적 컬럼 타입 및 바인딩 값 변환
//! - `column`: 컬럼 정의
//! - `table`: 테이블 정의 (순서 있는 컬럼 + 존재 확인용 집합)
//! - `catalog`: 테이블 이름 → 테이블 맵
//! - `parser`: YAML 카탈로그 파싱

mod catalog;
mod column;
mod parser;
mod table;
mod types;

pub use catalog::Catalog;
pub use column::Column;
pub use parser::SchemaParser;
pub use table::Table;
pub use types::ColumnType;
