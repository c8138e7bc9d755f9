//! 카탈로그 YAML 파서
//!
//! DB introspection 없이 카탈로그를 구성할 때 사용합니다 (CLI, 테스트, 읽기 전용 배포).
//!
//! ```yaml
//! version: 1
//! tables:
//!   authors:
//!     columns:
//!       - { name: id, type: int }
//!       - { name: forename, type: string }
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use super::catalog::Catalog;
use super::column::Column;
use super::table::Table;
use super::types::ColumnType;
use crate::error::{Error, Result};

/// 카탈로그 파서
pub struct SchemaParser;

impl SchemaParser {
    /// 단일 YAML 문자열 파싱
    pub fn parse_yaml(yaml: &str) -> Result<Catalog> {
        let raw: RawSchema = serde_yaml::from_str(yaml)?;
        let tables = Self::convert_raw_schema(raw)?;
        Ok(Catalog::from_tables(tables))
    }

    /// Raw 스키마를 Table 목록으로 변환
    fn convert_raw_schema(raw: RawSchema) -> Result<Vec<Table>> {
        if raw.version != 1 {
            return Err(Error::SchemaParse {
                message: format!("unsupported catalog version: {}", raw.version),
            });
        }

        raw.tables
            .into_iter()
            .map(|(name, raw_table)| Self::convert_raw_table(name, raw_table))
            .collect()
    }

    /// Raw 테이블을 Table로 변환
    fn convert_raw_table(name: String, raw: RawTable) -> Result<Table> {
        if raw.columns.is_empty() {
            return Err(Error::SchemaValidation {
                message: format!("table '{}' has no columns", name),
            });
        }

        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(raw.columns.len());

        for raw_col in raw.columns {
            if !seen.insert(raw_col.name.clone()) {
                return Err(Error::DuplicateColumn {
                    table: name,
                    column: raw_col.name,
                });
            }
            let column_type = Self::parse_column_type(&raw_col)?;
            columns.push(Column::new(raw_col.name, column_type));
        }

        Ok(Table::new(name, columns))
    }

    /// 컬럼 타입 파싱 (생략 시 string)
    fn parse_column_type(raw: &RawColumn) -> Result<ColumnType> {
        let type_str = raw.column_type.as_deref().unwrap_or("string");

        ColumnType::from_simple_str(type_str).ok_or_else(|| Error::SchemaValidation {
            message: format!("column '{}' has unknown type '{}'", raw.name, type_str),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw YAML 구조체 (serde 역직렬화용)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawSchema {
    #[serde(default = "default_version")]
    version: u32,
    tables: BTreeMap<String, RawTable>,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(default)]
    columns: Vec<RawColumn>,
}

#[derive(Debug, Deserialize)]
struct RawColumn {
    name: String,
    #[serde(rename = "type")]
    column_type: Option<String>,
}
