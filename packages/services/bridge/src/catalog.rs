//! 카탈로그 구성
//!
//! 기동 시 한 번 실행됩니다. `TBL_CATALOG_FILE`이 있으면 YAML에서,
//! 없으면 `information_schema.columns`에서 테이블/컬럼 목록을 읽습니다.

use anyhow::Context;
use sqlx::{PgPool, Row};

use tbl_core::schema::{Catalog, Column, ColumnType, SchemaParser, Table};

use crate::config::Config;

const INTROSPECT_SQL: &str = r#"
SELECT table_name::text, column_name::text, data_type::text
FROM information_schema.columns
WHERE table_schema = $1
ORDER BY table_name, ordinal_position
"#;

/// 카탈로그 로드
pub async fn load_catalog(config: &Config, pool: &PgPool) -> anyhow::Result<Catalog> {
    if let Some(path) = &config.catalog_file {
        let yaml = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read catalog file {}", path.display()))?;
        let catalog = SchemaParser::parse_yaml(&yaml)?;
        tracing::info!(path = %path.display(), tables = catalog.len(), "Catalog loaded from file");
        return Ok(catalog);
    }

    let catalog = introspect(pool, &config.db_schema).await?;
    tracing::info!(schema = %config.db_schema, tables = catalog.len(), "Catalog introspected");
    Ok(catalog)
}

/// DB introspection
pub async fn introspect(pool: &PgPool, schema: &str) -> Result<Catalog, sqlx::Error> {
    let rows = sqlx::query(INTROSPECT_SQL)
        .bind(schema)
        .fetch_all(pool)
        .await?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let table: String = row.try_get(0)?;
        let column: String = row.try_get(1)?;
        let data_type: String = row.try_get(2)?;
        columns.push((table, column, data_type));
    }

    Ok(Catalog::from_tables(group_columns(columns)))
}

/// (테이블, 컬럼, 타입) 행을 테이블별로 묶음
///
/// 입력은 테이블 이름, 컬럼 순서로 정렬되어 있어야 합니다.
fn group_columns(rows: impl IntoIterator<Item = (String, String, String)>) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Option<(String, Vec<Column>)> = None;

    for (table, column, data_type) in rows {
        let column = Column::new(column, ColumnType::from_db_type(&data_type));
        match &mut current {
            Some((name, columns)) if *name == table => columns.push(column),
            _ => {
                if let Some((name, columns)) = current.take() {
                    tables.push(Table::new(name, columns));
                }
                current = Some((table, vec![column]));
            }
        }
    }

    if let Some((name, columns)) = current {
        tables.push(Table::new(name, columns));
    }

    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(table: &str, column: &str, data_type: &str) -> (String, String, String) {
        (table.to_string(), column.to_string(), data_type.to_string())
    }

    #[test]
    fn test_group_columns_keeps_order() {
        let tables = group_columns(vec![
            row("authors", "id", "integer"),
            row("authors", "forename", "text"),
            row("authors", "surname", "character varying"),
            row("books", "id", "integer"),
            row("books", "title", "text"),
        ]);

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "authors");
        let names: Vec<_> = tables[0].columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "forename", "surname"]);
        assert_eq!(tables[0].columns()[0].column_type, ColumnType::Int);
        assert_eq!(tables[1].columns().len(), 2);
    }

    #[test]
    fn test_group_columns_empty() {
        assert!(group_columns(Vec::new()).is_empty());
    }
}
