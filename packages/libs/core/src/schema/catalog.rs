//! 스키마 카탈로그
//!
//! 기동 시 한 번 구성되고 이후에는 읽기만 하는 테이블 레지스트리입니다.
//! 파서/빌더에는 전역 상태가 아닌 참조로 주입됩니다.

use std::collections::HashMap;

use super::column::Column;
use super::table::Table;

/// 스키마 카탈로그
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// 테이블 맵 (테이블 이름 -> 테이블 정의)
    tables: HashMap<String, Table>,
}

impl Catalog {
    /// 빈 카탈로그 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 테이블 목록으로 카탈로그 생성
    ///
    /// 같은 이름의 테이블이 여러 번 주어지면 마지막 것이 남습니다.
    pub fn from_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        let tables = tables
            .into_iter()
            .map(|table| (table.name.clone(), table))
            .collect();
        Self { tables }
    }

    /// 테이블 존재 여부
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// 컬럼 존재 여부 (테이블이 없으면 false)
    pub fn column_exists(&self, table: &str, column: &str) -> bool {
        self.tables
            .get(table)
            .map(|t| t.has_column(column))
            .unwrap_or(false)
    }

    /// 테이블의 순서 있는 컬럼 목록
    pub fn columns(&self, table: &str) -> Option<&[Column]> {
        self.tables.get(table).map(|t| t.columns())
    }

    /// 테이블 조회
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// 컬럼 조회
    pub fn find_column(&self, table: &str, column: &str) -> Option<&Column> {
        self.tables.get(table).and_then(|t| t.find_column(column))
    }

    /// 모든 테이블 이름 (이름순)
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    fn sample_catalog() -> Catalog {
        Catalog::from_tables(vec![
            Table::new(
                "authors",
                vec![
                    Column::new("id", ColumnType::Int),
                    Column::new("forename", ColumnType::String),
                    Column::new("surname", ColumnType::String),
                ],
            ),
            Table::new("books", vec![Column::new("id", ColumnType::Int)]),
        ])
    }

    #[test]
    fn test_catalog_lookups() {
        let catalog = sample_catalog();

        assert!(catalog.table_exists("authors"));
        assert!(!catalog.table_exists("posts"));
        assert!(catalog.column_exists("authors", "surname"));
        assert!(!catalog.column_exists("authors", "ghost"));
        assert!(!catalog.column_exists("posts", "id"));
        assert_eq!(catalog.columns("authors").map(|c| c.len()), Some(3));
        assert!(catalog.columns("posts").is_none());
    }

    #[test]
    fn test_table_names_sorted() {
        let catalog = sample_catalog();
        assert_eq!(catalog.table_names(), vec!["authors", "books"]);
        assert_eq!(catalog.len(), 2);
    }
}
