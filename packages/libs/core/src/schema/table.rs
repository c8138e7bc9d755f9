//! 테이블 정의

use std::collections::HashSet;

use super::column::Column;

/// 테이블 정의
///
/// 컬럼 순서는 DB의 `ordinal_position`(또는 카탈로그 파일의 선언 순서)을 따릅니다.
/// 존재 확인은 별도 집합으로 O(1)에 처리합니다.
#[derive(Debug, Clone)]
pub struct Table {
    /// 테이블 이름
    pub name: String,

    /// 순서 있는 컬럼 목록
    columns: Vec<Column>,

    /// 컬럼 이름 집합
    column_set: HashSet<String>,
}

impl Table {
    /// 새 테이블 생성
    ///
    /// 같은 이름의 컬럼이 중복되면 처음 것만 남습니다.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let mut column_set = HashSet::with_capacity(columns.len());
        let columns = columns
            .into_iter()
            .filter(|c| column_set.insert(c.name.clone()))
            .collect();

        Self {
            name: name.into(),
            columns,
            column_set,
        }
    }

    /// 순서 있는 컬럼 목록
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// 컬럼 존재 여부
    pub fn has_column(&self, name: &str) -> bool {
        self.column_set.contains(name)
    }

    /// 이름으로 컬럼 조회
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        if !self.has_column(name) {
            return None;
        }
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    #[test]
    fn test_table_keeps_column_order() {
        let table = Table::new(
            "authors",
            vec![
                Column::new("id", ColumnType::Int),
                Column::new("surname", ColumnType::String),
                Column::new("forename", ColumnType::String),
            ],
        );

        let names: Vec<_> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "surname", "forename"]);
        assert!(table.has_column("forename"));
        assert!(!table.has_column("ghost"));
    }

    #[test]
    fn test_duplicate_columns_are_dropped() {
        let table = Table::new(
            "t",
            vec![
                Column::new("a", ColumnType::Int),
                Column::new("a", ColumnType::String),
            ],
        );
        assert_eq!(table.columns().len(), 1);
        assert_eq!(table.find_column("a").map(|c| c.column_type), Some(ColumnType::Int));
    }
}
