//! 파싱된 쿼리 표현
//!
//! 요청마다 새로 만들어지고, 빌더가 한 번 소비한 뒤 버려집니다.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::error::{Result, SqlError};
use crate::operator::SqlOperator;

/// INSERT/UPDATE 입력 및 SELECT 결과 한 행 (컬럼 이름 → 값)
pub type RowData = HashMap<String, Value>;

/// INSERT 본문: 객체 하나 또는 객체 배열
pub fn rows_from_json(value: Value) -> Result<Vec<RowData>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map.into_iter().collect()),
                other => Err(SqlError::InvalidPayload {
                    expected: "an array of JSON objects",
                    found: json_kind(&other),
                }),
            })
            .collect(),
        Value::Object(map) => Ok(vec![map.into_iter().collect()]),
        other => Err(SqlError::InvalidPayload {
            expected: "a JSON object or an array of JSON objects",
            found: json_kind(&other),
        }),
    }
}

/// UPDATE 본문: 객체 하나
pub fn row_from_json(value: Value) -> Result<RowData> {
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(SqlError::InvalidPayload {
            expected: "a JSON object",
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 컬럼 참조 (SELECT 대상, 필터, 조인 양쪽)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// 테이블 prefix (`books.title`의 `books`)
    pub qualifier: Option<String>,
    pub name: String,
    /// `AS` 별칭 (SELECT 전용)
    pub alias: Option<String>,
}

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
            alias: None,
        }
    }

    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// 컬럼이 속한 테이블 (prefix가 없으면 기본 테이블)
    pub fn table<'a>(&'a self, primary: &'a str) -> &'a str {
        self.qualifier.as_deref().unwrap_or(primary)
    }
}

/// `qualifier.name` (별칭 제외)
impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}.{}", q, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// WHERE 조건 하나 (컬럼, 연산자, 값 목록)
///
/// NULL 검사 연산자는 값이 없고, 나머지 연산자는 값이 하나 이상입니다.
/// 값은 항상 바인딩용 원본 문자열입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    column: ColumnRef,
    operator: SqlOperator,
    values: Vec<String>,
}

impl Condition {
    pub fn new(column: ColumnRef, operator: SqlOperator, values: Vec<String>) -> Result<Self> {
        if operator.is_null_check() && !values.is_empty() {
            return Err(SqlError::UnexpectedValues {
                condition: format!("{} {}", column, operator.as_sql()),
            });
        }
        if !operator.is_null_check() && values.is_empty() {
            return Err(SqlError::NoValues {
                condition: format!("{} {}", column, operator.as_sql()),
            });
        }

        Ok(Self {
            column,
            operator,
            values,
        })
    }

    pub fn column(&self) -> &ColumnRef {
        &self.column
    }

    pub fn operator(&self) -> SqlOperator {
        self.operator
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// 조인 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// `join=`
    Join,
    /// `inner_join=`
    Inner,
    /// `left_join=`
    Left,
    /// `right_join=`
    Right,
}

impl JoinType {
    /// 쿼리 키워드에서 변환
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "join" => Some(JoinType::Join),
            "inner_join" => Some(JoinType::Inner),
            "left_join" => Some(JoinType::Left),
            "right_join" => Some(JoinType::Right),
            _ => None,
        }
    }

    /// SQL 텍스트 (키워드의 `_`를 공백으로, 대문자로)
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Join => "JOIN",
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
        }
    }
}

/// 조인 관계 `table:lq.lc==rq.rc`
///
/// 양쪽 컬럼 모두 테이블 prefix가 필수입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRelation {
    pub join_type: JoinType,
    /// 조인 대상 테이블
    pub table: String,
    pub left: ColumnRef,
    pub right: ColumnRef,
}

/// 파싱된 쿼리
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// 기본 테이블 (경로의 리소스 이름)
    pub table: String,
    /// 기본 테이블 + 조인된 테이블 (등장 순서)
    pub tables: Vec<String>,
    /// SELECT 대상 (비어 있으면 `*`)
    pub columns: Vec<ColumnRef>,
    pub conditions: Vec<Condition>,
    pub joins: Vec<JoinRelation>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Query {
    /// 조건 없는 빈 쿼리
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            tables: vec![table.clone()],
            table,
            columns: Vec::new(),
            conditions: Vec::new(),
            joins: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// 쿼리에 포함된 테이블인지
    pub fn includes_table(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t == name)
    }

    /// 조건 추가 (테스트/프로그램 방식 구성용)
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_check_rejects_values() {
        let result = Condition::new(
            ColumnRef::new("died"),
            SqlOperator::IsNull,
            vec!["x".to_string()],
        );
        assert!(matches!(result, Err(SqlError::UnexpectedValues { .. })));
    }

    #[test]
    fn test_value_operator_requires_values() {
        let result = Condition::new(ColumnRef::new("surname"), SqlOperator::In, vec![]);
        assert!(matches!(result, Err(SqlError::NoValues { .. })));
    }

    #[test]
    fn test_column_display() {
        assert_eq!(ColumnRef::new("title").to_string(), "title");
        assert_eq!(
            ColumnRef::qualified("books", "title")
                .with_alias("t")
                .to_string(),
            "books.title"
        );
        assert_eq!(ColumnRef::qualified("genres", "name").table("books"), "genres");
        assert_eq!(ColumnRef::new("name").table("books"), "books");
    }

    #[test]
    fn test_rows_from_json() {
        let rows = rows_from_json(json!({"surname": "Carson"})).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["surname"], json!("Carson"));

        let rows = rows_from_json(json!([{"surname": "Carson"}, {"surname": "Woolf"}])).unwrap();
        assert_eq!(rows.len(), 2);

        assert!(rows_from_json(json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_rows_from_json_rejects_non_objects() {
        assert_eq!(
            rows_from_json(json!(42)),
            Err(SqlError::InvalidPayload {
                expected: "a JSON object or an array of JSON objects",
                found: "number",
            })
        );
        assert!(matches!(
            rows_from_json(json!([{"surname": "x"}, "y"])),
            Err(SqlError::InvalidPayload { found: "string", .. })
        ));
        assert!(matches!(
            row_from_json(json!([{"surname": "x"}])),
            Err(SqlError::InvalidPayload { found: "array", .. })
        ));
    }

    #[test]
    fn test_join_type_keywords() {
        assert_eq!(JoinType::from_keyword("join").map(|j| j.as_sql()), Some("JOIN"));
        assert_eq!(
            JoinType::from_keyword("left_join").map(|j| j.as_sql()),
            Some("LEFT JOIN")
        );
        assert_eq!(
            JoinType::from_keyword("inner_join").map(|j| j.as_sql()),
            Some("INNER JOIN")
        );
        assert_eq!(JoinType::from_keyword("outer_join"), None);
    }
}
