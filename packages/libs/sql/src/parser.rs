//! 쿼리 문자열 파서
//!
//! `/{table}?where=...&select=...&join=...&limit=..&offset=..` 형태의 경로를
//! [`Query`]로 변환합니다. 구조 분리(`&`, 첫 `=`, `;`, `,`, `:`, `.`)를 먼저 하고
//! 마지막에 각 토큰을 percent-decode 하므로, 인코딩된 구분자가 구조를 바꾸지 못합니다.
//!
//! 같은 종류의 절이 여러 번 나오면 `where`/`select`/`limit`/`offset`은 마지막 것이
//! 이기고, 조인 절은 등장 순서대로 누적됩니다.

use percent_encoding::percent_decode_str;

use crate::error::{Result, SqlError};
use crate::operator::OperatorTable;
use crate::query::{ColumnRef, Condition, JoinRelation, JoinType, Query};

/// 절 키워드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    Where,
    Select,
    Join(JoinType),
    Limit,
    Offset,
}

impl Clause {
    fn from_keyword(keyword: &str) -> Result<Self> {
        match keyword {
            "where" | "filter" => Ok(Clause::Where),
            "select" | "fields" => Ok(Clause::Select),
            "limit" => Ok(Clause::Limit),
            "offset" => Ok(Clause::Offset),
            other => JoinType::from_keyword(other)
                .map(Clause::Join)
                .ok_or_else(|| SqlError::InvalidKeyword {
                    keyword: other.to_string(),
                }),
        }
    }
}

/// 쿼리 문자열 파서
///
/// 연산자 테이블을 주입받습니다. 상태가 없으므로 여러 요청에서 공유해도 됩니다.
#[derive(Debug, Clone, Copy)]
pub struct QueryParser<'a> {
    operators: &'a OperatorTable,
}

impl QueryParser<'static> {
    /// 기본 연산자 테이블을 쓰는 파서
    pub fn standard() -> Self {
        Self::new(OperatorTable::standard())
    }
}

impl<'a> QueryParser<'a> {
    pub fn new(operators: &'a OperatorTable) -> Self {
        Self { operators }
    }

    /// 경로 + 쿼리 문자열 파싱
    ///
    /// `?`가 없으면 조건 없는 쿼리가 됩니다.
    pub fn parse_path(&self, path: &str) -> Result<Query> {
        let (resource, raw_query) = path.split_once('?').unwrap_or((path, ""));

        let table = parse_resource(resource).ok_or_else(|| SqlError::InvalidPath {
            path: path.to_string(),
        })?;

        self.parse(table, raw_query)
    }

    /// 테이블 이름과 원본 쿼리 문자열로 파싱
    pub fn parse(&self, table: &str, raw_query: &str) -> Result<Query> {
        let mut query = Query::new(table);

        for clause in raw_query.split('&').filter(|c| !c.is_empty()) {
            // 첫 `=`에서만 자른다 (값 안의 `==`, `=in=` 등은 그대로 둠)
            let (keyword, value) =
                clause
                    .split_once('=')
                    .ok_or_else(|| SqlError::InvalidClause {
                        clause: clause.to_string(),
                    })?;

            match Clause::from_keyword(keyword)? {
                Clause::Where => query.conditions = self.parse_where(value)?,
                Clause::Select => query.columns = parse_select(value)?,
                Clause::Join(join_type) => {
                    for relation in parse_joins(join_type, value)? {
                        if !query.includes_table(&relation.table) {
                            query.tables.push(relation.table.clone());
                        }
                        query.joins.push(relation);
                    }
                }
                Clause::Limit => query.limit = Some(parse_number("limit", value)?),
                Clause::Offset => query.offset = Some(parse_number("offset", value)?),
            }
        }

        Ok(query)
    }

    /// `where=` 값: `;`로 구분된 조건들
    fn parse_where(&self, value: &str) -> Result<Vec<Condition>> {
        value
            .split(';')
            .map(|condition| self.parse_condition(condition))
            .collect()
    }

    /// 조건 하나: `[qualifier.]column <op> v1,v2,...`
    fn parse_condition(&self, condition: &str) -> Result<Condition> {
        if condition.is_empty() {
            return Err(SqlError::InvalidClause {
                clause: "where: empty condition".to_string(),
            });
        }

        let found = self
            .operators
            .find(condition)
            .ok_or_else(|| SqlError::InvalidOperator {
                condition: condition.to_string(),
            })?;

        let lhs = &condition[..found.start];
        let rhs = &condition[found.end()..];

        if found.operator.is_null_check() && !rhs.is_empty() {
            return Err(SqlError::UnexpectedValues {
                condition: condition.to_string(),
            });
        }
        if !found.operator.is_null_check() && rhs.is_empty() {
            return Err(SqlError::NoValues {
                condition: condition.to_string(),
            });
        }

        let column = parse_column_ref(lhs, false)?;
        let values = if rhs.is_empty() {
            Vec::new()
        } else {
            rhs.split(',').map(decode).collect::<Result<Vec<_>>>()?
        };

        Condition::new(column, found.operator, values)
    }
}

/// `/authors` 또는 `/authors/` → `authors`
fn parse_resource(resource: &str) -> Option<&str> {
    let name = resource.strip_prefix('/')?;
    let name = name.strip_suffix('/').unwrap_or(name);
    is_identifier(name).then_some(name)
}

/// `select=` 값: `,`로 구분된 `[qualifier.]name[:alias]`
fn parse_select(value: &str) -> Result<Vec<ColumnRef>> {
    value.split(',').map(parse_column_spec).collect()
}

fn parse_column_spec(spec: &str) -> Result<ColumnRef> {
    let invalid = || SqlError::InvalidColumn {
        spec: spec.to_string(),
    };

    let (column, alias) = match spec.split_once(':') {
        Some((column, alias)) => (column, Some(alias)),
        None => (spec, None),
    };

    let column = parse_column_ref(column, false)?;
    match alias {
        None => Ok(column),
        Some(alias) => {
            let alias = decode(alias)?;
            if !is_identifier(&alias) {
                return Err(invalid());
            }
            Ok(column.with_alias(alias))
        }
    }
}

/// 조인 절 값: `;`로 구분된 `table:lq.lc==rq.rc`
fn parse_joins(join_type: JoinType, value: &str) -> Result<Vec<JoinRelation>> {
    value
        .split(';')
        .map(|relation| parse_join_relation(join_type, relation))
        .collect()
}

fn parse_join_relation(join_type: JoinType, relation: &str) -> Result<JoinRelation> {
    let invalid = || SqlError::InvalidJoin {
        relation: relation.to_string(),
    };

    let (table, on) = relation.split_once(':').ok_or_else(invalid)?;
    let (left, right) = on.split_once("==").ok_or_else(invalid)?;

    let table = decode(table)?;
    if !is_identifier(&table) || right.contains("==") {
        return Err(invalid());
    }

    let left = parse_column_ref(left, true).map_err(|_| invalid())?;
    let right = parse_column_ref(right, true).map_err(|_| invalid())?;

    Ok(JoinRelation {
        join_type,
        table,
        left,
        right,
    })
}

/// `[qualifier.]name` (prefix 필수 여부 지정)
fn parse_column_ref(spec: &str, require_qualifier: bool) -> Result<ColumnRef> {
    let invalid = || SqlError::InvalidColumn {
        spec: spec.to_string(),
    };

    let parts: Vec<&str> = spec.split('.').collect();
    match parts.as_slice() {
        [name] if !require_qualifier => {
            let name = decode(name)?;
            if !is_identifier(&name) {
                return Err(invalid());
            }
            Ok(ColumnRef::new(name))
        }
        [qualifier, name] => {
            let qualifier = decode(qualifier)?;
            let name = decode(name)?;
            if !is_identifier(&qualifier) || !is_identifier(&name) {
                return Err(invalid());
            }
            Ok(ColumnRef::qualified(qualifier, name))
        }
        _ => Err(invalid()),
    }
}

fn parse_number(clause: &str, value: &str) -> Result<u64> {
    value.parse::<u64>().map_err(|_| SqlError::InvalidNumber {
        clause: clause.to_string(),
        value: value.to_string(),
    })
}

fn decode(raw: &str) -> Result<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| SqlError::InvalidEncoding {
            value: raw.to_string(),
        })
}

/// SQL 텍스트에 그대로 들어가는 이름은 `[A-Za-z0-9_]+`만 허용
fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
