//! CRUD SQL 빌더
//!
//! 파싱된 [`Query`](또는 쓰기 payload)와 스키마 카탈로그를 받아
//! `$n` 플레이스홀더 SQL과 순서 있는 인자 목록을 생성합니다.
//!
//! - 참조된 테이블/컬럼은 SQL 생성 전에 카탈로그로 검증합니다.
//! - 값은 항상 인자로 바인딩합니다. SQL 텍스트에는 검증된 식별자와 연산자만 들어갑니다.
//! - 조건 없는 UPDATE/DELETE는 [`SqlError::NoConditions`]로 거부합니다.
//! - INSERT/UPDATE/DELETE는 `RETURNING id`로 끝납니다.
//! - 인자마다 대상 컬럼의 카탈로그 타입을 함께 기록해 실행 단계에서 타입에 맞게 바인딩합니다.

use serde::Serialize;
use serde_json::Value;

use tbl_core::schema::{Catalog, Column, ColumnType, Table};

use crate::error::{Result, SqlError};
use crate::query::{ColumnRef, Condition, Query, RowData};

/// 빌드 결과 (SQL, 바인딩할 값들)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltStatement {
    pub sql: String,
    pub args: Vec<Value>,
    /// 인자별 대상 컬럼 타입 (`args`와 길이가 같음)
    pub types: Vec<ColumnType>,
}

impl BuiltStatement {
    /// SQL에 들어간 플레이스홀더 수 (인자 수와 같음)
    pub fn placeholder_count(&self) -> usize {
        self.args.len()
    }
}

/// 인자 수집기
///
/// 플레이스홀더 번호는 지금까지 쌓인 인자 수 + 1이므로,
/// UPDATE의 WHERE 절은 자연스럽게 SET 절 다음 번호부터 시작합니다.
#[derive(Default)]
struct Args {
    values: Vec<Value>,
    types: Vec<ColumnType>,
}

impl Args {
    /// 값을 추가하고 해당 플레이스홀더(`$n`) 반환
    fn push(&mut self, value: Value, column_type: ColumnType) -> String {
        self.values.push(value);
        self.types.push(column_type);
        format!("${}", self.values.len())
    }

    fn into_statement(self, sql: String) -> BuiltStatement {
        BuiltStatement {
            sql,
            args: self.values,
            types: self.types,
        }
    }
}

/// SELECT 쿼리 빌더
pub struct SelectBuilder<'a> {
    catalog: &'a Catalog,
}

impl<'a> SelectBuilder<'a> {
    /// 새 빌더 생성
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// SQL 생성
    ///
    /// `SELECT {cols|*} FROM {table} [{JOIN ...}] [WHERE ...] [LIMIT n] [OFFSET m]`
    pub fn build(&self, query: &Query) -> Result<BuiltStatement> {
        ensure_table(self.catalog, &query.table)?;
        validate_joins(self.catalog, query)?;

        // SELECT columns
        for column in &query.columns {
            resolve_column(self.catalog, query, column)?;
        }

        let mut sql = format!("SELECT {} FROM {}", projection(&query.columns), query.table);

        for join in &query.joins {
            sql.push_str(&format!(
                " {} {} ON {} = {}",
                join.join_type.as_sql(),
                join.table,
                join.left,
                join.right
            ));
        }

        // WHERE
        let mut args = Args::default();
        if let Some(predicate) = build_where(self.catalog, query, &mut args)? {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }

        // LIMIT / OFFSET (파서가 정수로 검증함)
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = query.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        tracing::debug!(table = %query.table, sql = %sql, "built select statement");
        Ok(args.into_statement(sql))
    }
}

/// INSERT 쿼리 빌더
pub struct InsertBuilder<'a> {
    catalog: &'a Catalog,
}

impl<'a> InsertBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// SQL 생성
    ///
    /// 컬럼 목록은 첫 행의 키를 이름순으로 정렬해 한 번만 정하고 모든 행에 재사용합니다.
    /// 모든 행은 같은 컬럼 집합을 가져야 합니다.
    /// 행 `i`의 컬럼 `j`는 플레이스홀더 `$(i * 컬럼수 + j + 1)`을 받습니다.
    pub fn build(&self, table: &str, rows: &[RowData]) -> Result<BuiltStatement> {
        let table_def = ensure_table(self.catalog, table)?;

        let first = rows.first().ok_or_else(|| SqlError::EmptyPayload {
            operation: "insert".to_string(),
        })?;
        let columns = sorted_columns(table_def, first, "insert")?;

        let mut args = Args::default();
        let mut tuples = Vec::with_capacity(rows.len());

        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(SqlError::ColumnMismatch { row: i });
            }

            let mut placeholders = Vec::with_capacity(columns.len());
            for column in &columns {
                let value = row
                    .get(column.name.as_str())
                    .ok_or(SqlError::ColumnMismatch { row: i })?;
                placeholders.push(args.push(value.clone(), column.column_type));
            }
            tuples.push(format!("({})", placeholders.join(",")));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {} RETURNING id",
            table,
            column_list(&columns),
            tuples.join(",")
        );

        tracing::debug!(table = %table, rows = rows.len(), sql = %sql, "built insert statement");
        Ok(args.into_statement(sql))
    }
}

/// UPDATE 쿼리 빌더
pub struct UpdateBuilder<'a> {
    catalog: &'a Catalog,
}

impl<'a> UpdateBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// SQL 생성
    ///
    /// SET 절 플레이스홀더가 먼저 번호를 받고, WHERE 절은 그 다음 번호부터 이어갑니다.
    pub fn build(&self, query: &Query, data: &RowData) -> Result<BuiltStatement> {
        ensure_mutation(query, "update")?;
        let table_def = ensure_table(self.catalog, &query.table)?;

        // SET 절 (이름순)
        let columns = sorted_columns(table_def, data, "update")?;
        let mut args = Args::default();
        let mut assignments = Vec::with_capacity(columns.len());

        for column in &columns {
            if let Some(value) = data.get(column.name.as_str()) {
                let placeholder = args.push(value.clone(), column.column_type);
                assignments.push(format!("{} = {}", column.name, placeholder));
            }
        }

        // WHERE 절 (SET 다음 번호부터)
        let predicate =
            build_where(self.catalog, query, &mut args)?.ok_or(SqlError::NoConditions)?;

        let sql = format!(
            "UPDATE {} SET {} WHERE {} RETURNING id",
            query.table,
            assignments.join(", "),
            predicate
        );

        tracing::debug!(table = %query.table, sql = %sql, "built update statement");
        Ok(args.into_statement(sql))
    }
}

/// DELETE 쿼리 빌더
pub struct DeleteBuilder<'a> {
    catalog: &'a Catalog,
}

impl<'a> DeleteBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// SQL 생성
    pub fn build(&self, query: &Query) -> Result<BuiltStatement> {
        ensure_mutation(query, "delete")?;
        ensure_table(self.catalog, &query.table)?;

        let mut args = Args::default();
        let predicate =
            build_where(self.catalog, query, &mut args)?.ok_or(SqlError::NoConditions)?;

        let sql = format!("DELETE FROM {} WHERE {} RETURNING id", query.table, predicate);

        tracing::debug!(table = %query.table, sql = %sql, "built delete statement");
        Ok(args.into_statement(sql))
    }
}

/// UPDATE/DELETE 공통 검사
///
/// 조건이 없으면 테이블 전체가 바뀌므로 무조건 거부합니다.
fn ensure_mutation(query: &Query, operation: &str) -> Result<()> {
    if query.conditions.is_empty() {
        return Err(SqlError::NoConditions);
    }
    if !query.joins.is_empty() {
        return Err(SqlError::UnsupportedClause {
            clause: "join".to_string(),
            operation: operation.to_string(),
        });
    }
    Ok(())
}

fn ensure_table<'c>(catalog: &'c Catalog, table: &str) -> Result<&'c Table> {
    catalog
        .get_table(table)
        .ok_or_else(|| SqlError::TableNotFound {
            table: table.to_string(),
        })
}

/// 조인 관계 검사
///
/// 조인 k의 ON 절은 한쪽이 조인 대상 테이블, 다른 쪽이 기본 테이블이나 앞선 조인의
/// 테이블이어야 합니다. 이미 쿼리에 있는 테이블은 다시 조인할 수 없습니다.
fn validate_joins(catalog: &Catalog, query: &Query) -> Result<()> {
    let mut available: Vec<&str> = vec![query.table.as_str()];

    for join in &query.joins {
        ensure_table(catalog, &join.table)?;

        let invalid = || SqlError::InvalidJoin {
            relation: format!("{}:{}=={}", join.table, join.left, join.right),
        };
        let target = join.table.as_str();
        if available.contains(&target) {
            return Err(invalid());
        }

        let left = join.left.table(&query.table);
        let right = join.right.table(&query.table);
        let connects = (left == target && available.contains(&right))
            || (right == target && available.contains(&left));
        if !connects {
            return Err(invalid());
        }

        resolve_column(catalog, query, &join.left)?;
        resolve_column(catalog, query, &join.right)?;
        available.push(target);
    }

    Ok(())
}

/// 컬럼 참조를 카탈로그 컬럼으로 해석
///
/// prefix가 없으면 쿼리의 모든 테이블(기본 + 조인)에서 찾고, 정확히 한 곳에만 있어야 합니다.
/// SQL에는 prefix 없이 그대로 나가므로 두 곳 이상에 있으면 모호한 참조로 거부합니다.
fn resolve_column<'c>(catalog: &'c Catalog, query: &Query, column: &ColumnRef) -> Result<&'c Column> {
    let Some(qualifier) = column.qualifier.as_deref() else {
        return resolve_unqualified(catalog, query, &column.name);
    };

    let table_def = ensure_table(catalog, qualifier)?;
    if !query.includes_table(qualifier) {
        return Err(SqlError::UnjoinedTable {
            table: qualifier.to_string(),
        });
    }

    table_def
        .find_column(&column.name)
        .ok_or_else(|| SqlError::ColumnNotFound {
            table: qualifier.to_string(),
            column: column.name.clone(),
        })
}

fn resolve_unqualified<'c>(catalog: &'c Catalog, query: &Query, name: &str) -> Result<&'c Column> {
    ensure_table(catalog, &query.table)?;

    let mut candidates = query
        .tables
        .iter()
        .filter_map(|table| catalog.find_column(table, name));

    match (candidates.next(), candidates.next()) {
        (Some(found), None) => Ok(found),
        (Some(_), Some(_)) => Err(SqlError::AmbiguousColumn {
            column: name.to_string(),
        }),
        _ => Err(SqlError::ColumnNotFound {
            table: query.table.clone(),
            column: name.to_string(),
        }),
    }
}

/// payload 키를 이름순으로 정렬하고 카탈로그 컬럼으로 해석
fn sorted_columns<'t>(table: &'t Table, row: &RowData, operation: &str) -> Result<Vec<&'t Column>> {
    if row.is_empty() {
        return Err(SqlError::EmptyPayload {
            operation: operation.to_string(),
        });
    }

    let mut names: Vec<&String> = row.keys().collect();
    names.sort_unstable();

    names
        .into_iter()
        .map(|name| {
            table.find_column(name).ok_or_else(|| SqlError::ColumnNotFound {
                table: table.name.clone(),
                column: name.clone(),
            })
        })
        .collect()
}

fn column_list(columns: &[&Column]) -> String {
    columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `col [AS alias], ...` 또는 `*`
fn projection(columns: &[ColumnRef]) -> String {
    if columns.is_empty() {
        return "*".to_string();
    }

    columns
        .iter()
        .map(|c| match &c.alias {
            Some(alias) => format!("{} AS {}", c, alias),
            None => c.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// WHERE 술어 생성 (조건이 없으면 None)
///
/// 플레이스홀더는 `args`에 이미 쌓인 인자 다음 번호부터 값 하나당 하나씩 증가합니다.
/// 조건 값은 컬럼 타입에 맞춰 변환된 뒤 `args`에 추가됩니다.
fn build_where(catalog: &Catalog, query: &Query, args: &mut Args) -> Result<Option<String>> {
    if query.conditions.is_empty() {
        return Ok(None);
    }

    let mut predicates = Vec::with_capacity(query.conditions.len());

    for condition in &query.conditions {
        let column = resolve_column(catalog, query, condition.column())?;

        let placeholders: Vec<String> = condition
            .values()
            .iter()
            .map(|raw| args.push(column.column_type.coerce(raw), column.column_type))
            .collect();

        predicates.push(render_condition(condition, &placeholders));
    }

    Ok(Some(predicates.join(" AND ")))
}

/// 조건 하나 렌더링
///
/// - NULL 검사: `col IS NULL`
/// - 목록 연산자: `col IN ($1,$2)`
/// - 단일 값: `col = $1`
/// - 목록이 아닌 연산자에 값이 여럿: `(col = $1 OR col = $2)`
fn render_condition(condition: &Condition, placeholders: &[String]) -> String {
    let column = condition.column();
    let op = condition.operator().as_sql();

    if condition.operator().is_null_check() {
        return format!("{} {}", column, op);
    }
    if condition.operator().is_list() {
        return format!("{} {} ({})", column, op, placeholders.join(","));
    }

    match placeholders {
        [single] => format!("{} {} {}", column, op, single),
        many => {
            let alternatives = many
                .iter()
                .map(|p| format!("{} {} {}", column, op, p))
                .collect::<Vec<_>>()
                .join(" OR ");
            format!("({})", alternatives)
        }
    }
}
