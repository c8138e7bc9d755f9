//! 빌드된 문장 실행
//!
//! `BuiltStatement`의 인자를 대상 컬럼 타입에 맞춰 바인딩하고 결과 행을 JSON으로 변환합니다.
//! 값이 컬럼 타입으로 변환되지 않으면 DB에 보내기 전에 400으로 거부합니다.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use sqlx::postgres::types::PgMoney;
use sqlx::postgres::{PgArguments, PgPool, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row, TypeInfo};
use uuid::Uuid;

use tbl_core::ColumnType;
use tbl_sql::BuiltStatement;

use crate::error::{BridgeError, Result};

/// SELECT / RETURNING 결과 행 조회
pub async fn fetch_rows(pool: &PgPool, statement: &BuiltStatement) -> Result<Vec<Value>> {
    let query = bind_args(statement)?
        .into_iter()
        .fold(sqlx::query(&statement.sql), |query, arg| arg.bind(query));

    let rows = query.fetch_all(pool).await?;
    let rows = rows
        .iter()
        .map(row_to_json)
        .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;
    Ok(rows)
}

/// `RETURNING id` 결과에서 id 목록 추출
pub async fn fetch_ids(pool: &PgPool, statement: &BuiltStatement) -> Result<Vec<Value>> {
    let rows = fetch_rows(pool, statement).await?;
    Ok(rows
        .into_iter()
        .map(|mut row| row.get_mut("id").map(Value::take).unwrap_or(Value::Null))
        .collect())
}

/// 컬럼 타입에 맞춘 바인딩 값
///
/// NULL도 타입이 있는 NULL로 보내야 `integer` 컬럼에 text NULL이 들어가는 일이 없습니다.
#[derive(Debug, Clone, PartialEq)]
enum BindArg {
    Text(Option<String>),
    Int(Option<i64>),
    Float(Option<f64>),
    Decimal(Option<Decimal>),
    Bool(Option<bool>),
    Json(Option<Value>),
    Uuid(Option<Uuid>),
    Timestamptz(Option<DateTime<Utc>>),
    Timestamp(Option<NaiveDateTime>),
    Time(Option<NaiveTime>),
    Bytes(Option<Vec<u8>>),
}

impl BindArg {
    fn null(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::String => BindArg::Text(None),
            ColumnType::Int | ColumnType::Bigint => BindArg::Int(None),
            ColumnType::Float => BindArg::Float(None),
            ColumnType::Decimal => BindArg::Decimal(None),
            ColumnType::Boolean => BindArg::Bool(None),
            ColumnType::Json => BindArg::Json(None),
            ColumnType::Uuid => BindArg::Uuid(None),
            ColumnType::Timestamp => BindArg::Timestamptz(None),
            ColumnType::Time => BindArg::Time(None),
            ColumnType::Bytes => BindArg::Bytes(None),
        }
    }

    /// JSON 인자를 컬럼 타입으로 변환 (실패 시 에러 메시지)
    fn from_json(value: &Value, column_type: ColumnType) -> std::result::Result<Self, String> {
        if value.is_null() {
            return Ok(BindArg::null(column_type));
        }

        let converted = match (column_type, value) {
            (ColumnType::String, Value::String(s)) => Some(BindArg::Text(Some(s.clone()))),
            (ColumnType::String, other) => Some(BindArg::Text(Some(other.to_string()))),

            (ColumnType::Int | ColumnType::Bigint, Value::Number(n)) => {
                n.as_i64().map(|v| BindArg::Int(Some(v)))
            }
            (ColumnType::Int | ColumnType::Bigint, Value::String(s)) => {
                s.trim().parse().ok().map(|v| BindArg::Int(Some(v)))
            }

            (ColumnType::Float, Value::Number(n)) => n.as_f64().map(|v| BindArg::Float(Some(v))),
            (ColumnType::Float, Value::String(s)) => {
                s.trim().parse().ok().map(|v| BindArg::Float(Some(v)))
            }

            (ColumnType::Decimal, Value::Number(n)) => parse_decimal(&n.to_string()),
            (ColumnType::Decimal, Value::String(s)) => parse_decimal(s.trim()),

            (ColumnType::Boolean, Value::Bool(b)) => Some(BindArg::Bool(Some(*b))),
            (ColumnType::Boolean, Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Some(BindArg::Bool(Some(true))),
                "false" | "f" | "0" => Some(BindArg::Bool(Some(false))),
                _ => None,
            },

            (ColumnType::Json, other) => Some(BindArg::Json(Some(other.clone()))),

            (ColumnType::Uuid, Value::String(s)) => {
                Uuid::parse_str(s.trim()).ok().map(|v| BindArg::Uuid(Some(v)))
            }

            (ColumnType::Timestamp, Value::String(s)) => parse_timestamp(s.trim()),

            (ColumnType::Time, Value::String(s)) => ["%H:%M:%S%.f", "%H:%M"]
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(s.trim(), fmt).ok())
                .map(|v| BindArg::Time(Some(v))),

            (ColumnType::Bytes, Value::String(s)) => Some(BindArg::Bytes(Some(s.as_bytes().to_vec()))),

            _ => None,
        };

        converted.ok_or_else(|| format!("invalid {} value: {}", column_type, value))
    }

    fn bind<'q>(self, query: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        match self {
            BindArg::Text(v) => query.bind(v),
            BindArg::Int(v) => query.bind(v),
            BindArg::Float(v) => query.bind(v),
            BindArg::Decimal(v) => query.bind(v),
            BindArg::Bool(v) => query.bind(v),
            BindArg::Json(v) => query.bind(v.map(sqlx::types::Json)),
            BindArg::Uuid(v) => query.bind(v),
            BindArg::Timestamptz(v) => query.bind(v),
            BindArg::Timestamp(v) => query.bind(v),
            BindArg::Time(v) => query.bind(v),
            BindArg::Bytes(v) => query.bind(v),
        }
    }
}

fn parse_decimal(raw: &str) -> Option<BindArg> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
        .map(|v| BindArg::Decimal(Some(v)))
}

/// RFC 3339(오프셋 포함)는 timestamptz, 오프셋 없는 값과 날짜는 timestamp로 바인딩
fn parse_timestamp(raw: &str) -> Option<BindArg> {
    if let Ok(v) = DateTime::parse_from_rfc3339(raw) {
        return Some(BindArg::Timestamptz(Some(v.with_timezone(&Utc))));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|v| BindArg::Timestamp(Some(v)))
}

/// 문장의 인자를 모두 변환 (`$n` 번호를 메시지에 포함)
fn bind_args(statement: &BuiltStatement) -> Result<Vec<BindArg>> {
    statement
        .args
        .iter()
        .zip(&statement.types)
        .enumerate()
        .map(|(i, (value, column_type))| {
            BindArg::from_json(value, *column_type).map_err(|message| BridgeError::BadRequest {
                message: format!("argument ${}: {}", i + 1, message),
            })
        })
        .collect()
}

/// NUMERIC → JSON 숫자 (f64로 표현할 수 없으면 문자열)
fn decimal_to_json(value: Decimal) -> Value {
    value
        .to_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

/// 한 행을 JSON 객체로 변환
///
/// 조인 결과에서 같은 이름의 컬럼이 겹치면 뒤의 값이 남습니다.
/// 디코딩에 실패하면 NULL로 바꾸지 않고 에러를 돌려줍니다.
fn row_to_json(row: &PgRow) -> std::result::Result<Value, sqlx::Error> {
    let mut obj = serde_json::Map::new();
    for column in row.columns() {
        let index = column.ordinal();
        let type_name = column.type_info().name().to_ascii_uppercase();
        let value = match type_name.as_str() {
            "INT2" => row.try_get::<Option<i16>, _>(index)?.map(Value::from),
            "INT4" => row.try_get::<Option<i32>, _>(index)?.map(Value::from),
            "INT8" => row.try_get::<Option<i64>, _>(index)?.map(Value::from),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(index)?
                .and_then(|v| Number::from_f64(f64::from(v)))
                .map(Value::Number),
            "FLOAT8" => row
                .try_get::<Option<f64>, _>(index)?
                .and_then(Number::from_f64)
                .map(Value::Number),
            "NUMERIC" => row
                .try_get::<Option<Decimal>, _>(index)?
                .map(decimal_to_json),
            "MONEY" => row
                .try_get::<Option<PgMoney>, _>(index)?
                .map(|v| decimal_to_json(v.to_decimal(2))),
            "BOOL" => row.try_get::<Option<bool>, _>(index)?.map(Value::Bool),
            "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(index)?,
            "UUID" => row
                .try_get::<Option<Uuid>, _>(index)?
                .map(|v| Value::String(v.to_string())),
            "TIMESTAMPTZ" => row
                .try_get::<Option<DateTime<Utc>>, _>(index)?
                .map(|v| Value::String(v.to_rfc3339())),
            "TIMESTAMP" => row
                .try_get::<Option<NaiveDateTime>, _>(index)?
                .map(|v| Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
            "DATE" => row
                .try_get::<Option<NaiveDate>, _>(index)?
                .map(|v| Value::String(v.to_string())),
            "TIME" => row
                .try_get::<Option<NaiveTime>, _>(index)?
                .map(|v| Value::String(v.to_string())),
            // enum, citext 등은 텍스트 표현을 그대로 사용 (UTF-8이 아니면 에러)
            _ => row
                .try_get_unchecked::<Option<String>, _>(index)?
                .map(Value::String),
        }
        .unwrap_or(Value::Null);

        obj.insert(column.name().to_string(), value);
    }
    Ok(Value::Object(obj))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn statement(args: Vec<Value>, types: Vec<ColumnType>) -> BuiltStatement {
        BuiltStatement {
            sql: String::new(),
            args,
            types,
        }
    }

    #[test]
    fn test_null_is_typed_by_column() {
        assert_eq!(
            BindArg::from_json(&Value::Null, ColumnType::Int),
            Ok(BindArg::Int(None))
        );
        assert_eq!(
            BindArg::from_json(&Value::Null, ColumnType::Uuid),
            Ok(BindArg::Uuid(None))
        );
        assert_eq!(
            BindArg::from_json(&Value::Null, ColumnType::Timestamp),
            Ok(BindArg::Timestamptz(None))
        );
        assert_eq!(
            BindArg::from_json(&Value::Null, ColumnType::String),
            Ok(BindArg::Text(None))
        );
    }

    #[test]
    fn test_null_update_payload_on_int_column() {
        // UPDATE authors SET born = $1 WHERE id = $2
        let args = bind_args(&statement(
            vec![Value::Null, json!(1)],
            vec![ColumnType::Int, ColumnType::Int],
        ))
        .unwrap();
        assert_eq!(args, vec![BindArg::Int(None), BindArg::Int(Some(1))]);
    }

    #[test]
    fn test_uuid_binding() {
        let raw = "6f1c7a4e-1b2c-4d3e-8f90-123456789abc";
        assert_eq!(
            BindArg::from_json(&json!(raw), ColumnType::Uuid),
            Ok(BindArg::Uuid(Some(Uuid::parse_str(raw).unwrap())))
        );
        assert!(BindArg::from_json(&json!("not-a-uuid"), ColumnType::Uuid).is_err());
    }

    #[test]
    fn test_timestamp_binding() {
        let with_offset = BindArg::from_json(&json!("2024-03-01T10:30:00+09:00"), ColumnType::Timestamp);
        let expected = DateTime::parse_from_rfc3339("2024-03-01T01:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(with_offset, Ok(BindArg::Timestamptz(Some(expected))));

        let naive = BindArg::from_json(&json!("2024-03-01 10:30:00"), ColumnType::Timestamp);
        assert!(matches!(naive, Ok(BindArg::Timestamp(Some(_)))));

        let date = BindArg::from_json(&json!("2024-03-01"), ColumnType::Timestamp);
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        assert_eq!(date, Ok(BindArg::Timestamp(Some(midnight))));

        assert!(BindArg::from_json(&json!("yesterday"), ColumnType::Timestamp).is_err());
    }

    #[test]
    fn test_time_binding() {
        let parsed = BindArg::from_json(&json!("08:15"), ColumnType::Time);
        assert_eq!(
            parsed,
            Ok(BindArg::Time(NaiveTime::from_hms_opt(8, 15, 0)))
        );
    }

    #[test]
    fn test_numeric_binding() {
        assert_eq!(
            BindArg::from_json(&json!("12.50"), ColumnType::Decimal),
            Ok(BindArg::Decimal(Some(Decimal::new(1250, 2))))
        );
        assert_eq!(
            BindArg::from_json(&json!(3), ColumnType::Decimal),
            Ok(BindArg::Decimal(Some(Decimal::new(3, 0))))
        );
        assert_eq!(
            BindArg::from_json(&json!("42"), ColumnType::Bigint),
            Ok(BindArg::Int(Some(42)))
        );
        assert_eq!(
            BindArg::from_json(&json!(2.5), ColumnType::Float),
            Ok(BindArg::Float(Some(2.5)))
        );
        assert_eq!(
            BindArg::from_json(&json!("t"), ColumnType::Boolean),
            Ok(BindArg::Bool(Some(true)))
        );
    }

    #[test]
    fn test_payload_values_keep_their_json_shape() {
        assert_eq!(
            BindArg::from_json(&json!({"a": 1}), ColumnType::Json),
            Ok(BindArg::Json(Some(json!({"a": 1}))))
        );
        assert_eq!(
            BindArg::from_json(&json!(7), ColumnType::String),
            Ok(BindArg::Text(Some("7".to_string())))
        );
    }

    #[test]
    fn test_mismatched_value_is_bad_request() {
        let err = bind_args(&statement(
            vec![json!("Carson"), json!("abc")],
            vec![ColumnType::String, ColumnType::Int],
        ))
        .unwrap_err();

        match err {
            BridgeError::BadRequest { message } => {
                assert_eq!(message, r#"argument $2: invalid int value: "abc""#)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decimal_to_json() {
        assert_eq!(decimal_to_json(Decimal::new(1250, 2)), json!(12.5));
        assert_eq!(decimal_to_json(Decimal::new(-3, 0)), json!(-3.0));
    }
}
