//! 논리적 컬럼 타입 정의
//!
//! DB가 보고하는 타입 이름을 엔진 독립적인 논리 타입으로 정규화합니다.
//! 쿼리 문자열의 값은 모두 문자열로 들어오므로, 바인딩 직전에
//! 이 타입을 기준으로 JSON 값으로 변환됩니다.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 논리적 컬럼 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// 문자열 (VARCHAR/TEXT 등, 알 수 없는 타입 포함)
    #[default]
    String,

    /// 32비트 이하 정수
    Int,

    /// 64비트 정수
    Bigint,

    /// 부동소수점
    Float,

    /// 고정 소수점 (NUMERIC)
    Decimal,

    /// 불리언
    Boolean,

    /// JSON/JSONB
    Json,

    /// 타임스탬프/날짜
    Timestamp,

    /// 시각 (TIME)
    Time,

    /// UUID
    Uuid,

    /// 바이트 배열 (BYTEA)
    Bytes,
}

impl ColumnType {
    /// 카탈로그 파일의 타입 문자열에서 파싱
    pub fn from_simple_str(s: &str) -> Option<Self> {
        match s {
            "string" | "text" => Some(ColumnType::String),
            "int" | "integer" => Some(ColumnType::Int),
            "bigint" => Some(ColumnType::Bigint),
            "float" | "double" => Some(ColumnType::Float),
            "decimal" | "numeric" => Some(ColumnType::Decimal),
            "boolean" | "bool" => Some(ColumnType::Boolean),
            "json" | "jsonb" => Some(ColumnType::Json),
            "timestamp" | "date" => Some(ColumnType::Timestamp),
            "time" => Some(ColumnType::Time),
            "uuid" => Some(ColumnType::Uuid),
            "bytes" => Some(ColumnType::Bytes),
            _ => None,
        }
    }

    /// Postgres `information_schema.columns.data_type` 값에서 변환
    ///
    /// 매핑되지 않는 타입(enum, 사용자 정의 타입 등)은 문자열로 취급합니다.
    pub fn from_db_type(data_type: &str) -> Self {
        match data_type.to_ascii_lowercase().as_str() {
            "smallint" | "integer" | "int2" | "int4" => ColumnType::Int,
            "bigint" | "int8" => ColumnType::Bigint,
            "real" | "double precision" | "float4" | "float8" => ColumnType::Float,
            "numeric" | "decimal" | "money" => ColumnType::Decimal,
            "boolean" | "bool" => ColumnType::Boolean,
            "json" | "jsonb" => ColumnType::Json,
            "uuid" => ColumnType::Uuid,
            "bytea" => ColumnType::Bytes,
            t if t.starts_with("timestamp") || t == "date" => ColumnType::Timestamp,
            t if t.starts_with("time") => ColumnType::Time,
            _ => ColumnType::String,
        }
    }

    /// 카탈로그 파일에서 사용하는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Int => "int",
            ColumnType::Bigint => "bigint",
            ColumnType::Float => "float",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::Json => "json",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Time => "time",
            ColumnType::Uuid => "uuid",
            ColumnType::Bytes => "bytes",
        }
    }

    /// 쿼리 문자열 값을 바인딩 값으로 변환
    ///
    /// 파싱에 실패한 값은 문자열 그대로 남깁니다 (실행 단계에서 타입 검사).
    /// NUMERIC은 정밀도를 잃지 않도록 문자열 그대로 둡니다.
    pub fn coerce(&self, raw: &str) -> Value {
        match self {
            ColumnType::Int | ColumnType::Bigint => raw
                .parse::<i64>()
                .map(|v| Value::Number(v.into()))
                .unwrap_or_else(|_| Value::String(raw.to_string())),
            ColumnType::Float => raw
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(raw.to_string())),
            ColumnType::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Value::Bool(true),
                "false" | "f" | "0" => Value::Bool(false),
                _ => Value::String(raw.to_string()),
            },
            _ => Value::String(raw.to_string()),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_type_parsing() {
        assert_eq!(ColumnType::from_simple_str("string"), Some(ColumnType::String));
        assert_eq!(ColumnType::from_simple_str("int"), Some(ColumnType::Int));
        assert_eq!(ColumnType::from_simple_str("bigint"), Some(ColumnType::Bigint));
        assert_eq!(ColumnType::from_simple_str("bool"), Some(ColumnType::Boolean));
        assert_eq!(ColumnType::from_simple_str("unknown"), None);
    }

    #[test]
    fn test_db_type_mapping() {
        assert_eq!(ColumnType::from_db_type("integer"), ColumnType::Int);
        assert_eq!(ColumnType::from_db_type("BIGINT"), ColumnType::Bigint);
        assert_eq!(ColumnType::from_db_type("character varying"), ColumnType::String);
        assert_eq!(
            ColumnType::from_db_type("timestamp with time zone"),
            ColumnType::Timestamp
        );
        assert_eq!(ColumnType::from_db_type("date"), ColumnType::Timestamp);
        assert_eq!(
            ColumnType::from_db_type("time without time zone"),
            ColumnType::Time
        );
        assert_eq!(ColumnType::from_db_type("USER-DEFINED"), ColumnType::String);
    }

    #[test]
    fn test_coerce_values() {
        assert_eq!(ColumnType::Int.coerce("1984"), Value::Number(1984.into()));
        assert_eq!(ColumnType::Int.coerce("abc"), Value::String("abc".to_string()));
        assert_eq!(ColumnType::Boolean.coerce("t"), Value::Bool(true));
        assert_eq!(ColumnType::Boolean.coerce("FALSE"), Value::Bool(false));
        assert_eq!(ColumnType::String.coerce("42"), Value::String("42".to_string()));
        assert!(ColumnType::Float.coerce("2.5").is_f64());
        assert_eq!(
            ColumnType::Decimal.coerce("12.50"),
            Value::String("12.50".to_string())
        );
    }
}
