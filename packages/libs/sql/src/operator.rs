//! 필터 연산자 매핑
//!
//! 쿼리 문자열의 기호 연산자(`==`, `=in=`, `=isnull=` ...)를 SQL 연산자로 변환합니다.
//! 토큰 철자는 외부 계약이므로 임의로 바꾸면 안 됩니다.

use std::sync::OnceLock;

use crate::error::{Result, SqlError};

/// SQL 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlOperator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
    /// `<=`
    Lte,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `>`
    Gt,
}

impl SqlOperator {
    /// SQL 텍스트
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlOperator::Eq => "=",
            SqlOperator::Ne => "!=",
            SqlOperator::In => "IN",
            SqlOperator::NotIn => "NOT IN",
            SqlOperator::Like => "LIKE",
            SqlOperator::NotLike => "NOT LIKE",
            SqlOperator::IsNull => "IS NULL",
            SqlOperator::IsNotNull => "IS NOT NULL",
            SqlOperator::Lte => "<=",
            SqlOperator::Gte => ">=",
            SqlOperator::Lt => "<",
            SqlOperator::Gt => ">",
        }
    }

    /// 값 없이 쓰는 NULL 검사 연산자
    pub fn is_null_check(&self) -> bool {
        matches!(self, SqlOperator::IsNull | SqlOperator::IsNotNull)
    }

    /// 값 목록을 괄호로 받는 연산자 (`IN (...)`)
    pub fn is_list(&self) -> bool {
        matches!(self, SqlOperator::In | SqlOperator::NotIn)
    }
}

/// 기호 토큰 → SQL 연산자 (동의어 포함)
const OPERATORS: &[(&str, SqlOperator)] = &[
    ("==", SqlOperator::Eq),
    ("!=", SqlOperator::Ne),
    ("=in=", SqlOperator::In),
    ("=out=", SqlOperator::NotIn),
    ("=like=", SqlOperator::Like),
    ("=notlike=", SqlOperator::NotLike),
    ("=nk=", SqlOperator::NotLike),
    ("=!like=", SqlOperator::NotLike),
    ("=isnull=", SqlOperator::IsNull),
    ("=na=", SqlOperator::IsNull),
    ("=isnotnull=", SqlOperator::IsNotNull),
    ("=notnull=", SqlOperator::IsNotNull),
    ("=nn=", SqlOperator::IsNotNull),
    ("=!null=", SqlOperator::IsNotNull),
    ("<=", SqlOperator::Lte),
    (">=", SqlOperator::Gte),
    ("=le=", SqlOperator::Lte),
    ("=ge=", SqlOperator::Gte),
    ("<", SqlOperator::Lt),
    (">", SqlOperator::Gt),
    ("=lt=", SqlOperator::Lt),
    ("=gt=", SqlOperator::Gt),
];

/// 연산자 테이블
///
/// 토큰을 길이 내림차순으로 정렬해 두어, 같은 위치에서는 항상 가장 긴 토큰이 선택됩니다
/// (`=isnotnull=`이 `=in=` 류 짧은 토큰보다 먼저 검사됨).
#[derive(Debug, Clone)]
pub struct OperatorTable {
    /// (토큰, 연산자), 길이 내림차순
    entries: Vec<(&'static str, SqlOperator)>,
}

/// 매칭된 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorMatch {
    /// 토큰 시작 바이트 위치
    pub start: usize,
    /// 매칭된 토큰
    pub token: &'static str,
    pub operator: SqlOperator,
}

impl OperatorMatch {
    /// 토큰 끝 바이트 위치
    pub fn end(&self) -> usize {
        self.start + self.token.len()
    }
}

impl OperatorTable {
    /// 임의의 토큰 목록으로 테이블 생성
    pub fn new(entries: impl IntoIterator<Item = (&'static str, SqlOperator)>) -> Self {
        let mut entries: Vec<_> = entries.into_iter().collect();
        // 길이가 같으면 토큰 순으로 고정
        entries.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self { entries }
    }

    /// 기본 연산자 테이블 (프로세스 전역, 한 번만 생성)
    pub fn standard() -> &'static OperatorTable {
        static TABLE: OnceLock<OperatorTable> = OnceLock::new();
        TABLE.get_or_init(|| OperatorTable::new(OPERATORS.iter().copied()))
    }

    /// 토큰 조회
    pub fn lookup(&self, token: &str) -> Result<SqlOperator> {
        self.entries
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, op)| *op)
            .ok_or_else(|| SqlError::InvalidOperator {
                condition: token.to_string(),
            })
    }

    /// 조건 문자열에서 연산자 찾기
    ///
    /// 가장 앞선 위치에서 매칭되는 토큰 중 가장 긴 것을 반환합니다.
    pub fn find(&self, condition: &str) -> Option<OperatorMatch> {
        condition.char_indices().find_map(|(start, _)| {
            let rest = &condition[start..];
            self.entries
                .iter()
                .find(|(token, _)| rest.starts_with(token))
                .map(|(token, operator)| OperatorMatch {
                    start,
                    token: *token,
                    operator: *operator,
                })
        })
    }

    /// 등록된 모든 토큰 (길이 내림차순)
    pub fn tokens(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        OperatorTable::standard().clone()
    }
}
