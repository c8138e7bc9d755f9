//! 컬럼 정의

use serde::{Deserialize, Serialize};

use super::types::ColumnType;

/// 컬럼 정의
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// 컬럼 이름
    pub name: String,

    /// 컬럼 타입
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}
