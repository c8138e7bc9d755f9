//! CLI 명령어

pub mod catalog;
pub mod explain;

use std::path::Path;

use anyhow::Context;
use tbl_core::{Catalog, SchemaParser};

/// 카탈로그 YAML 로드
pub fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file {}", path.display()))?;
    SchemaParser::parse_yaml(&yaml)
        .with_context(|| format!("invalid catalog file {}", path.display()))
}
