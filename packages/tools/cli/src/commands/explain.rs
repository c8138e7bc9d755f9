//! `tbl explain`
//!
//! 브리지가 요청을 처리할 때와 같은 파서/빌더를 거쳐 SQL을 출력합니다. 실행은 하지 않습니다.

use std::path::Path;

use anyhow::{bail, Context};
use serde_json::Value;

use tbl_core::Catalog;
use tbl_sql::{
    row_from_json, rows_from_json, BuiltStatement, DeleteBuilder, InsertBuilder, QueryParser,
    SelectBuilder, UpdateBuilder,
};

use crate::{Method, OutputFormat};

pub fn run(
    catalog_path: &Path,
    method: Method,
    body: Option<&str>,
    path: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let catalog = super::load_catalog(catalog_path)?;
    let statement = explain(&catalog, method, body, path)?;

    match format {
        OutputFormat::Text => {
            let types: Vec<&str> = statement.types.iter().map(|t| t.as_str()).collect();
            println!("SQL:   {}", statement.sql);
            println!("Args:  {}", Value::Array(statement.args));
            println!("Types: [{}]", types.join(", "));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&statement)?),
    }
    Ok(())
}

fn explain(
    catalog: &Catalog,
    method: Method,
    body: Option<&str>,
    path: &str,
) -> anyhow::Result<BuiltStatement> {
    let query = QueryParser::standard().parse_path(path)?;

    let statement = match method {
        Method::Get => SelectBuilder::new(catalog).build(&query)?,
        Method::Post => {
            let rows = rows_from_json(parse_body(body)?)?;
            InsertBuilder::new(catalog).build(&query.table, &rows)?
        }
        Method::Patch | Method::Put => {
            let data = row_from_json(parse_body(body)?)?;
            UpdateBuilder::new(catalog).build(&query, &data)?
        }
        Method::Delete => DeleteBuilder::new(catalog).build(&query)?,
    };

    Ok(statement)
}

fn parse_body(body: Option<&str>) -> anyhow::Result<Value> {
    let Some(body) = body else {
        bail!("--body is required for POST/PATCH/PUT");
    };
    serde_json::from_str(body).context("--body is not valid JSON")
}
