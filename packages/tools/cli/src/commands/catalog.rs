//! `tbl catalog`

use std::path::Path;

use serde_json::json;
use tbl_core::Catalog;

use crate::OutputFormat;

pub fn run(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let catalog = super::load_catalog(path)?;

    match format {
        OutputFormat::Text => print!("{}", render_text(&catalog)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&render_json(&catalog))?),
    }
    Ok(())
}

fn render_text(catalog: &Catalog) -> String {
    let mut out = format!("{} tables\n", catalog.len());
    for name in catalog.table_names() {
        let columns = catalog.columns(name).unwrap_or_default();
        out.push_str(&format!("- {} ({} columns)\n", name, columns.len()));
        for column in columns {
            out.push_str(&format!("    {}: {}\n", column.name, column.column_type));
        }
    }
    out
}

fn render_json(catalog: &Catalog) -> serde_json::Value {
    let tables: serde_json::Map<_, _> = catalog
        .table_names()
        .into_iter()
        .map(|name| {
            let columns: Vec<_> = catalog
                .columns(name)
                .unwrap_or_default()
                .iter()
                .map(|c| json!({ "name": c.name, "type": c.column_type.as_str() }))
                .collect();
            (name.to_string(), json!({ "columns": columns }))
        })
        .collect();
    json!({ "tables": tables })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tbl_core::schema::{Column, ColumnType, Table};

    fn catalog() -> Catalog {
        Catalog::from_tables(vec![
            Table::new(
                "books",
                vec![
                    Column::new("id", ColumnType::Int),
                    Column::new("title", ColumnType::String),
                ],
            ),
            Table::new("authors", vec![Column::new("id", ColumnType::Bigint)]),
        ])
    }

    #[test]
    fn test_render_text_sorted() {
        let text = render_text(&catalog());
        assert_eq!(
            text,
            "2 tables\n- authors (1 columns)\n    id: bigint\n- books (2 columns)\n    id: int\n    title: string\n"
        );
    }

    #[test]
    fn test_render_json_keeps_column_order() {
        let value = render_json(&catalog());
        assert_eq!(value["tables"]["books"]["columns"][1]["name"], "title");
        assert_eq!(value["tables"]["authors"]["columns"][0]["type"], "bigint");
    }
}
