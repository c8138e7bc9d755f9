//! Tabula CLI (`tbl`)
//!
//! DB 없이 쿼리 문자열이 어떤 SQL로 바뀌는지 확인하고 카탈로그 파일을 검증하는 도구입니다.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tbl")]
#[command(author, version, about = "Tabula CLI - query string to SQL inspector", long_about = None)]
struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Method {
    #[default]
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SQL and arguments a request would produce
    Explain {
        /// Catalog YAML file
        #[arg(long)]
        catalog: PathBuf,

        /// HTTP method (GET=select, POST=insert, PATCH/PUT=update, DELETE=delete)
        #[arg(long, value_enum, default_value = "get")]
        method: Method,

        /// JSON body for POST/PATCH/PUT
        #[arg(long)]
        body: Option<String>,

        /// Request path with query string, e.g. "/authors?where=surname==Tolkien"
        path: String,
    },

    /// Validate a catalog file and list its tables
    Catalog {
        /// Catalog YAML file
        #[arg(long)]
        catalog: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Explain {
            catalog,
            method,
            body,
            path,
        } => commands::explain::run(&catalog, method, body.as_deref(), &path, cli.format),
        Commands::Catalog { catalog } => commands::catalog::run(&catalog, cli.format),
    }
}
