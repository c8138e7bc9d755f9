//! Bridge 앱 상태

use sqlx::postgres::{PgPool, PgPoolOptions};

use tbl_core::Catalog;

use crate::config::Config;

/// 앱 상태
///
/// 모든 핸들러에서 공유하는 상태입니다.
/// 카탈로그는 기동 시 한 번 만들어지고 이후 변경되지 않으므로 잠금이 필요 없습니다.
pub struct AppState {
    /// 설정
    pub config: Config,

    /// 스키마 카탈로그 (읽기 전용)
    pub catalog: Catalog,

    /// DB Connection Pool
    pub pool: PgPool,
}

impl AppState {
    /// 새 상태 생성 (DB 접속 + 카탈로그 구성)
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        let catalog = crate::catalog::load_catalog(config, &pool).await?;

        Ok(Self::from_parts(config.clone(), catalog, pool))
    }

    /// 이미 준비된 구성요소로 상태 생성
    pub fn from_parts(config: Config, catalog: Catalog, pool: PgPool) -> Self {
        Self {
            config,
            catalog,
            pool,
        }
    }
}
