//! 本地 SQLite 工具：打开会话数据库并执行 sqlx 迁移
//!
//! 约定：crate 根目录下的 `migrations/` 存放全部迁移 SQL，
//! 由 `sqlx::migrate!()` 管理 schema 升级。

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

/// 打开会话数据库连接池并执行所有未执行的迁移
pub async fn open_session_db(db_url: &str) -> Result<Pool<Sqlite>> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    Ok(pool)
}
