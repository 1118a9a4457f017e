//! 会话持久化层
//!
//! 登录成功后把用户资料和 bearer token 写入本地 SQLite（固定两个 key），
//! 应用重启时读回，登出时一并删除。两次写入顺序执行、不走事务：
//! 第二次写入失败时第一次不回滚（与来源一致的已知缺口）。

use crate::reader::account::User;
use anyhow::{Context, Result};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info};

const USER_KEY: &str = "user";
const TOKEN_KEY: &str = "token";

/// 恢复出的会话内容
#[derive(Debug, Clone)]
pub struct StoredSession {
    pub user: User,
    pub token: String,
}

/// 会话存储（基于 sqlx）
pub struct SessionStore {
    db: Pool<Sqlite>,
}

impl SessionStore {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO local_session (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await
        .context(format!("写入会话 key 失败: {}", key))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query(r#"SELECT value FROM local_session WHERE key = ?"#)
            .bind(key)
            .fetch_optional(&self.db)
            .await
            .context(format!("读取会话 key 失败: {}", key))?;
        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    /// 持久化会话（user + token 两个 key）
    pub async fn persist(&self, user: &User, token: &str) -> Result<()> {
        let user_json = serde_json::to_string(user).context("序列化用户资料失败")?;
        self.put(USER_KEY, &user_json).await?;
        self.put(TOKEN_KEY, token).await?;
        info!("[Session] 💾 会话已持久化, 用户: {}", user.id);
        Ok(())
    }

    /// 启动时恢复会话；两个 key 齐全且用户资料可解析时才返回 Some
    pub async fn restore(&self) -> Result<Option<StoredSession>> {
        let user_json = self.get(USER_KEY).await?;
        let token = self.get(TOKEN_KEY).await?;

        match (user_json, token) {
            (Some(user_json), Some(token)) => {
                let user: User =
                    serde_json::from_str(&user_json).context("解析已存储的用户资料失败")?;
                debug!("[Session] 恢复会话成功, 用户: {}", user.id);
                Ok(Some(StoredSession { user, token }))
            }
            _ => {
                debug!("[Session] 本地无完整会话");
                Ok(None)
            }
        }
    }

    /// 仅更新用户资料（资料本地合并后回写）
    pub async fn persist_user(&self, user: &User) -> Result<()> {
        let user_json = serde_json::to_string(user).context("序列化用户资料失败")?;
        self.put(USER_KEY, &user_json).await
    }

    /// 读取已保存的 token
    pub async fn token(&self) -> Result<Option<String>> {
        self.get(TOKEN_KEY).await
    }

    /// 登出时清除两个 key
    pub async fn clear(&self) -> Result<()> {
        sqlx::query(r#"DELETE FROM local_session WHERE key IN (?, ?)"#)
            .bind(USER_KEY)
            .bind(TOKEN_KEY)
            .execute(&self.db)
            .await
            .context("清除会话失败")?;
        info!("[Session] 🧹 会话已清除");
        Ok(())
    }
}
