//! 客户端核心实现模块
//!
//! 组装网关、会话存储、四个领域缓存与账号聚合，并负责启动时的会话恢复。

use crate::reader::account::{AccountAggregate, AccountListener};
use crate::reader::auth::AuthApi;
use crate::reader::book::BookCache;
use crate::reader::chapter::ChapterCache;
use crate::reader::db::open_session_db;
use crate::reader::gateway::{DocumentGateway, RestDocumentGateway};
use crate::reader::notification::NotificationCache;
use crate::reader::review::ReviewCache;
use crate::reader::session::SessionStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// 客户端配置
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// 账号 REST 服务基础地址
    pub api_base_url: String,
    /// 文档存储服务基础地址
    pub store_base_url: String,
    /// 会话存储使用的本地 SQLite 数据库 URL
    ///
    /// 例如：`sqlite://doctruyen_session.db?mode=rwc`
    pub session_db_url: String,
}

impl ClientConfig {
    /// 创建默认配置（可被环境变量覆盖）
    pub fn new() -> Self {
        Self {
            api_base_url: std::env::var("DOCTRUYEN_API_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            store_base_url: std::env::var("DOCTRUYEN_STORE_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            session_db_url: std::env::var("DOCTRUYEN_SESSION_DB")
                .unwrap_or_else(|_| "sqlite://doctruyen_session.db?mode=rwc".to_string()),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// 阅读客户端
///
/// 每个缓存各自维护 loading/error，互相之间没有全局锁；
/// 视图层读取具体缓存的快照，并通过各缓存定义的操作发起变更。
pub struct ReaderClient {
    pub config: ClientConfig,
    pub books: Arc<BookCache>,
    pub chapters: Arc<ChapterCache>,
    pub reviews: Arc<ReviewCache>,
    pub notifications: Arc<NotificationCache>,
    pub account: Arc<AccountAggregate>,
}

impl ReaderClient {
    /// 使用 REST 文档存储网关连接
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let http_client = reqwest::ClientBuilder::new()
            .build()
            .context("创建 HTTP 客户端失败")?;
        let gateway: Arc<dyn DocumentGateway> = Arc::new(RestDocumentGateway::new(
            http_client,
            config.store_base_url.clone(),
        ));
        Self::connect_with_gateway(config, gateway).await
    }

    /// 使用自定义文档网关连接（测试/离线演示用内存网关）
    pub async fn connect_with_gateway(
        config: ClientConfig,
        gateway: Arc<dyn DocumentGateway>,
    ) -> Result<Self> {
        info!("[Client] 🔗 打开会话数据库: {}", config.session_db_url);
        let pool = open_session_db(&config.session_db_url)
            .await
            .context(format!(
                "连接SQLite数据库失败: {}",
                config.session_db_url
            ))?;
        let session = Arc::new(SessionStore::new(pool));

        let auth_http = reqwest::ClientBuilder::new()
            .build()
            .context("创建 HTTP 客户端失败")?;
        let auth = AuthApi::new(auth_http, config.api_base_url.clone());

        let client = Self {
            books: Arc::new(BookCache::new(gateway.clone())),
            chapters: Arc::new(ChapterCache::new(gateway.clone())),
            reviews: Arc::new(ReviewCache::new(gateway.clone())),
            notifications: Arc::new(NotificationCache::new()),
            account: Arc::new(AccountAggregate::new(gateway, auth, session)),
            config,
        };

        // 启动时尝试恢复本地会话；失败不阻断启动
        if let Err(e) = client.account.restore_session().await {
            warn!("[Client] 会话恢复失败: {}", e);
        }

        Ok(client)
    }

    /// 注册账号监听器
    pub async fn set_account_listener(&self, listener: Arc<dyn AccountListener>) {
        self.account.set_listener(listener).await;
    }

    /// 把账号状态里的通知列表灌入通知缓存
    /// （唯一的跨切片读取，显式走这里）
    pub async fn load_notifications(&self) {
        let notification_list = self.account.state().await.notification_list;
        self.notifications.load(&notification_list).await;
    }
}
