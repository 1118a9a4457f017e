//! DocTruyen CLI 客户端（测试版）
//!
//! 非交互式 CLI，用于测试和展示 SDK 功能：登录后拉取作品/书架/通知并打印摘要。
//! `--offline` 模式使用预置数据的内存网关，不依赖任何服务。

use anyhow::Result;
use clap::Parser;
use doctruyen_sdk_core_rust::reader::account::AccountListener;
use doctruyen_sdk_core_rust::reader::gateway::{collections, DocumentGateway, MemoryGateway};
use doctruyen_sdk_core_rust::reader::serialization::{
    encode_cover_data_uri, format_compact_number,
};
use doctruyen_sdk_core_rust::{ClientConfig, ReaderClient};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// DocTruyen CLI 客户端
#[derive(Parser, Debug)]
#[command(name = "doctruyen-cli")]
#[command(about = "DocTruyen CLI 客户端 - 用于测试和展示 SDK 功能", long_about = None)]
struct Args {
    /// 登录邮箱
    #[arg(short, long, default_value = "")]
    email: String,

    /// 登录密码
    #[arg(short, long, default_value = "")]
    password: String,

    /// 离线演示模式（内存网关 + 预置数据，不访问网络）
    #[arg(long)]
    offline: bool,

    /// 日志级别（默认: info,doctruyen_sdk_core_rust=debug）
    #[arg(long, default_value = "info,doctruyen_sdk_core_rust=debug")]
    log_level: String,
}

/// 初始化日志（同时输出到 stdout 和文件）
fn init_logger(log_level: &str) {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // 创建日志文件（追加模式）
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("无法创建日志文件 debug.log");

    // 输出到 stdout（控制台），保留 ANSI 颜色代码用于终端显示
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(true);

    // 输出到文件，禁用 ANSI 颜色代码
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("[CLI] 📝 日志已同时输出到控制台和文件: debug.log");
}

/// 往内存网关预置一份演示数据
async fn seed_demo_data(gateway: &MemoryGateway) {
    gateway
        .seed(
            collections::USERS,
            "demo-user",
            json!({
                "id": "demo-user",
                "username": "demo",
                "email": "demo@example.com",
                "creationIdList": ["bk-van-lang"],
                "libraryBookIdList": ["bk-van-lang", "bk-song-nui"],
                "currentBookId": "bk-van-lang",
                "currentBookChapterNum": 2,
                "notificationList": [
                    "Chương mới đã lên kệ~2025-10-22T03:00:00Z",
                    "Tác giả vừa cập nhật~2025-10-01T12:30:00Z",
                ],
            }),
        )
        .await;

    gateway
        .seed(
            collections::BOOKS,
            "bk-van-lang",
            json!({
                "bookId": "bk-van-lang",
                "title": "Văn Lang Dị Sử",
                "author": "Lạc Long",
                "cover": encode_cover_data_uri("image/png", b"demo-cover"),
                "type": "sách chữ",
                "genreList": ["GIẢ TƯỞNG"],
                "language": "Tiếng Việt",
                "progressStatus": "đang cập nhật",
                "publishDate": { "seconds": 1735689600i64, "nanos": 0 },
                "lastUpdateDate": { "seconds": 1742925600i64, "nanos": 0 },
                "readCount": 1200,
                "totalView": 34000,
            }),
        )
        .await;
    gateway
        .seed(
            collections::BOOKS,
            "bk-song-nui",
            json!({
                "bookId": "bk-song-nui",
                "title": "Sông Núi Ngàn Năm",
                "author": "Âu Cơ",
                "type": "truyện tranh",
                "genreList": ["LỊCH SỬ"],
                "language": "Tiếng Việt",
                "progressStatus": "hoàn tất",
                "publishDate": "1/6/2024",
                "lastUpdateDate": "20/9/2025",
                "readCount": 560,
            }),
        )
        .await;

    for (num, title) in [(2u32, "Trống đồng"), (1u32, "Khởi nguyên")] {
        gateway
            .seed(
                collections::CHAPTERS,
                &format!("ch-van-lang-{num}"),
                json!({
                    "chapterId": format!("ch-van-lang-{num}"),
                    "bookId": "bk-van-lang",
                    "chapterNum": num,
                    "chapterTitle": title,
                    "chapterContent": "…",
                    "publishDate": "1/1/2025",
                    "lastUpdateDate": "1/1/2025",
                }),
            )
            .await;
    }

    gateway
        .seed(
            collections::REVIEWS,
            "rv-1",
            json!({
                "id": "rv-1",
                "bookId": "bk-van-lang",
                "reviewer": "bạn đọc",
                "reviewerId": "reader-2",
                "reviewText": "Rất cuốn!",
                "type": "positive",
                "reviewDate": "2/3/2025",
            }),
        )
        .await;
}

/// 账号事件打印
struct CliAccountListener;

#[async_trait::async_trait]
impl AccountListener for CliAccountListener {
    async fn on_login(&self, user_json: String) {
        info!("[CLI/Account] 🔐 登录: {}", user_json);
    }

    async fn on_session_restored(&self, user_json: String) {
        info!("[CLI/Account] ♻️ 会话恢复: {}", user_json);
    }

    async fn on_profile_updated(&self, user_json: String) {
        info!("[CLI/Account] 📝 资料更新: {}", user_json);
    }

    async fn on_logout(&self) {
        info!("[CLI/Account] 👋 已登出");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level);

    info!("[CLI] 🚀 DocTruyen CLI 客户端（测试模式）");

    let config = ClientConfig::new();
    let client = if args.offline {
        info!("[CLI] 📦 离线演示模式");
        let gateway = MemoryGateway::new();
        seed_demo_data(&gateway).await;
        let gateway: Arc<dyn DocumentGateway> = Arc::new(gateway);
        ReaderClient::connect_with_gateway(config, gateway).await?
    } else {
        ReaderClient::connect(config).await?
    };

    client.set_account_listener(Arc::new(CliAccountListener)).await;

    // 建立会话：离线走存储账号，在线走账号服务
    if args.offline {
        client
            .account
            .login_with_store_account("demo-user")
            .await
            .map_err(|e| anyhow::anyhow!("登录失败: {}", e))?;
    } else if !client.account.state().await.is_login {
        client
            .account
            .login(&args.email, &args.password)
            .await
            .map_err(|e| anyhow::anyhow!("登录失败: {}", e))?;
    }

    let account = client.account.state().await;
    info!(
        "[CLI] 👤 用户: {}，创作 {} 本，书架 {} 本",
        account.username.as_deref().unwrap_or("?"),
        account.creation_id_list.len(),
        account.library_book_id_list.len()
    );

    // 作品与章节摘要
    let books = client.books.fetch_all().await.unwrap_or_default();
    info!("[CLI] 📚 作品总数: {}", books.len());
    for book in client.books.top_books(5).await {
        info!(
            "[CLI]   - {} | {} | {} lượt đọc",
            book.title,
            book.author,
            format_compact_number(book.effective_views())
        );
    }

    client.chapters.fetch_all().await.ok();
    for (book_id, count) in client.chapters.chapter_counts().await {
        info!("[CLI]   {} 共 {} 章", book_id, count);
    }

    // 书架
    if !account.library_book_id_list.is_empty() {
        let library = client
            .account
            .fetch_library_books(&account.library_book_id_list)
            .await
            .unwrap_or_default();
        info!("[CLI] 🔖 书架（共 {} 本）:", library.len());
        for book in &library {
            info!("[CLI]   - {} ({})", book.title, book.progress_status);
        }
    }

    // 阅读进度
    if let Some(book) = client.account.fetch_current_book().await? {
        let chapters = client.account.fetch_chapters_of_current_book().await?;
        info!(
            "[CLI] 📖 đang đọc: {} (第 {} 章 / 共 {} 章)",
            book.title,
            account.current_chapter_num.unwrap_or(0),
            chapters.len()
        );
    }

    // 通知分组
    client.load_notifications().await;
    let notifications = client.notifications.state().await;
    for group in &notifications.grouped {
        info!("[CLI] 🔔 {}:", group.title);
        for item in &group.items {
            info!("[CLI]   [{}] {}", item.time, item.text);
        }
    }

    info!("[CLI] 👋 演示结束");
    Ok(())
}
