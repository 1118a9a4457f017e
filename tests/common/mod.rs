//! 集成测试公共工具：内存网关 + 临时会话数据库组装客户端

use doctruyen_sdk_core_rust::reader::gateway::DocumentGateway;
use doctruyen_sdk_core_rust::{ClientConfig, MemoryGateway, ReaderClient};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

/// 组装一个跑在内存网关上的客户端；TempDir 需要调用方持有到测试结束
pub async fn memory_client() -> (ReaderClient, Arc<MemoryGateway>, TempDir) {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let db_path = dir.path().join("session.db");
    let config = ClientConfig {
        // 指向不可达端口：账号服务在这些测试里必须是可失败的
        api_base_url: "http://127.0.0.1:9".to_string(),
        store_base_url: "http://127.0.0.1:9".to_string(),
        session_db_url: format!("sqlite://{}?mode=rwc", db_path.display()),
    };

    let gateway = Arc::new(MemoryGateway::new());
    let dyn_gateway: Arc<dyn DocumentGateway> = gateway.clone();
    let client = ReaderClient::connect_with_gateway(config, dyn_gateway)
        .await
        .expect("组装客户端失败");
    (client, gateway, dir)
}

/// 预置一个测试用户文档
pub async fn seed_user(gateway: &MemoryGateway, user_id: &str) {
    gateway
        .seed(
            "Users",
            user_id,
            json!({
                "id": user_id,
                "username": "tester",
                "email": "tester@example.com",
                "creationIdList": [],
                "libraryBookIdList": [],
                "notificationList": [],
            }),
        )
        .await;
}

/// 预置一本作品
pub async fn seed_book(gateway: &MemoryGateway, book_id: &str, title: &str, genre: &str) {
    gateway
        .seed(
            "Books",
            book_id,
            json!({
                "bookId": book_id,
                "title": title,
                "author": "tác giả",
                "type": "sách chữ",
                "genreList": [genre],
                "language": "Tiếng Việt",
                "progressStatus": "đang cập nhật",
                "publishDate": "1/1/2025",
                "lastUpdateDate": "1/1/2025",
                "readCount": 10,
            }),
        )
        .await;
}

/// 预置一个章节
pub async fn seed_chapter(gateway: &MemoryGateway, chapter_id: &str, book_id: &str, num: u32) {
    gateway
        .seed(
            "Chapters",
            chapter_id,
            json!({
                "chapterId": chapter_id,
                "bookId": book_id,
                "chapterNum": num,
                "chapterTitle": format!("Chương {num}"),
                "chapterContent": "nội dung",
                "publishDate": "1/1/2025",
                "lastUpdateDate": "1/1/2025",
            }),
        )
        .await;
}
