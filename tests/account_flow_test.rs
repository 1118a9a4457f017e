//! 账号聚合的集成测试（内存网关 + 临时会话库）

mod common;

use common::{memory_client, seed_book, seed_chapter, seed_user};
use doctruyen_sdk_core_rust::DocumentGateway;
use serde_json::json;

#[tokio::test]
async fn store_account_login_populates_the_projection() {
    let (client, gateway, _dir) = memory_client().await;
    gateway
        .seed(
            "Users",
            "u1",
            json!({
                "id": "u1",
                "username": "banDoc",
                "creationIdList": ["bk-a"],
                "libraryBookIdList": ["bk-b"],
                "currentBookId": "bk-b",
                "currentBookChapterNum": 3,
                "notificationList": ["xin chào~2025-01-01T00:00:00Z"],
            }),
        )
        .await;

    client.account.login_with_store_account("u1").await.unwrap();

    let state = client.account.state().await;
    assert!(state.is_login);
    assert_eq!(state.username.as_deref(), Some("banDoc"));
    assert_eq!(state.creation_id_list, vec!["bk-a"]);
    assert_eq!(state.library_book_id_list, vec!["bk-b"]);
    assert_eq!(state.current_book_id.as_deref(), Some("bk-b"));
    assert_eq!(state.current_chapter_num, Some(3));
    assert_eq!(state.notification_list.len(), 1);
}

#[tokio::test]
async fn adding_twice_keeps_the_library_a_set() {
    let (client, gateway, _dir) = memory_client().await;
    seed_user(&gateway, "u1").await;
    client.account.login_with_store_account("u1").await.unwrap();

    client.account.add_to_library("bk1").await.unwrap();
    client.account.add_to_library("bk1").await.unwrap();

    let state = client.account.state().await;
    assert_eq!(state.library_book_id_list, vec!["bk1"]);

    // 服务端同样是集合语义
    let user_doc = gateway.get_by_id("Users", "u1").await.unwrap();
    assert_eq!(user_doc["libraryBookIdList"], json!(["bk1"]));
}

#[tokio::test]
async fn removing_an_absent_book_is_a_no_op() {
    let (client, gateway, _dir) = memory_client().await;
    seed_user(&gateway, "u1").await;
    client.account.login_with_store_account("u1").await.unwrap();

    client.account.remove_from_library("chua-tung-co").await.unwrap();
    let state = client.account.state().await;
    assert!(state.library_book_id_list.is_empty());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn library_requires_login() {
    let (client, _gateway, _dir) = memory_client().await;
    let result = client.account.add_to_library("bk1").await;
    assert!(result.is_err());
    assert_eq!(
        client.account.state().await.error.as_deref(),
        Some("You need to login")
    );
}

#[tokio::test]
async fn logout_resets_every_account_scoped_field() {
    let (client, gateway, _dir) = memory_client().await;
    seed_user(&gateway, "u1").await;
    seed_book(&gateway, "bk1", "một", "A").await;
    seed_book(&gateway, "bk2", "hai", "B").await;
    client.account.login_with_store_account("u1").await.unwrap();

    client.account.add_to_library("bk1").await.unwrap();
    client.account.add_to_library("bk2").await.unwrap();
    client.account.set_current_position("bk1", 4).await.unwrap();
    client
        .account
        .fetch_library_books(&["bk1".to_string(), "bk2".to_string()])
        .await
        .unwrap();

    client.account.logout().await.unwrap();

    let state = client.account.state().await;
    assert!(!state.is_login);
    assert!(state.user.is_none());
    assert!(state.username.is_none());
    assert!(state.creation_id_list.is_empty());
    assert!(state.library_book_id_list.is_empty());
    assert!(state.library_book_list.is_empty());
    assert!(state.current_book_id.is_none());
    assert!(state.current_chapter_num.is_none());
    assert!(state.current_book.is_none());
    assert!(state.chapters_of_current_book.is_empty());
    assert!(state.notification_list.is_empty());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn profile_update_degrades_to_local_merge_when_rest_fails() {
    // 账号服务指向不可达端口（见 common::memory_client）
    let (client, gateway, _dir) = memory_client().await;
    seed_user(&gateway, "u1").await;
    client.account.login_with_store_account("u1").await.unwrap();

    let updated = client
        .account
        .update_profile(json!({ "username": "X" }))
        .await
        .unwrap();
    assert_eq!(updated.username.as_deref(), Some("X"));

    let state = client.account.state().await;
    assert_eq!(
        state.user.as_ref().unwrap().username.as_deref(),
        Some("X")
    );
    assert_eq!(state.username.as_deref(), Some("X"));
}

#[tokio::test]
async fn profile_update_without_a_user_is_a_validation_error() {
    let (client, _gateway, _dir) = memory_client().await;
    let result = client.account.update_profile(json!({ "username": "X" })).await;
    assert!(result.is_err());
    assert_eq!(
        client.account.state().await.error.as_deref(),
        Some("Không tìm thấy người dùng!")
    );
}

#[tokio::test]
async fn reading_position_is_local_first_and_persisted() {
    let (client, gateway, _dir) = memory_client().await;
    seed_user(&gateway, "u1").await;
    seed_book(&gateway, "bk1", "một", "A").await;
    client.account.login_with_store_account("u1").await.unwrap();

    client.account.set_current_position("bk1", 2).await.unwrap();

    let state = client.account.state().await;
    assert_eq!(state.current_book_id.as_deref(), Some("bk1"));
    assert_eq!(state.current_chapter_num, Some(2));

    let user_doc = gateway.get_by_id("Users", "u1").await.unwrap();
    assert_eq!(user_doc["currentBookId"], json!("bk1"));
    assert_eq!(user_doc["currentBookChapterNum"], json!(2));
}

#[tokio::test]
async fn current_book_fetch_skips_when_already_cached() {
    let (client, gateway, _dir) = memory_client().await;
    seed_user(&gateway, "u1").await;
    seed_book(&gateway, "bk1", "bản đầu", "A").await;
    client.account.login_with_store_account("u1").await.unwrap();
    client.account.set_current_position("bk1", 1).await.unwrap();

    let first = client.account.fetch_current_book().await.unwrap().unwrap();
    assert_eq!(first.title, "bản đầu");

    // 服务端标题变了，但指针未变：防冗余守卫直接用缓存
    seed_book(&gateway, "bk1", "bản mới", "A").await;
    let second = client.account.fetch_current_book().await.unwrap().unwrap();
    assert_eq!(second.title, "bản đầu");

    // 指针切到别的书会重新拉取
    seed_book(&gateway, "bk2", "sách khác", "A").await;
    client.account.set_current_position("bk2", 1).await.unwrap();
    let third = client.account.fetch_current_book().await.unwrap().unwrap();
    assert_eq!(third.title, "sách khác");
}

#[tokio::test]
async fn chapters_of_current_book_are_cached_and_sorted() {
    let (client, gateway, _dir) = memory_client().await;
    seed_user(&gateway, "u1").await;
    seed_book(&gateway, "bk1", "một", "A").await;
    seed_chapter(&gateway, "c2", "bk1", 2).await;
    seed_chapter(&gateway, "c1", "bk1", 1).await;
    client.account.login_with_store_account("u1").await.unwrap();
    client.account.set_current_position("bk1", 1).await.unwrap();

    let chapters = client.account.fetch_chapters_of_current_book().await.unwrap();
    let nums: Vec<u32> = chapters.iter().map(|c| c.chapter_num).collect();
    assert_eq!(nums, vec![1, 2]);

    // 已缓存：服务端新章不会出现在第二次调用里
    seed_chapter(&gateway, "c3", "bk1", 3).await;
    let cached = client.account.fetch_chapters_of_current_book().await.unwrap();
    assert_eq!(cached.len(), 2);
}

#[tokio::test]
async fn creation_draft_commits_book_and_first_chapter() {
    let (client, gateway, _dir) = memory_client().await;
    seed_user(&gateway, "u1").await;
    client.account.login_with_store_account("u1").await.unwrap();

    let (book_id, chapter_id) = client.account.init_new_creation().await;
    client
        .account
        .edit_new_creation(|book| {
            book.title = "Tân tác phẩm".to_string();
            book.author = "tester".to_string();
            book.book_type = "sách chữ".to_string();
            book.genre_list = vec!["GIẢ TƯỞNG".to_string()];
        })
        .await;
    client
        .account
        .edit_new_creation_chapter(|chapter| {
            chapter.chapter_title = Some("Mở đầu".to_string());
            chapter.chapter_content = "Ngày xửa ngày xưa".to_string();
        })
        .await;

    // 草稿阶段：id 已进本地创作列表，状态为连载中
    let state = client.account.state().await;
    assert!(state.creation_id_list.contains(&book_id));
    assert_eq!(state.new_creation.progress_status, "đang cập nhật");
    assert_eq!(state.new_creation_chapter.chapter_num, 1);

    client.account.upload_new_creation().await.unwrap();

    let book_doc = gateway.get_by_id("Books", &book_id).await.unwrap();
    assert_eq!(book_doc["title"], json!("Tân tác phẩm"));
    let chapter_doc = gateway.get_by_id("Chapters", &chapter_id).await.unwrap();
    assert_eq!(chapter_doc["bookId"], json!(book_id));
    assert_eq!(chapter_doc["chapterNum"], json!(1));
    assert!(!client.account.state().await.uploading);
}

#[tokio::test]
async fn deleting_a_book_cascades_to_its_chapters() {
    let (client, gateway, _dir) = memory_client().await;
    seed_book(&gateway, "bk1", "một", "A").await;
    seed_chapter(&gateway, "c1", "bk1", 1).await;
    seed_chapter(&gateway, "c2", "bk1", 2).await;
    seed_chapter(&gateway, "khac", "bk2", 1).await;

    client.account.delete_book_and_chapters("bk1").await.unwrap();

    assert!(gateway.get_by_id("Books", "bk1").await.is_err());
    assert!(gateway.get_by_id("Chapters", "c1").await.is_err());
    assert!(gateway.get_by_id("Chapters", "c2").await.is_err());
    // 其他书的章节不受影响
    assert!(gateway.get_by_id("Chapters", "khac").await.is_ok());
}

#[tokio::test]
async fn deleting_a_chapter_leaves_the_parent_book_alone() {
    let (client, gateway, _dir) = memory_client().await;
    seed_book(&gateway, "bk1", "một", "A").await;
    seed_chapter(&gateway, "c1", "bk1", 1).await;

    let before = gateway.get_by_id("Books", "bk1").await.unwrap();
    client.account.delete_chapter("c1").await.unwrap();

    assert!(gateway.get_by_id("Chapters", "c1").await.is_err());
    let after = gateway.get_by_id("Books", "bk1").await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn editing_a_chapter_bumps_both_last_update_dates() {
    let (client, gateway, _dir) = memory_client().await;
    seed_book(&gateway, "bk1", "một", "A").await;
    seed_chapter(&gateway, "c1", "bk1", 1).await;

    client
        .account
        .update_chapter("c1", "bk1", "tiêu đề mới", "nội dung mới")
        .await
        .unwrap();

    let chapter_doc = gateway.get_by_id("Chapters", "c1").await.unwrap();
    assert_eq!(chapter_doc["chapterTitle"], json!("tiêu đề mới"));
    assert!(chapter_doc["lastUpdateDate"].is_object());
    let book_doc = gateway.get_by_id("Books", "bk1").await.unwrap();
    assert!(book_doc["lastUpdateDate"].is_object());
}

#[tokio::test]
async fn appending_a_chapter_does_not_touch_the_parent_book() {
    let (client, gateway, _dir) = memory_client().await;
    seed_book(&gateway, "bk1", "một", "A").await;

    let chapter_id = client.account.init_new_chapter("bk1", 2).await;
    client
        .account
        .edit_new_creation_chapter(|chapter| {
            chapter.chapter_content = "chương mới".to_string();
        })
        .await;
    client.account.upload_new_chapter().await.unwrap();

    assert!(gateway.get_by_id("Chapters", &chapter_id).await.is_ok());
    // 父作品的 lastUpdateDate 保持原样（与编辑章节的契约不同）
    let book_doc = gateway.get_by_id("Books", "bk1").await.unwrap();
    assert_eq!(book_doc["lastUpdateDate"], json!("1/1/2025"));
}

#[tokio::test]
async fn unknown_update_field_is_a_logged_no_op() {
    let (client, gateway, _dir) = memory_client().await;
    seed_book(&gateway, "bk1", "một", "A").await;
    let before = gateway.get_by_id("Books", "bk1").await.unwrap();

    client
        .account
        .update_creation_field("bk1", "khongTonTai", json!("x"))
        .await
        .unwrap();

    let after = gateway.get_by_id("Books", "bk1").await.unwrap();
    assert_eq!(before, after);
    assert!(client.account.state().await.error.is_none());
}

#[tokio::test]
async fn series_updates_as_a_pair() {
    let (client, gateway, _dir) = memory_client().await;
    seed_book(&gateway, "bk1", "một", "A").await;

    client
        .account
        .update_creation_field("bk1", "series", json!(["Bộ A", "2"]))
        .await
        .unwrap();

    let doc = gateway.get_by_id("Books", "bk1").await.unwrap();
    assert_eq!(doc["series"], json!("Bộ A"));
    assert_eq!(doc["bookNum"], json!("2"));
    assert!(doc["lastUpdateDate"].is_object());
}

#[tokio::test]
async fn fetch_creation_by_id_queries_the_book_id_field() {
    let (client, gateway, _dir) = memory_client().await;
    // 文档 id 与 bookId 字段不同时，按字段查询仍然命中
    gateway
        .seed(
            "Books",
            "doc-42",
            json!({ "bookId": "bk-field", "title": "theo trường" }),
        )
        .await;

    let book = client
        .account
        .fetch_creation_by_id("bk-field")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(book.title, "theo trường");

    // 无命中返回 None 而不是错误
    let missing = client.account.fetch_creation_by_id("khong-co").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn notifications_flow_from_account_state_into_groups() {
    let (client, gateway, _dir) = memory_client().await;
    gateway
        .seed(
            "Users",
            "u1",
            json!({
                "id": "u1",
                "username": "tester",
                "notificationList": [
                    "Chương mới~2025-10-01T12:30:00Z",
                    "hỏng không có thời gian",
                    "Giờ hỏng~khong-parse-duoc",
                ],
            }),
        )
        .await;
    client.account.login_with_store_account("u1").await.unwrap();

    client.load_notifications().await;
    let state = client.notifications.state().await;
    // 畸形与时间无法解析的条目都被丢弃
    assert_eq!(state.notifications.len(), 1);
    assert_eq!(state.grouped.len(), 1);
    assert_eq!(state.grouped[0].title, "1/10");
    assert_eq!(state.grouped[0].items[0].time, "19:30");
    assert!(state.error.is_none());
}

#[tokio::test]
async fn register_fails_fast_on_bad_input() {
    let (client, _gateway, _dir) = memory_client().await;

    // 空字段：不发起任何网络请求（账号服务不可达也不会报传输错误）
    let result = client.account.register("", "user", "a", "a").await;
    assert!(result.is_err());
    assert_eq!(
        client.account.state().await.error.as_deref(),
        Some("Vui lòng nhập đầy đủ thông tin!")
    );

    let result = client
        .account
        .register("a@b.c", "user", "mot", "hai")
        .await;
    assert!(result.is_err());
    assert_eq!(
        client.account.state().await.error.as_deref(),
        Some("Mật khẩu nhập lại không khớp!")
    );
}

#[tokio::test]
async fn login_fails_fast_on_empty_fields() {
    let (client, _gateway, _dir) = memory_client().await;
    let result = client.account.login("", "").await;
    assert!(result.is_err());
    assert_eq!(
        client.account.state().await.error.as_deref(),
        Some("Vui lòng nhập đầy đủ thông tin!")
    );
}
