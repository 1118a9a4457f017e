//! 领域缓存的集成测试（内存网关）

mod common;

use common::{memory_client, seed_book, seed_chapter, seed_user};
use doctruyen_sdk_core_rust::DocumentGateway;
use serde_json::json;

#[tokio::test]
async fn chapters_are_sorted_ascending_on_every_fetch() {
    let (client, gateway, _dir) = memory_client().await;

    // 乱序写入
    seed_chapter(&gateway, "c3", "bk1", 3).await;
    seed_chapter(&gateway, "c1", "bk1", 1).await;
    seed_chapter(&gateway, "c2", "bk1", 2).await;

    let chapters = client.chapters.fetch_for_book("bk1").await.unwrap();
    let nums: Vec<u32> = chapters.iter().map(|c| c.chapter_num).collect();
    assert_eq!(nums, vec![1, 2, 3]);

    // 追加一章后重新拉取仍然有序
    seed_chapter(&gateway, "c0", "bk1", 0).await;
    seed_chapter(&gateway, "c9", "bk1", 9).await;
    let chapters = client.chapters.fetch_for_book("bk1").await.unwrap();
    let nums: Vec<u32> = chapters.iter().map(|c| c.chapter_num).collect();
    assert_eq!(nums, vec![0, 1, 2, 3, 9]);

    let state = client.chapters.state().await;
    assert_eq!(state.chapters_of_selected_book.len(), 5);
    assert!(!state.loading);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn chapter_counts_come_from_the_full_scan() {
    let (client, gateway, _dir) = memory_client().await;
    seed_chapter(&gateway, "a1", "bk-a", 1).await;
    seed_chapter(&gateway, "a2", "bk-a", 2).await;
    seed_chapter(&gateway, "b1", "bk-b", 1).await;

    client.chapters.fetch_all().await.unwrap();
    let counts = client.chapters.chapter_counts().await;
    assert_eq!(counts.get("bk-a"), Some(&2));
    assert_eq!(counts.get("bk-b"), Some(&1));
}

#[tokio::test]
async fn search_unions_four_queries_and_dedupes_by_id() {
    let (client, gateway, _dir) = memory_client().await;

    // 标题与体裁同时命中同一本书
    gateway
        .seed(
            "Books",
            "bk1",
            json!({
                "bookId": "bk1",
                "title": "kiếm hiệp",
                "author": "ai đó",
                "genreList": ["kiếm hiệp"],
            }),
        )
        .await;
    // 只有作者命中
    gateway
        .seed(
            "Books",
            "bk2",
            json!({
                "bookId": "bk2",
                "title": "khác",
                "author": "kiếm hiệp",
                "genreList": [],
            }),
        )
        .await;
    // 不相关
    seed_book(&gateway, "bk3", "thứ ba", "LỊCH SỬ").await;

    let results = client.books.search("kiếm hiệp").await.unwrap();
    let mut ids: Vec<&str> = results.iter().map(|b| b.book_id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["bk1", "bk2"]);

    let state = client.books.state().await;
    assert_eq!(state.search_keyword.as_deref(), Some("kiếm hiệp"));
    assert_eq!(state.search_results.len(), 2);
    assert_eq!(state.books_for_listing.len(), 2);
}

#[tokio::test]
async fn search_is_exact_match_only() {
    let (client, gateway, _dir) = memory_client().await;
    seed_book(&gateway, "bk1", "Truyện dài tập", "GIẢ TƯỞNG").await;

    // 子串不命中：不是模糊检索
    let results = client.books.search("Truyện").await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn batch_get_silently_drops_missing_ids() {
    let (client, gateway, _dir) = memory_client().await;
    seed_book(&gateway, "bk1", "một", "A").await;
    seed_book(&gateway, "bk2", "hai", "B").await;

    let ids: Vec<String> = vec![
        "bk1".to_string(),
        "khong-ton-tai".to_string(),
        "bk2".to_string(),
    ];
    let books = client.books.fetch_many_by_ids(&ids).await.unwrap();
    assert_eq!(books.len(), 2);

    // 丢弃不会进错误槽
    assert!(client.books.state().await.error.is_none());
}

#[tokio::test]
async fn fetch_by_id_records_no_such_document() {
    let (client, _gateway, _dir) = memory_client().await;

    let result = client.books.fetch_by_id("bien-mat").await;
    assert!(result.is_err());
    let state = client.books.state().await;
    assert_eq!(state.error.as_deref(), Some("No such document!"));
    assert!(!state.loading);
}

#[tokio::test]
async fn genre_filter_is_client_side_over_fetched_books() {
    let (client, gateway, _dir) = memory_client().await;
    seed_book(&gateway, "bk1", "một", "GIẢ TƯỞNG").await;
    seed_book(&gateway, "bk2", "hai", "LỊCH SỬ").await;
    seed_book(&gateway, "bk3", "ba", "GIẢ TƯỞNG").await;

    client.books.fetch_all().await.unwrap();
    let filtered = client.books.filter_by_genre("GIẢ TƯỞNG").await;
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|b| b.genre_list.contains(&"GIẢ TƯỞNG".to_string())));
}

#[tokio::test]
async fn top_books_rank_by_total_view_falling_back_to_read_count() {
    let (client, gateway, _dir) = memory_client().await;
    gateway
        .seed(
            "Books",
            "bk1",
            json!({ "bookId": "bk1", "title": "một", "readCount": 100 }),
        )
        .await;
    gateway
        .seed(
            "Books",
            "bk2",
            json!({ "bookId": "bk2", "title": "hai", "readCount": 5, "totalView": 900 }),
        )
        .await;
    gateway
        .seed(
            "Books",
            "bk3",
            // totalView 为 0 时回退到 readCount
            json!({ "bookId": "bk3", "title": "ba", "readCount": 300, "totalView": 0 }),
        )
        .await;

    client.books.fetch_all().await.unwrap();
    let top = client.books.top_books(2).await;
    let ids: Vec<&str> = top.iter().map(|b| b.book_id.as_str()).collect();
    assert_eq!(ids, vec!["bk2", "bk3"]);
}

#[tokio::test]
async fn created_review_is_the_single_current_user_review() {
    let (client, gateway, _dir) = memory_client().await;
    seed_user(&gateway, "u1").await;

    client
        .reviews
        .create(
            "bk1",
            "u1",
            "Người đọc",
            None,
            Some("Hay lắm".to_string()),
            "positive",
        )
        .await
        .unwrap();

    let review = client
        .reviews
        .fetch_current_user_review("bk1", "u1")
        .await
        .unwrap()
        .expect("phải có đúng một review");
    assert_eq!(review.review_text.as_deref(), Some("Hay lắm"));
    assert_eq!(review.review_type, "positive");

    // 评价 id 已并入用户的 reviewIdList
    let user_doc = gateway.get_by_id("Users", "u1").await.unwrap();
    let review_ids = user_doc["reviewIdList"].as_array().unwrap();
    assert_eq!(review_ids.len(), 1);

    // 回拉后的列表里恰好一条
    let state = client.reviews.state().await;
    assert_eq!(state.review_array.len(), 1);
    assert!(state.user_review.is_some());
}

#[tokio::test]
async fn zero_review_matches_is_none_not_an_error() {
    let (client, _gateway, _dir) = memory_client().await;
    let review = client
        .reviews
        .fetch_current_user_review("bk1", "khong-ai")
        .await
        .unwrap();
    assert!(review.is_none());
    assert!(client.reviews.state().await.error.is_none());
}

#[tokio::test]
async fn updating_with_empty_text_clears_the_review_text() {
    let (client, gateway, _dir) = memory_client().await;
    seed_user(&gateway, "u1").await;

    let review_id = client
        .reviews
        .create("bk1", "u1", "Người đọc", None, Some("cũ".to_string()), "positive")
        .await
        .unwrap();

    client
        .reviews
        .update(&review_id, "bk1", "u1", Some(String::new()), "negative")
        .await
        .unwrap();

    let review = client
        .reviews
        .fetch_current_user_review("bk1", "u1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(review.review_text, None);
    assert_eq!(review.review_type, "negative");
    // 编辑总是刷新 reviewDate（归一化回 D/M/YYYY 文本）
    assert!(!review.review_date.is_empty());
    assert!(!review.review_date.contains("seconds"));
}

#[tokio::test]
async fn review_fetch_rejects_empty_book_id() {
    let (client, _gateway, _dir) = memory_client().await;
    let result = client.reviews.fetch_for_book("").await;
    assert!(result.is_err());
    assert_eq!(
        client.reviews.state().await.error.as_deref(),
        Some("invalid argument: Invalid bookId provided")
    );
}
