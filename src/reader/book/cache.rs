//! 作品缓存
//!
//! 维护全量作品列表、体裁列表和检索/列表视图。作品的写入不走这里，
//! 全部通过账号聚合的创作流程完成。

use crate::reader::book::models::{Book, Genre, BOOK_DATE_FIELDS};
use crate::reader::error::StoreError;
use crate::reader::gateway::{collections, DocumentGateway};
use crate::reader::serialization::normalize_timestamps;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// 作品缓存状态快照
#[derive(Debug, Clone, Default)]
pub struct BookState {
    /// 全量作品列表（管理/列表视图用）
    pub books_database: Vec<Book>,
    /// 体裁列表
    pub genre_database: Vec<Genre>,
    /// 当前查看的作品
    pub selected_book: Option<Book>,
    pub search_keyword: Option<String>,
    pub search_results: Vec<Book>,
    /// 列表页标题与数据（与检索共享）
    pub book_listing_title: Option<String>,
    pub books_for_listing: Vec<Book>,
    pub loading: bool,
    /// 最近一次失败的原因，下一次请求开始时清空
    pub error: Option<String>,
}

/// 作品缓存
pub struct BookCache {
    gateway: Arc<dyn DocumentGateway>,
    state: RwLock<BookState>,
}

/// 把文档数组转换为作品模型，日期字段先做归一化；解析失败的文档跳过
pub(crate) fn decode_books(docs: Vec<Value>) -> Vec<Book> {
    docs.into_iter()
        .filter_map(|mut doc| {
            normalize_timestamps(&mut doc, BOOK_DATE_FIELDS);
            match serde_json::from_value::<Book>(doc) {
                Ok(book) => Some(book),
                Err(e) => {
                    debug!("[BookCache] 作品文档解析失败，已跳过: {}", e);
                    None
                }
            }
        })
        .collect()
}

impl BookCache {
    pub fn new(gateway: Arc<dyn DocumentGateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(BookState::default()),
        }
    }

    /// 当前状态快照
    pub async fn state(&self) -> BookState {
        self.state.read().await.clone()
    }

    async fn begin_loading(&self) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.error = None;
    }

    async fn fail<T>(&self, e: StoreError) -> Result<T, StoreError> {
        let mut state = self.state.write().await;
        state.loading = false;
        state.error = Some(e.to_string());
        Err(e)
    }

    /// 全量拉取作品列表
    pub async fn fetch_all(&self) -> Result<Vec<Book>, StoreError> {
        self.begin_loading().await;
        match self.gateway.get_all(collections::BOOKS).await {
            Ok(docs) => {
                let books = decode_books(docs);
                info!("[BookCache] ✅ 全量作品拉取成功，共 {} 本", books.len());
                let mut state = self.state.write().await;
                state.loading = false;
                state.books_database = books.clone();
                Ok(books)
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 全量拉取作品并存入列表视图（与 books_database 分开维护）
    pub async fn fetch_for_listing(&self) -> Result<Vec<Book>, StoreError> {
        self.begin_loading().await;
        match self.gateway.get_all(collections::BOOKS).await {
            Ok(docs) => {
                let books = decode_books(docs);
                info!("[BookCache] ✅ 列表作品拉取成功，共 {} 本", books.len());
                let mut state = self.state.write().await;
                state.loading = false;
                state.books_for_listing = books.clone();
                Ok(books)
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 按文档 id 读取单本作品并设为当前查看
    pub async fn fetch_by_id(&self, book_id: &str) -> Result<Book, StoreError> {
        self.begin_loading().await;
        match self.gateway.get_by_id(collections::BOOKS, book_id).await {
            Ok(mut doc) => {
                normalize_timestamps(&mut doc, BOOK_DATE_FIELDS);
                match serde_json::from_value::<Book>(doc) {
                    Ok(book) => {
                        let mut state = self.state.write().await;
                        state.loading = false;
                        state.selected_book = Some(book.clone());
                        Ok(book)
                    }
                    Err(e) => {
                        self.fail(StoreError::Remote {
                            message: format!("作品文档解析失败: {}", e),
                            code: None,
                        })
                        .await
                    }
                }
            }
            Err(e) => {
                // 与来源一致：文档不存在时错误槽记录 "No such document!"
                let message = if e.is_not_found() {
                    "No such document!".to_string()
                } else {
                    e.to_string()
                };
                let mut state = self.state.write().await;
                state.loading = false;
                state.error = Some(message);
                Err(e)
            }
        }
    }

    /// 批量按 id 读取作品。结果顺序不保证与入参一致，读取失败的 id 被静默丢弃，
    /// 调用方需要按 id 自行重排
    pub async fn fetch_many_by_ids(&self, ids: &[String]) -> Result<Vec<Book>, StoreError> {
        if ids.is_empty() {
            let e = StoreError::InvalidArgument("Invalid book IDs array".to_string());
            return self.fail(e).await;
        }
        self.begin_loading().await;
        debug!("[BookCache] 批量读取 {} 本作品...", ids.len());
        let docs = self.gateway.batch_get_by_ids(collections::BOOKS, ids).await;
        let books = decode_books(docs);
        info!("[BookCache] ✅ 批量读取成功，共 {} 本", books.len());
        let mut state = self.state.write().await;
        state.loading = false;
        Ok(books)
    }

    /// 关键词检索：对 title / author / series / genreList 四路并发精确匹配，
    /// 合并结果后按 bookId 去重（保留首次出现）。不是子串/模糊检索
    pub async fn search(&self, keyword: &str) -> Result<Vec<Book>, StoreError> {
        info!("[BookCache] 🔍 检索: {}", keyword);
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
            state.search_keyword = Some(keyword.to_string());
        }

        let result = tokio::join!(
            self.gateway
                .query_by_field(collections::BOOKS, "title", json!(keyword)),
            self.gateway
                .query_by_field(collections::BOOKS, "author", json!(keyword)),
            self.gateway
                .query_by_field(collections::BOOKS, "series", json!(keyword)),
            self.gateway
                .query_array_contains(collections::BOOKS, "genreList", json!(keyword)),
        );

        let merged = match result {
            (Ok(by_title), Ok(by_author), Ok(by_series), Ok(by_genre)) => {
                let mut merged = by_title;
                merged.extend(by_author);
                merged.extend(by_series);
                merged.extend(by_genre);
                merged
            }
            (r1, r2, r3, r4) => {
                let e = [r1.err(), r2.err(), r3.err(), r4.err()]
                    .into_iter()
                    .flatten()
                    .next()
                    .unwrap();
                return self.fail(e).await;
            }
        };

        let mut results: Vec<Book> = Vec::new();
        for book in decode_books(merged) {
            if !results.iter().any(|b| b.book_id == book.book_id) {
                results.push(book);
            }
        }
        info!("[BookCache] ✅ 检索命中 {} 本", results.len());

        let mut state = self.state.write().await;
        state.loading = false;
        state.search_results = results.clone();
        state.books_for_listing = results.clone();
        Ok(results)
    }

    /// 全量拉取体裁列表
    pub async fn fetch_genre(&self) -> Result<Vec<Genre>, StoreError> {
        self.begin_loading().await;
        match self.gateway.get_all(collections::GENRE).await {
            Ok(docs) => {
                let genres: Vec<Genre> = docs
                    .into_iter()
                    .filter_map(|doc| match serde_json::from_value::<Genre>(doc) {
                        Ok(g) => Some(g),
                        Err(e) => {
                            warn!("[BookCache] 体裁文档解析失败，已跳过: {}", e);
                            None
                        }
                    })
                    .collect();
                info!("[BookCache] ✅ 体裁拉取成功，共 {} 个", genres.len());
                let mut state = self.state.write().await;
                state.loading = false;
                state.genre_database = genres.clone();
                Ok(genres)
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 按体裁名过滤已拉取的全量作品列表；纯客户端运算，不发起网关请求
    pub async fn filter_by_genre(&self, genre_name: &str) -> Vec<Book> {
        let state = self.state.read().await;
        state
            .books_database
            .iter()
            .filter(|book| book.genre_list.iter().any(|g| g == genre_name))
            .cloned()
            .collect()
    }

    /// 阅读量排行：按 totalView（缺失时 readCount）降序取前 n 本
    pub async fn top_books(&self, n: usize) -> Vec<Book> {
        let state = self.state.read().await;
        let mut books = state.books_database.clone();
        books.sort_by(|a, b| b.effective_views().cmp(&a.effective_views()));
        books.truncate(n);
        books
    }

    pub async fn set_selected_book(&self, book: Option<Book>) {
        self.state.write().await.selected_book = book;
    }

    pub async fn set_search_keyword(&self, keyword: Option<String>) {
        self.state.write().await.search_keyword = keyword;
    }

    pub async fn set_book_listing_title(&self, title: Option<String>) {
        self.state.write().await.book_listing_title = title;
    }
}
