//! 章节缓存
//!
//! 单书维度的章节列表在每次拉取后都按 chapterNum 升序排序（硬性不变量），
//! 全量章节列表用于仪表盘按书统计章节数，按 bookId 的过滤在客户端完成。

use crate::reader::chapter::models::{Chapter, CHAPTER_DATE_FIELDS};
use crate::reader::error::StoreError;
use crate::reader::gateway::{collections, DocumentGateway};
use crate::reader::serialization::normalize_timestamps;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 章节缓存状态快照
#[derive(Debug, Clone, Default)]
pub struct ChapterState {
    /// 最近一次按书拉取的章节，始终按 chapterNum 升序
    pub chapters_of_selected_book: Vec<Chapter>,
    /// 阅读页当前打开的章节
    pub selected_chapter: Option<Chapter>,
    /// 全量章节（统计用）
    pub chapter_database: Vec<Chapter>,
    pub loading: bool,
    pub error: Option<String>,
}

/// 章节缓存
pub struct ChapterCache {
    gateway: Arc<dyn DocumentGateway>,
    state: RwLock<ChapterState>,
}

/// 文档数组 -> 章节模型，日期归一化后解析；解析失败的文档跳过
pub(crate) fn decode_chapters(docs: Vec<Value>) -> Vec<Chapter> {
    docs.into_iter()
        .filter_map(|mut doc| {
            normalize_timestamps(&mut doc, CHAPTER_DATE_FIELDS);
            match serde_json::from_value::<Chapter>(doc) {
                Ok(chapter) => Some(chapter),
                Err(e) => {
                    debug!("[ChapterCache] 章节文档解析失败，已跳过: {}", e);
                    None
                }
            }
        })
        .collect()
}

/// 按 bookId 查询并按 chapterNum 升序返回（账号聚合也走这条路径）
pub(crate) async fn fetch_sorted_chapters(
    gateway: &Arc<dyn DocumentGateway>,
    book_id: &str,
) -> Result<Vec<Chapter>, StoreError> {
    let docs = gateway
        .query_by_field(collections::CHAPTERS, "bookId", json!(book_id))
        .await?;
    let mut chapters = decode_chapters(docs);
    chapters.sort_by_key(|c| c.chapter_num);
    Ok(chapters)
}

impl ChapterCache {
    pub fn new(gateway: Arc<dyn DocumentGateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(ChapterState::default()),
        }
    }

    /// 当前状态快照
    pub async fn state(&self) -> ChapterState {
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

    /// 拉取一本作品的全部章节，按 chapterNum 升序
    pub async fn fetch_for_book(&self, book_id: &str) -> Result<Vec<Chapter>, StoreError> {
        debug!("[ChapterCache] 拉取章节, bookId: {}", book_id);
        self.begin_loading().await;
        match fetch_sorted_chapters(&self.gateway, book_id).await {
            Ok(chapters) => {
                info!("[ChapterCache] ✅ 章节拉取成功，共 {} 章", chapters.len());
                let mut state = self.state.write().await;
                state.loading = false;
                state.chapters_of_selected_book = chapters.clone();
                Ok(chapters)
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 全量拉取章节（服务端不过滤，按书统计在客户端做）
    pub async fn fetch_all(&self) -> Result<Vec<Chapter>, StoreError> {
        self.begin_loading().await;
        match self.gateway.get_all(collections::CHAPTERS).await {
            Ok(docs) => {
                let chapters = decode_chapters(docs);
                info!("[ChapterCache] ✅ 全量章节拉取成功，共 {} 章", chapters.len());
                let mut state = self.state.write().await;
                state.loading = false;
                state.chapter_database = chapters.clone();
                Ok(chapters)
            }
            Err(e) => self.fail(e).await,
        }
    }

    pub async fn set_selected_chapter(&self, chapter: Option<Chapter>) {
        self.state.write().await.selected_chapter = chapter;
    }

    /// 由全量章节推导的每本书章节数
    pub async fn chapter_counts(&self) -> HashMap<String, usize> {
        let state = self.state.read().await;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for chapter in &state.chapter_database {
            if !chapter.book_id.is_empty() {
                *counts.entry(chapter.book_id.clone()).or_insert(0) += 1;
            }
        }
        counts
    }
}
