//! 评价缓存
//!
//! 创建/编辑走"先写入、再整体回拉"的两段式：写入成功后重新拉取该书的
//! 评价列表和当前用户评价（两次额外往返），不做乐观本地插入。

use crate::reader::error::StoreError;
use crate::reader::gateway::{collections, DocumentGateway};
use crate::reader::review::models::{Review, REVIEW_DATE_FIELDS};
use crate::reader::serialization::{generate_id, normalize_timestamps, server_timestamp_now};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 评价缓存状态快照
#[derive(Debug, Clone, Default)]
pub struct ReviewState {
    /// 当前书的评价列表，按 reviewDate 降序
    pub review_array: Vec<Review>,
    /// 当前用户对当前书的评价（没有则为 None）
    pub user_review: Option<Review>,
    pub loading: bool,
    pub error: Option<String>,
    /// 创建/编辑单独一组状态
    pub creating: bool,
    pub create_error: Option<String>,
}

/// 评价缓存
pub struct ReviewCache {
    gateway: Arc<dyn DocumentGateway>,
    state: RwLock<ReviewState>,
}

/// 评价日期按 月/日/年 顺序解析。reviewDate 实际以 日/月/年 文本写入，
/// 因此首段大于 12 的日期解析失败、不参与排序（保持既有的歧义行为，见 DESIGN.md）
fn parse_review_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%m/%d/%Y").ok()
}

fn sort_reviews_newest_first(reviews: &mut [Review]) {
    reviews.sort_by(|a, b| {
        match (
            parse_review_date(&b.review_date),
            parse_review_date(&a.review_date),
        ) {
            (Some(date_b), Some(date_a)) => date_b.cmp(&date_a),
            // 解析失败的条目不影响相对顺序（稳定排序）
            _ => Ordering::Equal,
        }
    });
}

fn decode_reviews(docs: Vec<Value>) -> Vec<Review> {
    docs.into_iter()
        .filter_map(|mut doc| {
            normalize_timestamps(&mut doc, REVIEW_DATE_FIELDS);
            match serde_json::from_value::<Review>(doc) {
                Ok(review) => Some(review),
                Err(e) => {
                    debug!("[ReviewCache] 评价文档解析失败，已跳过: {}", e);
                    None
                }
            }
        })
        .collect()
}

impl ReviewCache {
    pub fn new(gateway: Arc<dyn DocumentGateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(ReviewState::default()),
        }
    }

    /// 当前状态快照
    pub async fn state(&self) -> ReviewState {
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

    async fn fail_create<T>(&self, e: StoreError) -> Result<T, StoreError> {
        let mut state = self.state.write().await;
        state.creating = false;
        state.create_error = Some(e.to_string());
        Err(e)
    }

    /// 拉取一本书的全部评价，按 reviewDate 降序
    pub async fn fetch_for_book(&self, book_id: &str) -> Result<Vec<Review>, StoreError> {
        if book_id.is_empty() {
            let e = StoreError::InvalidArgument("Invalid bookId provided".to_string());
            return self.fail(e).await;
        }
        self.begin_loading().await;
        match self
            .gateway
            .query_by_field(collections::REVIEWS, "bookId", json!(book_id))
            .await
        {
            Ok(docs) => {
                let mut reviews = decode_reviews(docs);
                sort_reviews_newest_first(&mut reviews);
                info!("[ReviewCache] ✅ 评价拉取成功，共 {} 条", reviews.len());
                let mut state = self.state.write().await;
                state.loading = false;
                state.review_array = reviews.clone();
                Ok(reviews)
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 查询当前用户对某书的评价：(bookId, reviewerId) 双条件，取第一条命中；
    /// 零命中不是错误，返回 None
    pub async fn fetch_current_user_review(
        &self,
        book_id: &str,
        reviewer_id: &str,
    ) -> Result<Option<Review>, StoreError> {
        debug!(
            "[ReviewCache] 查询用户评价, bookId: {}, reviewerId: {}",
            book_id, reviewer_id
        );
        self.begin_loading().await;
        match self
            .gateway
            .query_by_fields(
                collections::REVIEWS,
                &[("bookId", json!(book_id)), ("reviewerId", json!(reviewer_id))],
            )
            .await
        {
            Ok(docs) => {
                let review = decode_reviews(docs).into_iter().next();
                let mut state = self.state.write().await;
                state.loading = false;
                state.user_review = review.clone();
                Ok(review)
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 创建评价：写入评价文档，把评价 id 并入用户的 reviewIdList，
    /// 然后回拉该书评价列表与当前用户评价
    pub async fn create(
        &self,
        book_id: &str,
        reviewer_id: &str,
        reviewer: &str,
        review_avatar: Option<String>,
        review_text: Option<String>,
        review_type: &str,
    ) -> Result<String, StoreError> {
        {
            let mut state = self.state.write().await;
            state.creating = true;
            state.create_error = None;
        }

        let review_id = generate_id();
        let doc = json!({
            "id": review_id,
            "bookId": book_id,
            "reviewer": reviewer,
            "reviewerId": reviewer_id,
            "reviewAvatar": review_avatar,
            "reviewText": review_text,
            "type": review_type,
            "reviewDate": server_timestamp_now(),
        });

        if let Err(e) = self
            .gateway
            .set_doc(collections::REVIEWS, &review_id, doc)
            .await
        {
            return self.fail_create(e).await;
        }
        if let Err(e) = self
            .gateway
            .array_union(
                collections::USERS,
                reviewer_id,
                "reviewIdList",
                json!(review_id),
            )
            .await
        {
            return self.fail_create(e).await;
        }
        info!("[ReviewCache] ✅ 评价创建成功: {}", review_id);
        {
            let mut state = self.state.write().await;
            state.creating = false;
        }

        // 两次回拉的失败会记录在各自的错误槽里，不影响创建结果
        let _ = self.fetch_for_book(book_id).await;
        let _ = self.fetch_current_user_review(book_id, reviewer_id).await;
        Ok(review_id)
    }

    /// 编辑评价：空文本视为清除评语（置 null），reviewDate 总是刷新为当前时间
    pub async fn update(
        &self,
        review_id: &str,
        book_id: &str,
        reviewer_id: &str,
        review_text: Option<String>,
        review_type: &str,
    ) -> Result<(), StoreError> {
        {
            let mut state = self.state.write().await;
            state.creating = true;
            state.create_error = None;
        }

        let review_text = review_text.filter(|t| !t.is_empty());
        let fields = json!({
            "reviewText": review_text,
            "type": review_type,
            "reviewDate": server_timestamp_now(),
        });

        if let Err(e) = self
            .gateway
            .update_doc(collections::REVIEWS, review_id, fields)
            .await
        {
            return self.fail_create(e).await;
        }
        info!("[ReviewCache] ✅ 评价更新成功: {}", review_id);
        {
            let mut state = self.state.write().await;
            state.creating = false;
        }

        let _ = self.fetch_for_book(book_id).await;
        let _ = self.fetch_current_user_review(book_id, reviewer_id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_dates_parse_in_month_first_order() {
        // "3/4/2025" 被解析成 3 月 4 日而不是 4 月 3 日
        assert_eq!(
            parse_review_date("3/4/2025"),
            NaiveDate::from_ymd_opt(2025, 3, 4)
        );
        // 首段超过 12 解析失败
        assert_eq!(parse_review_date("26/3/2025"), None);
    }

    #[test]
    fn parseable_dates_sort_newest_first() {
        let mk = |id: &str, date: &str| Review {
            id: id.to_string(),
            review_date: date.to_string(),
            ..Default::default()
        };
        let mut reviews = vec![
            mk("a", "1/2/2024"),
            mk("b", "1/1/2025"),
            mk("c", "2/2/2024"),
        ];
        sort_reviews_newest_first(&mut reviews);
        let ids: Vec<&str> = reviews.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn unparseable_dates_do_not_break_the_sort() {
        let mk = |id: &str, date: &str| Review {
            id: id.to_string(),
            review_date: date.to_string(),
            ..Default::default()
        };
        let mut reviews = vec![
            mk("a", "26/3/2025"),
            mk("b", "1/2/2024"),
            mk("c", "not-a-date"),
        ];
        sort_reviews_newest_first(&mut reviews);
        // 不可解析的日期不排序也不报错，条目全部保留
        assert_eq!(reviews.len(), 3);
    }
}
