//! 评价本地模型定义

use serde::{Deserialize, Serialize};

/// 评价文档中需要做时间戳归一化的字段
pub const REVIEW_DATE_FIELDS: &[&str] = &["reviewDate"];

/// 评价数据结构（与 Reviews 集合的文档字段对应）
///
/// `review_text` 为 None 表示只打分不写评语。
/// 同一 (bookId, reviewerId) 视为"当前用户对该书的评价"，存储端不保证唯一，
/// 查询时取第一条命中。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "bookId", default)]
    pub book_id: String,
    /// 展示名
    #[serde(default)]
    pub reviewer: String,
    #[serde(rename = "reviewerId", default)]
    pub reviewer_id: String,
    #[serde(default)]
    pub review_avatar: Option<String>,
    #[serde(default)]
    pub review_text: Option<String>,
    /// "positive" 或 "negative"
    #[serde(rename = "type", default)]
    pub review_type: String,
    /// 读取后为 `D/M/YYYY` 文本
    #[serde(default)]
    pub review_date: String,
}
