//! 章节本地模型定义

use serde::{Deserialize, Serialize};

/// 章节文档中需要做时间戳归一化的字段
pub const CHAPTER_DATE_FIELDS: &[&str] = &["publishDate", "lastUpdateDate", "createdDate"];

/// 章节数据结构（与 Chapters 集合的文档字段对应）
///
/// `chapter_num` 在同一本作品内唯一，定义阅读顺序；
/// 所有面向阅读的列表都按它升序排列。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    #[serde(rename = "chapterId", default)]
    pub chapter_id: String,
    #[serde(rename = "bookId", default)]
    pub book_id: String,
    #[serde(default)]
    pub chapter_num: u32,
    #[serde(default)]
    pub chapter_title: Option<String>,
    #[serde(default)]
    pub chapter_content: String,
    #[serde(default)]
    pub publish_date: String,
    #[serde(default)]
    pub last_update_date: String,
    #[serde(default)]
    pub created_date: Option<String>,
}
