//! 作品本地模型定义

use serde::{Deserialize, Serialize};

/// 作品文档中需要做时间戳归一化的字段
pub const BOOK_DATE_FIELDS: &[&str] = &["publishDate", "lastUpdateDate"];

/// 作品数据结构（与 Books 集合的文档字段对应）
/// 可以直接从文档 JSON 反序列化，缺失的字段使用默认值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "bookId", default)]
    pub book_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    /// 译者（翻译作品才有）
    #[serde(default)]
    pub translator: Option<String>,
    /// 所属系列与系列内编号（成对维护）
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub book_num: Option<String>,
    /// 作品形式："sách chữ"（文字书）或 "truyện tranh"（漫画）
    #[serde(rename = "type", default)]
    pub book_type: String,
    /// 封面：data-URI 或图片 URL
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "crate::reader::serialization::deserialize_vec_or_null"
    )]
    pub genre_list: Vec<String>,
    #[serde(default)]
    pub language: String,
    /// 连载状态："đang cập nhật"（连载中）/ "hoàn tất"（完结）/ 其他视为弃坑
    #[serde(default)]
    pub progress_status: String,
    /// 读取后为 `D/M/YYYY` 文本
    #[serde(default)]
    pub publish_date: String,
    #[serde(default)]
    pub last_update_date: String,
    #[serde(default)]
    pub read_count: i64,
    #[serde(default)]
    pub total_view: Option<i64>,
    #[serde(default)]
    pub total_like: Option<i64>,
}

impl Book {
    /// 排行用的有效阅读量：totalView 缺失或为 0 时回退到 readCount
    pub fn effective_views(&self) -> i64 {
        match self.total_view {
            Some(v) if v != 0 => v,
            _ => self.read_count,
        }
    }
}

/// 体裁标签；作品通过 genreList 中的名称字符串引用，不是外键
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Genre {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}
