//! 通知本地模型定义
//!
//! 通知在用户文档上以 `"text~ISO时间"` 的扁平字符串存储，这里是解码后的形态。

use serde::{Deserialize, Serialize};

/// 解码后的原始通知（text + ISO 时间字符串）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEntry {
    pub text: String,
    pub time: String,
}

/// 格式化后的通知：time 为越南时区 `HH:MM`，title 为分组标题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedNotification {
    pub text: String,
    pub title: String,
    pub time: String,
}

/// 按标题聚合的通知分组（"Hôm nay" 或 "{day}/{month}"）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationGroup {
    pub title: String,
    pub items: Vec<FormattedNotification>,
}
