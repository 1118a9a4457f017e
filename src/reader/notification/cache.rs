//! 通知缓存
//!
//! 从账号状态里的编码字符串列表解码、格式化并按日期分组。
//! 解析采取防御姿态：缺半边的条目、时间无法解析的条目直接丢弃，绝不报错
//! （既有数据里存在畸形条目）。

use crate::reader::notification::models::{
    FormattedNotification, NotificationEntry, NotificationGroup,
};
use crate::reader::serialization::vn_offset;
use chrono::{DateTime, Datelike, Timelike, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// 通知缓存状态快照
#[derive(Debug, Clone, Default)]
pub struct NotificationState {
    /// 解码后的原始条目
    pub from_account: Vec<NotificationEntry>,
    /// 格式化后的通知
    pub notifications: Vec<FormattedNotification>,
    /// 按标题分组的通知，组序为格式化过程中的首次出现顺序
    pub grouped: Vec<NotificationGroup>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// 通知缓存
#[derive(Default)]
pub struct NotificationCache {
    state: RwLock<NotificationState>,
}

/// `"text~time"` -> (text, time)；用 '~' 切分，两半都非空才保留
fn decode_entries(raw: &[String]) -> Vec<NotificationEntry> {
    raw.iter()
        .filter_map(|item| {
            let mut parts = item.splitn(2, '~');
            let text = parts.next().unwrap_or_default();
            let time = parts.next().unwrap_or_default();
            if text.is_empty() || time.is_empty() {
                warn!("[Notification] 丢弃畸形通知条目: {}", item);
                return None;
            }
            Some(NotificationEntry {
                text: text.to_string(),
                time: time.to_string(),
            })
        })
        .collect()
}

/// 格式化：ISO 时间 -> 越南时区 HH:MM；分组标题为 "Hôm nay"（与当前日/月相同）
/// 或 "{day}/{month}"。时间无法解析的条目整条丢弃
fn format_entries(
    entries: &[NotificationEntry],
    now: DateTime<Utc>,
) -> Vec<FormattedNotification> {
    let offset = vn_offset();
    let now_vn = now.with_timezone(&offset);
    let (current_day, current_month) = (now_vn.day(), now_vn.month());

    entries
        .iter()
        .filter_map(|entry| {
            let parsed = DateTime::parse_from_rfc3339(&entry.time);
            let Ok(parsed) = parsed else {
                warn!("[Notification] 时间格式无法解析，丢弃: {}", entry.time);
                return None;
            };
            let vn_time = parsed.with_timezone(&offset);
            let display_time = format!("{:02}:{:02}", vn_time.hour(), vn_time.minute());

            let (day, month) = (vn_time.day(), vn_time.month());
            let title = if day == current_day && month == current_month {
                "Hôm nay".to_string()
            } else {
                format!("{}/{}", day, month)
            };

            Some(FormattedNotification {
                text: entry.text.clone(),
                title,
                time: display_time,
            })
        })
        .collect()
}

/// 按标题聚合，组序跟随条目的首次出现顺序，不再重排
fn group_notifications(data: &[FormattedNotification]) -> Vec<NotificationGroup> {
    let mut groups: Vec<NotificationGroup> = Vec::new();
    for item in data {
        match groups.iter_mut().find(|g| g.title == item.title) {
            Some(group) => group.items.push(item.clone()),
            None => groups.push(NotificationGroup {
                title: item.title.clone(),
                items: vec![item.clone()],
            }),
        }
    }
    groups
}

impl NotificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前状态快照
    pub async fn state(&self) -> NotificationState {
        self.state.read().await.clone()
    }

    /// 从账号的通知列表加载：解码 -> 格式化 -> 分组
    pub async fn load(&self, raw: &[String]) {
        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
        }
        debug!("[Notification] 原始通知条目: {}", raw.len());

        let entries = decode_entries(raw);
        let formatted = format_entries(&entries, Utc::now());
        let grouped = group_notifications(&formatted);
        info!(
            "[Notification] ✅ 通知加载完成，{} 条，{} 组",
            formatted.len(),
            grouped.len()
        );

        let mut state = self.state.write().await;
        state.is_loading = false;
        state.from_account = entries;
        state.notifications = formatted;
        state.grouped = grouped;
    }

    /// 清空通知视图
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.from_account.clear();
        state.notifications.clear();
        state.grouped.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entries(raw: &[&str]) -> Vec<NotificationEntry> {
        decode_entries(&raw.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn malformed_entries_are_dropped_on_decode() {
        let decoded = entries(&[
            "Chương mới~2025-10-22T03:00:00Z",
            "thiếu thời gian~",
            "~2025-10-22T03:00:00Z",
            "không có dấu ngăn",
        ]);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].text, "Chương mới");
    }

    #[test]
    fn today_entries_bucket_under_hom_nay() {
        // now: 2025-10-22 10:00 UTC = 17:00 UTC+7
        let now = Utc.with_ymd_and_hms(2025, 10, 22, 10, 0, 0).unwrap();
        let decoded = entries(&["Hello~2025-10-22T03:05:00Z"]);
        let formatted = format_entries(&decoded, now);
        assert_eq!(formatted.len(), 1);
        assert_eq!(formatted[0].title, "Hôm nay");
        // 03:05 UTC -> 10:05 UTC+7
        assert_eq!(formatted[0].time, "10:05");
    }

    #[test]
    fn other_days_bucket_under_day_month() {
        let now = Utc.with_ymd_and_hms(2025, 10, 22, 10, 0, 0).unwrap();
        let decoded = entries(&["Cũ hơn~2025-10-01T12:30:00Z"]);
        let formatted = format_entries(&decoded, now);
        assert_eq!(formatted[0].title, "1/10");
        assert_eq!(formatted[0].time, "19:30");
    }

    #[test]
    fn unparseable_time_is_dropped_entirely() {
        let now = Utc.with_ymd_and_hms(2025, 10, 22, 10, 0, 0).unwrap();
        let decoded = entries(&["Hỏng~khong-phai-thoi-gian"]);
        let formatted = format_entries(&decoded, now);
        assert!(formatted.is_empty());
        assert!(group_notifications(&formatted).is_empty());
    }

    #[test]
    fn utc_offset_can_roll_the_bucket_to_the_next_day() {
        let now = Utc.with_ymd_and_hms(2025, 10, 22, 10, 0, 0).unwrap();
        // 21:00 UTC ngày 21 -> 04:00 UTC+7 ngày 22 => "Hôm nay"
        let decoded = entries(&["Khuya~2025-10-21T21:00:00Z"]);
        let formatted = format_entries(&decoded, now);
        assert_eq!(formatted[0].title, "Hôm nay");
        assert_eq!(formatted[0].time, "04:00");
    }

    #[test]
    fn groups_follow_first_seen_order() {
        let now = Utc.with_ymd_and_hms(2025, 10, 22, 10, 0, 0).unwrap();
        let decoded = entries(&[
            "a~2025-10-01T01:00:00Z",
            "b~2025-10-22T01:00:00Z",
            "c~2025-10-01T02:00:00Z",
        ]);
        let grouped = group_notifications(&format_entries(&decoded, now));
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].title, "1/10");
        assert_eq!(grouped[0].items.len(), 2);
        assert_eq!(grouped[1].title, "Hôm nay");
    }
}
