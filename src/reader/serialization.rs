//! 数据格式工具：客户端 ID 生成、服务端时间戳归一化、封面 data-URI 编码等
//!
//! 文档中的日期字段在写入时是 `{"seconds", "nanos"}` 形式的服务端时间戳，
//! 读取后立即转换为 `D/M/YYYY` 文本（不补零）；已是字符串的字段原样透传，
//! 因此重复归一化是幂等的。

use base64::Engine;
use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

/// 越南时区偏移（UTC+7），所有展示用日期统一按此换算
pub fn vn_offset() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).unwrap()
}

/// 生成客户端文档 ID：毫秒时间戳的 36 进制 + 6 位随机后缀
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let rand = uuid::Uuid::new_v4().simple().to_string();
    format!("{}{}", to_base36(millis as u64), &rand[..6])
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap()
}

/// 当前日期的 `D/M/YYYY` 文本（不补零）
pub fn current_date_text() -> String {
    let now = Utc::now().with_timezone(&vn_offset());
    format!("{}/{}/{}", now.day(), now.month(), now.year())
}

/// 生成写回用的服务端时间戳对象
pub fn server_timestamp_now() -> Value {
    json!({ "seconds": Utc::now().timestamp(), "nanos": 0 })
}

/// 判断字段值是否为服务端时间戳对象
fn is_server_timestamp(value: &Value) -> bool {
    value
        .as_object()
        .map(|m| m.get("seconds").map(|s| s.is_i64()).unwrap_or(false))
        .unwrap_or(false)
}

/// 把秒级时间戳格式化为 `D/M/YYYY` 文本
pub fn format_timestamp_dmy(seconds: i64) -> String {
    let dt: DateTime<FixedOffset> = DateTime::from_timestamp(seconds, 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .with_timezone(&vn_offset());
    format!("{}/{}/{}", dt.day(), dt.month(), dt.year())
}

/// 对文档的指定字段做时间戳归一化：
/// 时间戳对象 -> `D/M/YYYY` 文本；其余类型（含已转换的字符串）原样保留
pub fn normalize_timestamps(doc: &mut Value, fields: &[&str]) {
    let Some(map) = doc.as_object_mut() else {
        return;
    };
    for field in fields {
        if let Some(value) = map.get(*field) {
            if is_server_timestamp(value) {
                let seconds = value["seconds"].as_i64().unwrap_or(0);
                map.insert((*field).to_string(), json!(format_timestamp_dmy(seconds)));
            }
        }
    }
}

/// 数组字段反序列化函数（支持 null 值与缺失）
pub fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt: Option<Vec<T>> = Deserialize::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// 把封面图片字节编码为 data-URI（创建流程存入 `cover` 字段的格式）
pub fn encode_cover_data_uri(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, encoded)
}

/// 阅读量等大数字的紧凑展示（1.2K / 3.4M / 1.0B）
pub fn format_compact_number(number: i64) -> String {
    if number >= 1_000_000_000 {
        format!("{:.1}B", number as f64 / 1_000_000_000.0)
    } else if number >= 1_000_000 {
        format!("{:.1}M", number as f64 / 1_000_000.0)
    } else if number >= 1000 {
        format!("{:.1}K", number as f64 / 1000.0)
    } else {
        number.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_object_becomes_dmy_text() {
        // 2025-03-25 18:00:00 UTC -> 2025-03-26 01:00 (UTC+7)
        let mut doc = json!({
            "title": "a",
            "publishDate": { "seconds": 1742925600i64, "nanos": 0 },
        });
        normalize_timestamps(&mut doc, &["publishDate", "lastUpdateDate"]);
        assert_eq!(doc["publishDate"], json!("26/3/2025"));
    }

    #[test]
    fn normalization_is_idempotent_on_strings() {
        let mut doc = json!({ "publishDate": "5/1/2024" });
        normalize_timestamps(&mut doc, &["publishDate"]);
        normalize_timestamps(&mut doc, &["publishDate"]);
        assert_eq!(doc["publishDate"], json!("5/1/2024"));
    }

    #[test]
    fn no_zero_padding_in_dates() {
        // 2024-01-05 00:00:00 UTC+7
        let text = format_timestamp_dmy(1704387600);
        assert_eq!(text, "5/1/2024");
    }

    #[test]
    fn generated_ids_are_unique_enough() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert!(a.len() > 6);
    }

    #[test]
    fn compact_number_formatting() {
        assert_eq!(format_compact_number(950), "950");
        assert_eq!(format_compact_number(1200), "1.2K");
        assert_eq!(format_compact_number(3_400_000), "3.4M");
        assert_eq!(format_compact_number(1_000_000_000), "1.0B");
    }

    #[test]
    fn cover_data_uri_prefix() {
        let uri = encode_cover_data_uri("image/jpeg", b"abc");
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }
}
