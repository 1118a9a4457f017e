use crate::reader::error::StoreError;
use serde::Deserialize;

/// 文档存储服务返回的业务错误码
pub mod err_code {
    pub const OK: i32 = 0;
    pub const RECORD_NOT_FOUND: i32 = 1004;
}

/// 统一的 API 响应包装结构体（包含 errCode、errMsg、data）
/// data 字段可能为 null 或缺失，因此使用 Option<T>
/// serde 会自动将缺失或 null 的字段反序列化为 None
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(rename = "errCode")]
    pub err_code: i32,
    #[serde(rename = "errMsg", default)]
    pub err_msg: String,
    pub data: Option<T>,
}

/// 通用 HTTP 响应处理函数：直接反序列化为统一的响应结构体
/// 返回 `ApiResponse<T>`，调用方可以根据需要处理 `data` 字段（可能为 None）
/// 所有文档存储 API 都可以共用此方法
pub async fn handle_http_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    operation_name: &str,
) -> Result<ApiResponse<T>, StoreError> {
    use tracing::{debug, error};

    let status = response.status();

    // 读取 body bytes（只能读取一次）
    let body_bytes = response
        .bytes()
        .await
        .map_err(StoreError::transport)?;
    let body_str = String::from_utf8_lossy(&body_bytes);
    debug!("[HTTP] {} 响应 Body: {}", operation_name, body_str);

    if !status.is_success() {
        error!(
            "[HTTP] {} 请求失败，HTTP状态: {}, 响应: {}",
            operation_name, status, body_str
        );
        return Err(StoreError::Remote {
            message: format!("HTTP 错误 {}: {}", status, body_str),
            code: Some(status.as_u16() as i32),
        });
    }

    // 从 bytes 反序列化（因为 body 已经被消费了）
    let api_resp: ApiResponse<T> = serde_json::from_slice(&body_bytes).map_err(|e| {
        error!(
            "[HTTP] {} 反序列化失败: {:?}\n原始响应: {}",
            operation_name, e, body_str
        );
        StoreError::Remote {
            message: format!("反序列化响应失败: {:?}", e),
            code: None,
        }
    })?;

    Ok(api_resp)
}
