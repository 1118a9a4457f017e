//! 统一错误类型定义
//!
//! 校验错误（Validation）在本地产生，绝不会到达网关；其余三类均来自远端调用。

use thiserror::Error;

/// SDK 统一错误类型
#[derive(Debug, Error)]
pub enum StoreError {
    /// 客户端校验失败（空字段、密码不一致等），未发起任何网络请求
    #[error("{0}")]
    Validation(String),

    /// 请求的文档不存在
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// 非法参数（空 id 列表、非字符串 bookId 等）
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// 传输或服务端错误
    #[error("remote error: {message}")]
    Remote { message: String, code: Option<i32> },
}

impl StoreError {
    /// 从 reqwest 传输错误构造（只保留错误文本，与服务端错误同一通道上报）
    pub fn transport(err: reqwest::Error) -> Self {
        StoreError::Remote {
            message: err.to_string(),
            code: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
