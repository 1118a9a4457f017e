//! 账号 REST 服务客户端
//!
//! 覆盖 `/accounts/register`、`/accounts/login`、`/accounts/loginGoogle`、
//! `/accounts/update` 四个端点。非 2xx 响应取 body 中的 `error` 字段作为
//! 失败原因，缺失时回退到各操作的默认提示文案；传输错误透传错误文本。

use crate::reader::account::User;
use crate::reader::error::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    pub uid: String,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
struct GoogleLoginRequest<'a> {
    uid: &'a str,
    email: &'a str,
    name: &'a str,
    #[serde(rename = "photoURL")]
    photo_url: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileResponse {
    #[serde(default)]
    pub user: Option<Value>,
}

/// 服务端错误响应体
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// 账号 REST API 客户端
pub struct AuthApi {
    client: reqwest::Client,
    api_base_url: String,
}

impl AuthApi {
    pub fn new(client: reqwest::Client, api_base_url: String) -> Self {
        Self {
            client,
            api_base_url,
        }
    }

    fn accounts_url(&self, path: &str) -> String {
        format!("{}/accounts/{}", self.api_base_url, path)
    }

    /// 读取响应并反序列化；失败时以服务端 `error` 字段（或默认文案）上报
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        fallback_message: &str,
    ) -> Result<T, StoreError> {
        let status = response.status();
        let body_bytes = response.bytes().await.map_err(StoreError::transport)?;
        let body_str = String::from_utf8_lossy(&body_bytes);
        debug!("[AuthAPI] 响应 {} Body: {}", status, body_str);

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body_bytes)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| fallback_message.to_string());
            return Err(StoreError::Remote {
                message,
                code: Some(status.as_u16() as i32),
            });
        }

        serde_json::from_slice(&body_bytes).map_err(|e| StoreError::Remote {
            message: format!("解析响应失败: {}，原始响应: {}", e, body_str),
            code: None,
        })
    }

    /// 注册账号；成功只返回 uid，不会自动建立会话
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<RegisterResponse, StoreError> {
        let url = self.accounts_url("register");
        info!("[AuthAPI] 📡 注册账号: {}", email);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&RegisterRequest {
                email,
                password,
                name,
            })
            .send()
            .await
            .map_err(StoreError::transport)?;

        Self::parse_response(response, "Đăng ký thất bại!").await
    }

    /// 邮箱密码登录
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, StoreError> {
        let url = self.accounts_url("login");
        info!("[AuthAPI] 🔐 登录: {}", email);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(StoreError::transport)?;

        Self::parse_response(response, "Đăng nhập thất bại!").await
    }

    /// Google 登录：只从后端换取 token，会话内容由调用方本地组装
    pub async fn login_google(
        &self,
        uid: &str,
        email: &str,
        name: &str,
        photo_url: &str,
    ) -> Result<GoogleLoginResponse, StoreError> {
        let url = self.accounts_url("loginGoogle");
        info!("[AuthAPI] 🔐 Google 登录: {}", email);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&GoogleLoginRequest {
                uid,
                email,
                name,
                photo_url,
            })
            .send()
            .await
            .map_err(StoreError::transport)?;

        Self::parse_response(response, "Đăng nhập Google thất bại!").await
    }

    /// 更新用户资料（PUT，带 bearer token）
    pub async fn update_profile(
        &self,
        token: &str,
        fields: &Value,
    ) -> Result<UpdateProfileResponse, StoreError> {
        let url = self.accounts_url("update");
        info!("[AuthAPI] 📡 更新用户资料");

        let response = self
            .client
            .put(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .json(fields)
            .send()
            .await
            .map_err(StoreError::transport)?;

        Self::parse_response(response, "Không thể cập nhật thông tin!").await
    }
}
