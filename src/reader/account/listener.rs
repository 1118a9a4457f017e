//! 账号监听器回调接口

use async_trait::async_trait;

/// 账号监听器回调接口（登录态变化时由聚合层触发）
#[async_trait]
pub trait AccountListener: Send + Sync {
    /// 登录成功，参数为用户资料 JSON 字符串
    async fn on_login(&self, user_json: String);

    /// 启动时从本地恢复会话成功
    async fn on_session_restored(&self, user_json: String);

    /// 用户资料更新完成（远端确认或本地合并，对外不区分）
    async fn on_profile_updated(&self, user_json: String);

    /// 已登出，账号态已全部重置
    async fn on_logout(&self);
}

/// 空实现（默认监听器）
pub struct EmptyAccountListener;

#[async_trait]
impl AccountListener for EmptyAccountListener {
    async fn on_login(&self, _user_json: String) {}
    async fn on_session_restored(&self, _user_json: String) {}
    async fn on_profile_updated(&self, _user_json: String) {}
    async fn on_logout(&self) {}
}
