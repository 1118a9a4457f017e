//! 账号聚合
//!
//! 登录态状态机（未登录 -> 登录中 -> 已登录 -> 登出）加上当前用户的个人投影：
//! 创作列表、书架、阅读进度、通知收件箱。除注册/登录走账号 REST 服务外，
//! 其余读写都通过文档网关完成。

use crate::reader::account::listener::{AccountListener, EmptyAccountListener};
use crate::reader::account::models::{AccountState, User};
use crate::reader::auth::AuthApi;
use crate::reader::book::cache::decode_books;
use crate::reader::book::models::{Book, BOOK_DATE_FIELDS};
use crate::reader::chapter::cache::fetch_sorted_chapters;
use crate::reader::chapter::models::Chapter;
use crate::reader::error::StoreError;
use crate::reader::gateway::{collections, DocumentGateway};
use crate::reader::serialization::{
    current_date_text, generate_id, normalize_timestamps, server_timestamp_now,
};
use crate::reader::session::SessionStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// 创作字段更新的允许列表；"series" 以 [series, bookNum] 成对更新
const UPDATABLE_FIELDS: &[&str] = &[
    "progressStatus",
    "title",
    "cover",
    "genreList",
    "language",
    "translator",
    "description",
    "series",
];

/// 账号聚合
pub struct AccountAggregate {
    gateway: Arc<dyn DocumentGateway>,
    auth: AuthApi,
    session: Arc<SessionStore>,
    listener: RwLock<Arc<dyn AccountListener>>,
    state: RwLock<AccountState>,
}

/// 把 partial 字段合并进用户资料（未知字段忽略）
fn merge_user(user: &User, fields: &Value) -> User {
    let mut base = serde_json::to_value(user).unwrap_or(Value::Null);
    if let (Some(target), Some(updates)) = (base.as_object_mut(), fields.as_object()) {
        for (key, value) in updates {
            target.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(base).unwrap_or_else(|_| user.clone())
}

impl AccountAggregate {
    pub fn new(
        gateway: Arc<dyn DocumentGateway>,
        auth: AuthApi,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            gateway,
            auth,
            session,
            listener: RwLock::new(Arc::new(EmptyAccountListener)),
            state: RwLock::new(AccountState::default()),
        }
    }

    /// 注册账号监听器
    pub async fn set_listener(&self, listener: Arc<dyn AccountListener>) {
        *self.listener.write().await = listener;
    }

    async fn listener(&self) -> Arc<dyn AccountListener> {
        self.listener.read().await.clone()
    }

    /// 当前状态快照
    pub async fn state(&self) -> AccountState {
        self.state.read().await.clone()
    }

    async fn begin_loading(&self) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.error = None;
    }

    async fn fail<T>(&self, e: StoreError) -> Result<T, StoreError> {
        let mut state = self.state.write().await;
        state.loading = false;
        state.error = Some(e.to_string());
        Err(e)
    }

    /// 已登录校验，返回当前用户的文档 id
    async fn require_login_user_id(&self) -> Result<String, StoreError> {
        let state = self.state.read().await;
        if !state.is_login {
            return Err(StoreError::Validation("You need to login".to_string()));
        }
        state
            .user
            .as_ref()
            .map(|u| u.id.clone())
            .ok_or_else(|| StoreError::Validation("You need to login".to_string()))
    }

    /// 把服务器用户对象的去范式化字段写入聚合状态
    fn populate_from_user(state: &mut AccountState, user: &User) {
        state.current_book_id = user.current_book_id.clone();
        state.current_chapter_num = user.current_book_chapter_num;
        state.creation_id_list = user.creation_id_list.clone();
        state.library_book_id_list = user.library_book_id_list.clone();
        state.notification_list = user.notification_list.clone();
        state.username = user.username.clone();
    }

    // ------------------------------------------------------------------
    // 注册 / 登录 / 登出
    // ------------------------------------------------------------------

    /// 注册：本地校验通过后调用账号服务；成功后不会自动登录
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
        repeat_password: &str,
    ) -> Result<(), StoreError> {
        if email.is_empty() || username.is_empty() || password.is_empty() || repeat_password.is_empty()
        {
            let e = StoreError::Validation("Vui lòng nhập đầy đủ thông tin!".to_string());
            return self.fail(e).await;
        }
        if password != repeat_password {
            let e = StoreError::Validation("Mật khẩu nhập lại không khớp!".to_string());
            return self.fail(e).await;
        }

        self.begin_loading().await;
        match self.auth.register(email, password, username).await {
            Ok(resp) => {
                info!("[Account] ✅ 注册成功, uid: {}", resp.uid);
                self.state.write().await.loading = false;
                Ok(())
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 邮箱密码登录：持久化会话并填充个人投影
    pub async fn login(&self, email: &str, password: &str) -> Result<User, StoreError> {
        if email.is_empty() || password.is_empty() {
            let e = StoreError::Validation("Vui lòng nhập đầy đủ thông tin!".to_string());
            return self.fail(e).await;
        }

        self.begin_loading().await;
        let resp = match self.auth.login(email, password).await {
            Ok(resp) => resp,
            Err(e) => return self.fail(e).await,
        };

        if let Err(e) = self.session.persist(&resp.user, &resp.token).await {
            warn!("[Account] 会话持久化失败: {}", e);
        }

        info!(
            "[Account] ✅ 登录成功: {} ({})",
            resp.user.display_name(),
            resp.user_id
        );
        {
            let mut state = self.state.write().await;
            state.loading = false;
            state.user = Some(resp.user.clone());
            state.user_id = Some(resp.user_id.clone());
            Self::populate_from_user(&mut state, &resp.user);
            state.is_login = true;
        }

        let user_json = serde_json::to_string(&resp.user).unwrap_or_default();
        self.listener().await.on_login(user_json).await;
        Ok(resp.user)
    }

    /// Google 登录：只从后端换取 token，会话用户在本地组装并标记 provider。
    /// 服务器侧的列表字段不会被填充，保持初始空值（与邮箱路径的有意非对称）
    pub async fn login_google(
        &self,
        uid: &str,
        email: &str,
        name: &str,
        photo_url: &str,
    ) -> Result<User, StoreError> {
        self.begin_loading().await;
        let resp = match self.auth.login_google(uid, email, name, photo_url).await {
            Ok(resp) => resp,
            Err(e) => return self.fail(e).await,
        };

        let user = User {
            id: uid.to_string(),
            email: Some(email.to_string()),
            name: Some(name.to_string()),
            avatar: Some(photo_url.to_string()),
            provider: Some("google".to_string()),
            ..Default::default()
        };

        if let Err(e) = self.session.persist(&user, &resp.token).await {
            warn!("[Account] 会话持久化失败: {}", e);
        }

        info!("[Account] ✅ Google 登录成功: {}", name);
        {
            let mut state = self.state.write().await;
            state.loading = false;
            state.user = Some(user.clone());
            state.is_login = true;
        }

        let user_json = serde_json::to_string(&user).unwrap_or_default();
        self.listener().await.on_login(user_json).await;
        Ok(user)
    }

    /// 直接读取 Users 文档建立会话（测试账号/离线演示路径）
    pub async fn login_with_store_account(&self, user_id: &str) -> Result<User, StoreError> {
        self.begin_loading().await;
        let doc = match self.gateway.get_by_id(collections::USERS, user_id).await {
            Ok(doc) => doc,
            Err(e) => return self.fail(e).await,
        };

        let mut user: User = match serde_json::from_value(doc) {
            Ok(user) => user,
            Err(e) => {
                return self
                    .fail(StoreError::Remote {
                        message: format!("用户文档解析失败: {}", e),
                        code: None,
                    })
                    .await
            }
        };
        if user.id.is_empty() {
            user.id = user_id.to_string();
        }

        info!("[Account] ✅ 存储账号登录成功: {}", user_id);
        {
            let mut state = self.state.write().await;
            state.loading = false;
            state.user = Some(user.clone());
            state.user_id = Some(user.id.clone());
            Self::populate_from_user(&mut state, &user);
            state.is_login = true;
        }

        let user_json = serde_json::to_string(&user).unwrap_or_default();
        self.listener().await.on_login(user_json).await;
        Ok(user)
    }

    /// 启动时从本地恢复会话；两个 key 不齐时保持未登录
    pub async fn restore_session(&self) -> Result<Option<User>, StoreError> {
        let stored = self
            .session
            .restore()
            .await
            .map_err(|e| StoreError::Remote {
                message: e.to_string(),
                code: None,
            })?;

        let Some(stored) = stored else {
            debug!("[Account] 本地无会话，保持未登录");
            return Ok(None);
        };

        info!("[Account] ♻️ 会话恢复: {}", stored.user.display_name());
        {
            let mut state = self.state.write().await;
            state.user = Some(stored.user.clone());
            state.user_id = Some(stored.user.id.clone());
            Self::populate_from_user(&mut state, &stored.user);
            state.is_login = true;
        }

        let user_json = serde_json::to_string(&stored.user).unwrap_or_default();
        self.listener().await.on_session_restored(user_json).await;
        Ok(Some(stored.user))
    }

    /// 登出：清除本地会话并把所有账号态字段重置为初始值（完整拆除）
    pub async fn logout(&self) -> Result<(), StoreError> {
        self.begin_loading().await;
        if let Err(e) = self.session.clear().await {
            return self
                .fail(StoreError::Remote {
                    message: e.to_string(),
                    code: None,
                })
                .await;
        }

        *self.state.write().await = AccountState::default();
        info!("[Account] 👋 已登出，账号态已重置");
        self.listener().await.on_logout().await;
        Ok(())
    }

    /// 更新用户资料（尽力而为）：先尝试账号服务的 PUT，任何失败都回退为
    /// 本地合并并照常成功；调用方无法区分两种结果
    pub async fn update_profile(&self, fields: Value) -> Result<User, StoreError> {
        let current_user = {
            let state = self.state.read().await;
            state.user.clone()
        };
        let Some(current_user) = current_user else {
            let e = StoreError::Validation("Không tìm thấy người dùng!".to_string());
            return self.fail(e).await;
        };

        self.begin_loading().await;
        let token = self.session.token().await.ok().flatten().unwrap_or_default();

        let merged = match self.auth.update_profile(&token, &fields).await {
            Ok(resp) => {
                let payload = resp.user.unwrap_or_else(|| fields.clone());
                merge_user(&current_user, &payload)
            }
            Err(e) => {
                // 账号服务不可用时只更新本地（有意吞掉失败）
                info!("[Account] 资料更新接口不可用，仅更新本地: {}", e);
                merge_user(&current_user, &fields)
            }
        };

        if let Err(e) = self.session.persist_user(&merged).await {
            return self
                .fail(StoreError::Remote {
                    message: e.to_string(),
                    code: None,
                })
                .await;
        }

        info!("[Account] ✅ 用户资料已更新");
        {
            let mut state = self.state.write().await;
            state.loading = false;
            if merged.username.is_some() {
                state.username = merged.username.clone();
            }
            state.user = Some(merged.clone());
        }

        let user_json = serde_json::to_string(&merged).unwrap_or_default();
        self.listener().await.on_profile_updated(user_json).await;
        Ok(merged)
    }

    // ------------------------------------------------------------------
    // 创作流程
    // ------------------------------------------------------------------

    /// 初始化创作草稿：铸造作品 id 与首章 id，盖今天的日期戳，
    /// 状态置为连载中，并把新 id 追加进本地创作列表
    pub async fn init_new_creation(&self) -> (String, String) {
        let today = current_date_text();
        let book_id = generate_id();
        let chapter_id = generate_id();

        let mut state = self.state.write().await;
        state.new_creation.publish_date = today.clone();
        state.new_creation.last_update_date = today.clone();
        state.new_creation.book_id = book_id.clone();
        state.new_creation.progress_status = "đang cập nhật".to_string();

        state.new_creation_chapter.book_id = book_id.clone();
        state.new_creation_chapter.chapter_id = chapter_id.clone();
        state.new_creation_chapter.chapter_num = 1;
        state.new_creation_chapter.publish_date = today.clone();
        state.new_creation_chapter.last_update_date = today;

        state.creation_id_list.push(book_id.clone());
        debug!("[Account] 创作草稿初始化: {}", book_id);
        (book_id, chapter_id)
    }

    /// 编辑作品草稿（创建流程分步填写）
    pub async fn edit_new_creation(&self, f: impl FnOnce(&mut Book)) {
        let mut state = self.state.write().await;
        f(&mut state.new_creation);
    }

    /// 编辑首章/新章草稿
    pub async fn edit_new_creation_chapter(&self, f: impl FnOnce(&mut Chapter)) {
        let mut state = self.state.write().await;
        f(&mut state.new_creation_chapter);
    }

    /// 初始化追加章节草稿：盖日期戳、铸造新章 id；
    /// bookId / chapterNum 只在还未填写时才落默认值
    pub async fn init_new_chapter(&self, book_id: &str, chapter_num: u32) -> String {
        let today = current_date_text();
        let chapter_id = generate_id();

        let mut state = self.state.write().await;
        state.new_creation_chapter.publish_date = today.clone();
        state.new_creation_chapter.last_update_date = today;
        state.new_creation_chapter.chapter_id = chapter_id.clone();
        if state.new_creation_chapter.book_id.is_empty() {
            state.new_creation_chapter.book_id = book_id.to_string();
        }
        if state.new_creation_chapter.chapter_num == 0 {
            state.new_creation_chapter.chapter_num = chapter_num;
        }
        chapter_id
    }

    pub async fn clear_new_creation(&self) {
        self.state.write().await.new_creation = Book::default();
    }

    pub async fn clear_new_creation_chapter(&self) {
        self.state.write().await.new_creation_chapter = Chapter::default();
    }

    /// 提交创作草稿：作品与首章各写一次，两次写入之间不构成事务
    /// （中途失败会留下没有章节的作品，为已接受的缺口）
    pub async fn upload_new_creation(&self) -> Result<(String, String), StoreError> {
        let (book, chapter) = {
            let mut state = self.state.write().await;
            state.uploading = true;
            state.error = None;
            (state.new_creation.clone(), state.new_creation_chapter.clone())
        };

        let book_doc = serde_json::to_value(&book).unwrap_or(Value::Null);
        let chapter_doc = serde_json::to_value(&chapter).unwrap_or(Value::Null);

        let result: Result<(), StoreError> = async {
            self.gateway
                .set_doc(collections::BOOKS, &book.book_id, book_doc)
                .await?;
            self.gateway
                .set_doc(collections::CHAPTERS, &chapter.chapter_id, chapter_doc)
                .await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                info!(
                    "[Account] ✅ 作品与首章上传成功: {} / {}",
                    book.book_id, chapter.chapter_id
                );
                self.state.write().await.uploading = false;
                Ok((book.book_id, chapter.chapter_id))
            }
            Err(e) => {
                let mut state = self.state.write().await;
                state.uploading = false;
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// 追加新章：只写章节文档，不自动刷新父作品的 lastUpdateDate
    /// （与编辑章节的副作用契约不同，沿用来源行为）
    pub async fn upload_new_chapter(&self) -> Result<String, StoreError> {
        let chapter = {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
            state.new_creation_chapter.clone()
        };

        let chapter_doc = serde_json::to_value(&chapter).unwrap_or(Value::Null);
        match self
            .gateway
            .set_doc(collections::CHAPTERS, &chapter.chapter_id, chapter_doc)
            .await
        {
            Ok(()) => {
                info!("[Account] ✅ 新章上传成功: {}", chapter.chapter_id);
                self.state.write().await.loading = false;
                Ok(chapter.chapter_id)
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 编辑章节内容：章节与父作品的 lastUpdateDate 都会刷新
    pub async fn update_chapter(
        &self,
        chapter_id: &str,
        book_id: &str,
        title: &str,
        content: &str,
    ) -> Result<(), StoreError> {
        self.begin_loading().await;
        let result: Result<(), StoreError> = async {
            self.gateway
                .update_doc(
                    collections::CHAPTERS,
                    chapter_id,
                    json!({
                        "lastUpdateDate": server_timestamp_now(),
                        "chapterTitle": title,
                        "chapterContent": content,
                    }),
                )
                .await?;
            self.gateway
                .update_doc(
                    collections::BOOKS,
                    book_id,
                    json!({ "lastUpdateDate": server_timestamp_now() }),
                )
                .await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                info!("[Account] ✅ 章节更新成功: {}", chapter_id);
                self.state.write().await.loading = false;
                Ok(())
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 更新作品的单个字段（允许列表内）；series 以 [series, bookNum] 成对更新；
    /// 未知字段记日志后跳过，不报错也不产生写入。每次实际更新都会刷新 lastUpdateDate
    pub async fn update_creation_field(
        &self,
        book_id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        self.begin_loading().await;

        if !UPDATABLE_FIELDS.contains(&field) {
            warn!("[Account] 未知的更新字段: {}", field);
            self.state.write().await.loading = false;
            return Ok(());
        }

        let mut fields = serde_json::Map::new();
        fields.insert("lastUpdateDate".to_string(), server_timestamp_now());
        if field == "series" {
            let pair = value.as_array().cloned().unwrap_or_default();
            fields.insert(
                "series".to_string(),
                pair.first().cloned().unwrap_or(Value::Null),
            );
            fields.insert(
                "bookNum".to_string(),
                pair.get(1).cloned().unwrap_or(Value::Null),
            );
        } else {
            fields.insert(field.to_string(), value);
        }
        let fields = Value::Object(fields);

        debug!("[Account] 更新作品字段 {}: {}", book_id, field);
        match self
            .gateway
            .update_doc(collections::BOOKS, book_id, fields)
            .await
        {
            Ok(()) => {
                info!("[Account] ✅ 作品字段更新成功: {}", field);
                self.state.write().await.loading = false;
                Ok(())
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 删除作品并级联删除其全部章节。两步不是原子的：
    /// 中途失败会留下孤儿章节，不自动重试（已接受的缺口）
    pub async fn delete_book_and_chapters(&self, book_id: &str) -> Result<(), StoreError> {
        self.begin_loading().await;
        let result: Result<(), StoreError> = async {
            self.gateway.delete_doc(collections::BOOKS, book_id).await?;

            let chapters = self
                .gateway
                .query_by_field(collections::CHAPTERS, "bookId", json!(book_id))
                .await?;
            for chapter in &chapters {
                if let Some(chapter_id) = chapter
                    .get("chapterId")
                    .and_then(|v| v.as_str())
                {
                    self.gateway
                        .delete_doc(collections::CHAPTERS, chapter_id)
                        .await?;
                }
            }
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                info!("[Account] ✅ 作品及章节删除成功: {}", book_id);
                let mut state = self.state.write().await;
                state.loading = false;
                state.selected_creation = None;
                Ok(())
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 删除单个章节，不触碰父作品
    pub async fn delete_chapter(&self, chapter_id: &str) -> Result<(), StoreError> {
        self.begin_loading().await;
        match self
            .gateway
            .delete_doc(collections::CHAPTERS, chapter_id)
            .await
        {
            Ok(()) => {
                info!("[Account] ✅ 章节删除成功: {}", chapter_id);
                self.state.write().await.loading = false;
                Ok(())
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 批量拉取本人创作的作品实体
    pub async fn fetch_account_creations(&self, ids: &[String]) -> Result<Vec<Book>, StoreError> {
        if ids.is_empty() {
            let e = StoreError::InvalidArgument("Invalid book IDs array".to_string());
            return self.fail(e).await;
        }
        self.begin_loading().await;
        debug!("[Account] 批量拉取 {} 本创作...", ids.len());
        let docs = self.gateway.batch_get_by_ids(collections::BOOKS, ids).await;
        let books = decode_books(docs);
        info!("[Account] ✅ 创作列表拉取成功，共 {} 本", books.len());
        let mut state = self.state.write().await;
        state.loading = false;
        state.creation_list = books.clone();
        Ok(books)
    }

    /// 按 bookId 字段查询单本创作（取第一条命中，无命中返回 None）
    pub async fn fetch_creation_by_id(&self, book_id: &str) -> Result<Option<Book>, StoreError> {
        self.begin_loading().await;
        match self
            .gateway
            .query_by_field(collections::BOOKS, "bookId", json!(book_id))
            .await
        {
            Ok(docs) => {
                let book = docs.into_iter().next().and_then(|mut doc| {
                    normalize_timestamps(&mut doc, BOOK_DATE_FIELDS);
                    serde_json::from_value::<Book>(doc).ok()
                });
                if book.is_none() {
                    debug!("[Account] 未找到 bookId 匹配的作品: {}", book_id);
                }
                let mut state = self.state.write().await;
                state.loading = false;
                state.selected_creation = book.clone();
                Ok(book)
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 拉取选中创作的章节（升序）
    pub async fn fetch_chapters_of_selected_creation(
        &self,
        book_id: &str,
    ) -> Result<Vec<Chapter>, StoreError> {
        self.begin_loading().await;
        match fetch_sorted_chapters(&self.gateway, book_id).await {
            Ok(chapters) => {
                info!(
                    "[Account] ✅ 选中创作章节拉取成功，共 {} 章",
                    chapters.len()
                );
                let mut state = self.state.write().await;
                state.loading = false;
                state.chapters_of_selected_creation = chapters.clone();
                Ok(chapters)
            }
            Err(e) => self.fail(e).await,
        }
    }

    // ------------------------------------------------------------------
    // 书架
    // ------------------------------------------------------------------

    /// 收藏：服务端做集合并集更新，成功后把本地 id 列表镜像到一致
    /// （只在成功分支更新本地，失败不回滚本地——本地此时还没改过）
    pub async fn add_to_library(&self, book_id: &str) -> Result<(), StoreError> {
        let user_id = match self.require_login_user_id().await {
            Ok(id) => id,
            Err(e) => return self.fail(e).await,
        };
        self.begin_loading().await;

        match self
            .gateway
            .array_union(
                collections::USERS,
                &user_id,
                "libraryBookIdList",
                json!(book_id),
            )
            .await
        {
            Ok(()) => {
                info!("[Account] ✅ 已加入书架: {}", book_id);
                let mut state = self.state.write().await;
                state.loading = false;
                if !state.library_book_id_list.iter().any(|id| id == book_id) {
                    state.library_book_id_list.push(book_id.to_string());
                }
                Ok(())
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 取消收藏：移除不存在的 id 是 no-op，不是错误
    pub async fn remove_from_library(&self, book_id: &str) -> Result<(), StoreError> {
        let user_id = match self.require_login_user_id().await {
            Ok(id) => id,
            Err(e) => return self.fail(e).await,
        };
        self.begin_loading().await;

        match self
            .gateway
            .array_remove(
                collections::USERS,
                &user_id,
                "libraryBookIdList",
                json!(book_id),
            )
            .await
        {
            Ok(()) => {
                info!("[Account] ✅ 已移出书架: {}", book_id);
                let mut state = self.state.write().await;
                state.loading = false;
                state.library_book_id_list.retain(|id| id != book_id);
                Ok(())
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 批量拉取书架作品实体（与作品缓存的全量列表各自独立）
    pub async fn fetch_library_books(&self, ids: &[String]) -> Result<Vec<Book>, StoreError> {
        if ids.is_empty() {
            let e = StoreError::InvalidArgument("Invalid book IDs array".to_string());
            return self.fail(e).await;
        }
        self.begin_loading().await;
        debug!("[Account] 批量拉取 {} 本书架作品...", ids.len());
        let docs = self.gateway.batch_get_by_ids(collections::BOOKS, ids).await;
        let books = decode_books(docs);
        info!("[Account] ✅ 书架拉取成功，共 {} 本", books.len());
        let mut state = self.state.write().await;
        state.loading = false;
        state.library_book_list = books.clone();
        Ok(books)
    }

    // ------------------------------------------------------------------
    // 阅读进度
    // ------------------------------------------------------------------

    /// 设置阅读进度：本地立即生效，随后把同一对值写回用户文档；
    /// 写回失败只记入错误槽，本地值保留（本地优先）
    pub async fn set_current_position(
        &self,
        book_id: &str,
        chapter_num: u32,
    ) -> Result<(), StoreError> {
        {
            let mut state = self.state.write().await;
            state.current_book_id = Some(book_id.to_string());
            state.current_chapter_num = Some(chapter_num);
        }

        let user_id = match self.require_login_user_id().await {
            Ok(id) => id,
            Err(e) => return self.fail(e).await,
        };

        match self
            .gateway
            .update_doc(
                collections::USERS,
                &user_id,
                json!({
                    "currentBookId": book_id,
                    "currentBookChapterNum": chapter_num,
                }),
            )
            .await
        {
            Ok(()) => {
                info!("[Account] ✅ 阅读进度已保存: {} 第 {} 章", book_id, chapter_num);
                Ok(())
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 拉取当前阅读中的作品。已缓存且 id 匹配时不再请求（防冗余拉取守卫）；
    /// 指针为空返回 None；文档不存在同样返回 None 而不是错误
    pub async fn fetch_current_book(&self) -> Result<Option<Book>, StoreError> {
        let (book_id, cached) = {
            let state = self.state.read().await;
            (state.current_book_id.clone(), state.current_book.clone())
        };
        let Some(book_id) = book_id else {
            return Ok(None);
        };
        if let Some(cached) = cached {
            if cached.book_id == book_id {
                debug!("[Account] 当前作品已缓存，跳过拉取: {}", book_id);
                return Ok(Some(cached));
            }
        }

        self.begin_loading().await;
        match self.gateway.get_by_id(collections::BOOKS, &book_id).await {
            Ok(mut doc) => {
                normalize_timestamps(&mut doc, BOOK_DATE_FIELDS);
                // 与来源一致：文档缺 bookId 字段时以指针 id 补齐
                if let Some(map) = doc.as_object_mut() {
                    map.entry("bookId".to_string())
                        .or_insert_with(|| json!(book_id));
                }
                let book = serde_json::from_value::<Book>(doc).ok();
                let mut state = self.state.write().await;
                state.loading = false;
                state.current_book = book.clone();
                Ok(book)
            }
            Err(e) if e.is_not_found() => {
                debug!("[Account] 当前作品不存在: {}", book_id);
                let mut state = self.state.write().await;
                state.loading = false;
                state.current_book = None;
                Ok(None)
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// 拉取当前阅读中作品的章节（升序）；已缓存当前书的章节时跳过
    pub async fn fetch_chapters_of_current_book(&self) -> Result<Vec<Chapter>, StoreError> {
        let (book_id, cached) = {
            let state = self.state.read().await;
            (
                state.current_book_id.clone(),
                state.chapters_of_current_book.clone(),
            )
        };
        let Some(book_id) = book_id else {
            return Ok(Vec::new());
        };
        if !cached.is_empty() && cached.iter().all(|c| c.book_id == book_id) {
            debug!("[Account] 当前作品章节已缓存，跳过拉取: {}", book_id);
            return Ok(cached);
        }

        self.begin_loading().await;
        match fetch_sorted_chapters(&self.gateway, &book_id).await {
            Ok(chapters) => {
                info!(
                    "[Account] ✅ 当前作品章节拉取成功，共 {} 章",
                    chapters.len()
                );
                let mut state = self.state.write().await;
                state.loading = false;
                state.chapters_of_current_book = chapters.clone();
                Ok(chapters)
            }
            Err(e) => self.fail(e).await,
        }
    }
}
