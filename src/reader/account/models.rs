//! 账号本地模型定义

use crate::reader::book::Book;
use crate::reader::chapter::Chapter;
use serde::{Deserialize, Serialize};

/// 用户资料（与 Users 集合的文档/登录响应中的 user 对象对应）
///
/// 生日因历史原因可能存在于三个字段名之下，读取时按顺序取第一个非空值。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub realname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(rename = "birthDay", default)]
    pub birth_day: Option<String>,
    #[serde(rename = "dateOfBirth", default)]
    pub date_of_birth: Option<String>,
    #[serde(
        rename = "creationIdList",
        default,
        deserialize_with = "crate::reader::serialization::deserialize_vec_or_null"
    )]
    pub creation_id_list: Vec<String>,
    #[serde(
        rename = "libraryBookIdList",
        default,
        deserialize_with = "crate::reader::serialization::deserialize_vec_or_null"
    )]
    pub library_book_id_list: Vec<String>,
    #[serde(rename = "currentBookId", default)]
    pub current_book_id: Option<String>,
    #[serde(rename = "currentBookChapterNum", default)]
    pub current_book_chapter_num: Option<u32>,
    #[serde(
        rename = "notificationList",
        default,
        deserialize_with = "crate::reader::serialization::deserialize_vec_or_null"
    )]
    pub notification_list: Vec<String>,
    #[serde(
        rename = "reviewIdList",
        default,
        deserialize_with = "crate::reader::serialization::deserialize_vec_or_null"
    )]
    pub review_id_list: Vec<String>,
    /// 登录来源："google" 表示未经账号服务注册的 Google 会话
    #[serde(default)]
    pub provider: Option<String>,
}

impl User {
    /// 展示名：realname / name / username 依次回退
    pub fn display_name(&self) -> &str {
        self.realname
            .as_deref()
            .or(self.name.as_deref())
            .or(self.username.as_deref())
            .unwrap_or("")
    }

    /// 生日（兼容三个历史字段名）
    pub fn birthday(&self) -> Option<&str> {
        self.birthday
            .as_deref()
            .or(self.birth_day.as_deref())
            .or(self.date_of_birth.as_deref())
    }
}

/// 账号聚合状态快照：登录态 + 创作 / 书架 / 阅读进度 / 通知的个人投影
///
/// creation_list / library_book_list / current_book 是对 Books 集合的
/// 去范式化副本，与作品缓存相互独立，不自动同步（已知的一致性缺口）。
#[derive(Debug, Clone, Default)]
pub struct AccountState {
    pub is_login: bool,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub user: Option<User>,

    /// 本人创作的作品 id 集合与对应实体
    pub creation_id_list: Vec<String>,
    pub creation_list: Vec<Book>,

    /// 阅读进度指针（同一时刻至多一个）
    pub current_book_id: Option<String>,
    pub current_chapter_num: Option<u32>,
    pub current_book: Option<Book>,
    pub chapters_of_current_book: Vec<Chapter>,

    /// 创作管理视图当前选中的作品
    pub selected_creation: Option<Book>,
    pub chapters_of_selected_creation: Vec<Chapter>,

    /// 创建流程的草稿（作品 + 首章）
    pub new_creation: Book,
    pub new_creation_chapter: Chapter,

    /// 书架（收藏）id 集合与对应实体
    pub library_book_id_list: Vec<String>,
    pub library_book_list: Vec<Book>,

    /// 编码形式的通知列表（"text~ISO时间"）
    pub notification_list: Vec<String>,

    pub uploading: bool,
    pub loading: bool,
    pub error: Option<String>,
}
