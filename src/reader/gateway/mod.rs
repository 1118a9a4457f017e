//! 远程数据网关
//!
//! 封装文档存储的原语操作（按 id 读取、字段查询、批量读取、写入、更新、删除）。
//! 文档以 `serde_json::Value` 形式流经网关，各缓存层再转换为强类型模型。
//! 网关自身不做任何重试，失败以 [`StoreError`] 上报，是否重试由调用方决定。

pub mod memory;
pub mod rest;

pub use memory::MemoryGateway;
pub use rest::RestDocumentGateway;

use crate::reader::error::StoreError;
use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::Value;
use tracing::debug;

/// 文档集合名
pub mod collections {
    pub const BOOKS: &str = "Books";
    pub const CHAPTERS: &str = "Chapters";
    pub const USERS: &str = "Users";
    pub const GENRE: &str = "Genre";
    pub const REVIEWS: &str = "Reviews";
}

/// 批量读取的分块大小，限制同时在途的读请求数
const BATCH_SIZE: usize = 10;

/// 文档存储网关接口
#[async_trait]
pub trait DocumentGateway: Send + Sync {
    /// 按 id 读取单个文档；不存在时返回 `NotFound`
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Value, StoreError>;

    /// 按单字段等值查询
    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Value>, StoreError>;

    /// 多字段等值查询（逻辑与）
    async fn query_by_fields(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> Result<Vec<Value>, StoreError>;

    /// 数组字段包含查询（如按 genreList 中的标签搜索）
    async fn query_array_contains(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Value>, StoreError>;

    /// 读取整个集合
    async fn get_all(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// 以指定 id 写入整个文档（覆盖）
    async fn set_doc(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError>;

    /// 局部更新文档字段
    async fn update_doc(&self, collection: &str, id: &str, fields: Value)
        -> Result<(), StoreError>;

    /// 删除文档
    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// 数组字段并集更新（集合语义，重复值不追加）
    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;

    /// 数组字段差集更新（移除不存在的值是 no-op）
    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;

    /// 批量按 id 读取：按 BATCH_SIZE 分块，块内并发执行，结果按块序拼接。
    /// 读取失败或不存在的 id 直接丢弃，不向调用方暴露部分失败。
    /// 返回顺序不保证与入参一致，调用方需要自行按 id 重排。
    async fn batch_get_by_ids(&self, collection: &str, ids: &[String]) -> Vec<Value> {
        let mut docs = Vec::new();
        for chunk in ids.chunks(BATCH_SIZE) {
            let futures = chunk.iter().map(|id| self.get_by_id(collection, id));
            for (id, result) in chunk.iter().zip(join_all(futures).await) {
                match result {
                    Ok(doc) => docs.push(doc),
                    Err(e) => {
                        debug!("[Gateway] 批量读取丢弃 {}/{}: {}", collection, id, e);
                    }
                }
            }
        }
        docs
    }
}
