//! 内存版文档存储网关
//!
//! 行为与 REST 网关对齐，用于单元/集成测试和 CLI 的离线演示模式。

use crate::reader::error::StoreError;
use crate::reader::gateway::DocumentGateway;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

type Collections = HashMap<String, HashMap<String, Value>>;

/// 内存文档存储
#[derive(Default)]
pub struct MemoryGateway {
    collections: RwLock<Collections>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一个文档（测试和离线演示用）
    pub async fn seed(&self, collection: &str, id: &str, doc: Value) {
        let mut cols = self.collections.write().await;
        cols.entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
    }

    fn matches(doc: &Value, filters: &[(&str, Value)]) -> bool {
        filters
            .iter()
            .all(|(field, value)| doc.get(*field) == Some(value))
    }
}

#[async_trait]
impl DocumentGateway for MemoryGateway {
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        let cols = self.collections.read().await;
        cols.get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Value>, StoreError> {
        self.query_by_fields(collection, &[(field, value)]).await
    }

    async fn query_by_fields(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> Result<Vec<Value>, StoreError> {
        let cols = self.collections.read().await;
        Ok(cols
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| Self::matches(doc, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_array_contains(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let cols = self.collections.read().await;
        Ok(cols
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| {
                        doc.get(field)
                            .and_then(|v| v.as_array())
                            .map(|items| items.contains(&value))
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let cols = self.collections.read().await;
        Ok(cols
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn set_doc(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        self.seed(collection, id, doc).await;
        Ok(())
    }

    async fn update_doc(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), StoreError> {
        let mut cols = self.collections.write().await;
        let doc = cols
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        let (Some(target), Some(updates)) = (doc.as_object_mut(), fields.as_object()) else {
            return Err(StoreError::InvalidArgument(
                "更新内容必须是对象".to_string(),
            ));
        };
        for (key, value) in updates {
            target.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut cols = self.collections.write().await;
        if let Some(docs) = cols.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut cols = self.collections.write().await;
        let doc = cols
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        let map = doc.as_object_mut().ok_or_else(|| {
            StoreError::InvalidArgument("文档不是对象".to_string())
        })?;
        let entry = map
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        let Some(items) = entry.as_array_mut() else {
            return Err(StoreError::InvalidArgument(format!(
                "字段不是数组: {}",
                field
            )));
        };
        if !items.contains(&value) {
            items.push(value);
        }
        Ok(())
    }

    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut cols = self.collections.write().await;
        let doc = cols
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        if let Some(items) = doc.get_mut(field).and_then(|v| v.as_array_mut()) {
            items.retain(|item| item != &value);
        }
        Ok(())
    }
}
