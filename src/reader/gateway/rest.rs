//! 文档存储 HTTP 网关实现
//!
//! 所有操作 POST 到 `{base}/store/*`，响应统一为 `{errCode, errMsg, data}` 包装。

use crate::reader::error::StoreError;
use crate::reader::gateway::DocumentGateway;
use crate::reader::types::{err_code, handle_http_response, ApiResponse};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

/// 基于 reqwest 的文档存储网关
pub struct RestDocumentGateway {
    client: reqwest::Client,
    store_base_url: String,
}

impl RestDocumentGateway {
    /// `client` 应该已经在外部配置好认证拦截器
    pub fn new(client: reqwest::Client, store_base_url: String) -> Self {
        Self {
            client,
            store_base_url,
        }
    }

    async fn post(
        &self,
        op: &str,
        body: Value,
        operation_name: &str,
    ) -> Result<ApiResponse<Value>, StoreError> {
        let url = format!("{}/store/{}", self.store_base_url, op);
        debug!("[Gateway] 📡 {} -> {}", operation_name, url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(StoreError::transport)?;

        handle_http_response(response, operation_name).await
    }

    /// 解析包装响应：errCode 0 为成功，1004 映射为 NotFound，其余映射为 Remote
    fn unwrap_data(
        resp: ApiResponse<Value>,
        collection: &str,
        id: &str,
    ) -> Result<Value, StoreError> {
        if resp.err_code == err_code::RECORD_NOT_FOUND {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        if resp.err_code != err_code::OK {
            return Err(StoreError::Remote {
                message: resp.err_msg,
                code: Some(resp.err_code),
            });
        }
        Ok(resp.data.unwrap_or(Value::Null))
    }

    fn unwrap_list(resp: ApiResponse<Value>) -> Result<Vec<Value>, StoreError> {
        if resp.err_code != err_code::OK {
            return Err(StoreError::Remote {
                message: resp.err_msg,
                code: Some(resp.err_code),
            });
        }
        match resp.data {
            Some(Value::Array(docs)) => Ok(docs),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(StoreError::Remote {
                message: format!("查询响应不是数组: {}", other),
                code: None,
            }),
        }
    }

    fn unwrap_unit(resp: ApiResponse<Value>, collection: &str, id: &str) -> Result<(), StoreError> {
        Self::unwrap_data(resp, collection, id).map(|_| ())
    }
}

#[async_trait]
impl DocumentGateway for RestDocumentGateway {
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        let resp = self
            .post(
                "get",
                json!({ "collection": collection, "id": id }),
                "读取文档",
            )
            .await?;
        let doc = Self::unwrap_data(resp, collection, id)?;
        if doc.is_null() {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(doc)
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
        let filters: Vec<Value> = filters
            .iter()
            .map(|(field, value)| json!({ "field": field, "op": "==", "value": value }))
            .collect();
        let resp = self
            .post(
                "query",
                json!({ "collection": collection, "filters": filters }),
                "字段查询",
            )
            .await?;
        Self::unwrap_list(resp)
    }

    async fn query_array_contains(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let resp = self
            .post(
                "query",
                json!({
                    "collection": collection,
                    "filters": [{ "field": field, "op": "array-contains", "value": value }],
                }),
                "数组包含查询",
            )
            .await?;
        Self::unwrap_list(resp)
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let resp = self
            .post(
                "query",
                json!({ "collection": collection, "filters": [] }),
                "全量读取",
            )
            .await?;
        Self::unwrap_list(resp)
    }

    async fn set_doc(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        let resp = self
            .post(
                "set",
                json!({ "collection": collection, "id": id, "doc": doc }),
                "写入文档",
            )
            .await?;
        Self::unwrap_unit(resp, collection, id)
    }

    async fn update_doc(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), StoreError> {
        let resp = self
            .post(
                "update",
                json!({ "collection": collection, "id": id, "fields": fields }),
                "更新文档",
            )
            .await?;
        Self::unwrap_unit(resp, collection, id)
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let resp = self
            .post(
                "delete",
                json!({ "collection": collection, "id": id }),
                "删除文档",
            )
            .await?;
        Self::unwrap_unit(resp, collection, id)
    }

    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let resp = self
            .post(
                "array_union",
                json!({ "collection": collection, "id": id, "field": field, "value": value }),
                "数组并集更新",
            )
            .await?;
        Self::unwrap_unit(resp, collection, id)
    }

    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let resp = self
            .post(
                "array_remove",
                json!({ "collection": collection, "id": id, "field": field, "value": value }),
                "数组差集更新",
            )
            .await?;
        Self::unwrap_unit(resp, collection, id)
    }
}
