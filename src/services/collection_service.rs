use serde_json::Value;

use crate::error::ApiError;
use crate::models::{Collection, CreateRequest, DeleteRequest, EntityKind, UpdateRequest};
use crate::store::EntityStore;

/// 所有写操作结束后都重新读取完整列表返回，客户端不做增量合并
pub async fn list(store: &dyn EntityStore, kind: EntityKind) -> Result<Collection, ApiError> {
    let entries = store.list(kind).await?;
    Ok(Collection { kind, entries })
}

fn required_message(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Word => "Name is required",
        _ => "Content is required",
    }
}

pub async fn create(store: &dyn EntityStore, kind: EntityKind, request: CreateRequest) -> Result<Collection, ApiError> {
    let entries = request.normalize(kind);
    if entries.is_empty() {
        return Err(ApiError::validation(required_message(kind)));
    }

    let inserted = store.insert_skip_duplicates(kind, &entries).await?;
    tracing::debug!("{} 批量写入: 提交 {} 条, 新增 {} 条", kind, entries.len(), inserted);

    list(store, kind).await
}

/// 从原始 JSON 解析后创建
pub async fn create_from_json(store: &dyn EntityStore, kind: EntityKind, body: &Value) -> Result<Collection, ApiError> {
    create(store, kind, CreateRequest::from_json(body)).await
}

pub async fn update(store: &dyn EntityStore, kind: EntityKind, request: UpdateRequest) -> Result<Collection, ApiError> {
    let text = kind.normalize_text(&request.content);
    if text.is_empty() {
        return Err(ApiError::validation("Id and content are required"));
    }
    let annotation = if kind.has_annotation() {
        request.annotation.as_deref().unwrap_or_default().trim().to_string()
    } else {
        String::new()
    };

    store.update(kind, request.id, &text, &annotation).await?;
    list(store, kind).await
}

pub async fn update_from_json(store: &dyn EntityStore, kind: EntityKind, body: &Value) -> Result<Collection, ApiError> {
    let request = UpdateRequest::from_json(body).ok_or_else(|| ApiError::validation("Id and content are required"))?;
    update(store, kind, request).await
}

pub async fn delete(store: &dyn EntityStore, kind: EntityKind, request: DeleteRequest) -> Result<Collection, ApiError> {
    let removed = match &request {
        DeleteRequest::All => store.delete_all(kind).await?,
        DeleteRequest::Ids(ids) => store.delete_ids(kind, ids).await?,
    };
    tracing::debug!("{} 删除 {} 条", kind, removed);

    list(store, kind).await
}

pub async fn delete_from_json(store: &dyn EntityStore, kind: EntityKind, body: &Value) -> Result<Collection, ApiError> {
    let request = DeleteRequest::from_json(body).map_err(ApiError::validation)?;
    delete(store, kind, request).await
}
