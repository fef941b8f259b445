use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::{get, MethodRouter},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{Collection, EntityKind};
use crate::services::{collection_service, sampler};
use crate::AppState;

type ApiResult = Result<Json<Collection>, ApiError>;

#[derive(Deserialize)]
pub struct RandomQuery {
    pub count: Option<usize>,
}

fn log_rejection(kind: EntityKind, action: &str, e: &ApiError) {
    match e {
        ApiError::Store(_) => {}
        _ => tracing::warn!("--- {} {}被拒绝: {}", kind, action, e),
    }
}

/// 请求体不看 Content-Type：空体当作 `{}`，解析失败按 400 {error} 返回
fn parse_body(bytes: &Bytes) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(bytes).map_err(|e| ApiError::validation(format!("Invalid JSON body: {e}")))
}

/// 1. 获取完整列表 (按创建时间倒序)
pub async fn list_entries(state: Arc<AppState>, kind: EntityKind) -> ApiResult {
    let collection = collection_service::list(state.store.as_ref(), kind).await?;
    tracing::debug!("<<< {} 列表获取完毕, 数量: {}", kind, collection.entries.len());
    Ok(Json(collection))
}

/// 2. 新增 (单条 / 文本数组 / 带注释数组)
pub async fn create_entries(state: Arc<AppState>, kind: EntityKind, body: Bytes) -> ApiResult {
    tracing::info!(">>> 收到 {} 新增请求", kind);
    let body = parse_body(&body).inspect_err(|e| log_rejection(kind, "新增", e))?;
    let collection = collection_service::create_from_json(state.store.as_ref(), kind, &body)
        .await
        .inspect_err(|e| log_rejection(kind, "新增", e))?;
    tracing::info!("<<< {} 新增完成, 当前共 {} 条", kind, collection.entries.len());
    Ok(Json(collection))
}

/// 3. 修改文本和注释
pub async fn update_entry(state: Arc<AppState>, kind: EntityKind, body: Bytes) -> ApiResult {
    let body = parse_body(&body).inspect_err(|e| log_rejection(kind, "修改", e))?;
    let id = body.get("id").cloned().unwrap_or_default();
    tracing::info!(">>> 收到 {} 修改请求: id={}", kind, id);
    let collection = collection_service::update_from_json(state.store.as_ref(), kind, &body)
        .await
        .inspect_err(|e| log_rejection(kind, "修改", e))?;
    Ok(Json(collection))
}

/// 4. 删除：按 id 列表或全部清空
pub async fn delete_entries(state: Arc<AppState>, kind: EntityKind, body: Bytes) -> ApiResult {
    let body = parse_body(&body).inspect_err(|e| log_rejection(kind, "删除", e))?;
    tracing::warn!(">>> 正在删除 {}: {}", kind, body);
    let collection = collection_service::delete_from_json(state.store.as_ref(), kind, &body)
        .await
        .inspect_err(|e| log_rejection(kind, "删除", e))?;
    tracing::info!("<<< {} 删除完成, 剩余 {} 条", kind, collection.entries.len());
    Ok(Json(collection))
}

/// 5. 随机抽取 (闪卡 / 启动器的 "随机单词")
pub async fn random_entries(state: Arc<AppState>, kind: EntityKind, query: RandomQuery) -> ApiResult {
    let collection = collection_service::list(state.store.as_ref(), kind).await?;
    let count = query.count.unwrap_or(sampler::DEFAULT_CARD_LIMIT);
    let entries = sampler::pick_random(&collection.entries, count);
    Ok(Json(Collection { kind, entries }))
}

/// `/api/{resource}` 上的 GET/POST/PATCH/DELETE
pub fn collection_methods(kind: EntityKind) -> MethodRouter<Arc<AppState>> {
    get(move |State(state): State<Arc<AppState>>| list_entries(state, kind))
        .post(move |State(state): State<Arc<AppState>>, body: Bytes| create_entries(state, kind, body))
        .patch(move |State(state): State<Arc<AppState>>, body: Bytes| update_entry(state, kind, body))
        .delete(move |State(state): State<Arc<AppState>>, body: Bytes| delete_entries(state, kind, body))
}

pub fn random_method(kind: EntityKind) -> MethodRouter<Arc<AppState>> {
    get(move |State(state): State<Arc<AppState>>, Query(query): Query<RandomQuery>| {
        random_entries(state, kind, query)
    })
}

#[cfg(test)]
mod tests {
    use crate::store::MemoryStore;
    use crate::{app, AppState};
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(Arc::new(AppState { store: Arc::new(MemoryStore::new()) }))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn words_use_words_envelope() {
        let app = test_app();
        let (status, body) = call(&app, Method::GET, "/api/words", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "words": [] }));

        let (status, body) = call(&app, Method::POST, "/api/words", Some(json!({ "name": "  Apple " }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["words"][0]["name"], "apple");
        assert!(body["words"][0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn empty_create_returns_400_with_error() {
        let app = test_app();
        let (status, body) = call(&app, Method::POST, "/api/phrases", Some(json!({ "contents": ["   "] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Content is required");
    }

    #[tokio::test]
    async fn patch_round_trip_and_missing_id() {
        let app = test_app();
        let (_, body) = call(
            &app,
            Method::POST,
            "/api/sentences",
            Some(json!({ "items": [{ "content": "See you.", "annotation": "bye" }] })),
        )
        .await;
        let id = body["items"][0]["id"].as_i64().unwrap();

        let (status, body) = call(
            &app,
            Method::PATCH,
            "/api/sentences",
            Some(json!({ "id": id, "content": "See you soon.", "annotation": "later" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["content"], "See you soon.");
        assert_eq!(body["items"][0]["annotation"], "later");

        let (status, body) =
            call(&app, Method::PATCH, "/api/sentences", Some(json!({ "id": 777, "content": "x" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        let (status, _) = call(&app, Method::PATCH, "/api/sentences", Some(json!({ "content": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_validates_selector() {
        let app = test_app();
        call(&app, Method::POST, "/api/words", Some(json!({ "names": ["a", "b"] }))).await;

        let (status, body) = call(&app, Method::DELETE, "/api/words", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing ids or all flag");

        let (status, body) = call(&app, Method::DELETE, "/api/words", Some(json!({ "all": true }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "words": [] }));
    }

    async fn call_raw(app: &Router, method: Method, uri: &str, content_type: Option<&str>, body: &'static str) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let response = app.clone().oneshot(builder.body(Body::from(body)).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn missing_or_malformed_bodies_return_error_envelope() {
        let app = test_app();

        let (status, body) = call(&app, Method::DELETE, "/api/words", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing ids or all flag");

        let (status, body) = call_raw(&app, Method::DELETE, "/api/words", Some("application/json"), "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing ids or all flag");

        let (status, body) = call_raw(&app, Method::PATCH, "/api/phrases", Some("application/json"), "{id: 1}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));

        let (status, body) = call(&app, Method::POST, "/api/sentences", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Content is required");
    }

    #[tokio::test]
    async fn json_body_is_read_without_content_type() {
        let app = test_app();
        let (status, body) = call_raw(&app, Method::POST, "/api/words", Some("text/plain"), r#"{"name":"Pear"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["words"][0]["name"], "pear");
    }

    #[tokio::test]
    async fn random_endpoint_clamps_count() {
        let app = test_app();
        call(&app, Method::POST, "/api/words", Some(json!({ "names": ["a", "b", "c"] }))).await;

        let (status, body) = call(&app, Method::GET, "/api/words/random?count=10", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["words"].as_array().unwrap().len(), 3);

        let (_, body) = call(&app, Method::GET, "/api/words/random?count=2", None).await;
        assert_eq!(body["words"].as_array().unwrap().len(), 2);

        let (_, body) = call(&app, Method::GET, "/api/phrases/random", None).await;
        assert_eq!(body, json!({ "items": [] }));
    }

    #[tokio::test]
    async fn health_check() {
        let app = test_app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
