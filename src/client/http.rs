use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use serde_json::Value;

use super::{ClientError, CollectionApi};
use crate::models::{CollectionPayload, CreateRequest, DeleteRequest, EntityKind, Entry, UpdateRequest};

#[derive(Deserialize)]
struct ErrorPayload {
    error: Option<String>,
}

/// 通过 HTTP 调用 `/api/{resource}`
#[derive(Clone)]
pub struct HttpCollection {
    http: Client,
    base_url: String,
    kind: EntityKind,
}

impl HttpCollection {
    pub fn new(base_url: &str, kind: EntityKind) -> Self {
        Self::with_client(Client::new(), base_url, kind)
    }

    pub fn with_client(http: Client, base_url: &str, kind: EntityKind) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            kind,
        }
    }

    pub fn url(&self) -> String {
        format!("{}/api/{}", self.base_url, self.kind.resource())
    }

    /// 随机抽取 `count` 条
    pub async fn random(&self, count: usize) -> Result<Vec<Entry>, ClientError> {
        let response = self
            .http
            .get(format!("{}/random", self.url()))
            .query(&[("count", count)])
            .send()
            .await?;
        read_collection(self.kind, response).await
    }

    async fn send(&self, method: Method, body: Value) -> Result<Vec<Entry>, ClientError> {
        let response = self.http.request(method, self.url()).json(&body).send().await?;
        read_collection(self.kind, response).await
    }
}

async fn read_collection(kind: EntityKind, response: Response) -> Result<Vec<Entry>, ClientError> {
    let status = response.status();
    if !status.is_success() {
        // 服务端的 {error} 优先，否则给出通用提示
        let message = response
            .json::<ErrorPayload>()
            .await
            .ok()
            .and_then(|p| p.error)
            .unwrap_or_else(|| format!("Failed to update {} ({})", kind, status.as_u16()));
        return Err(ClientError::Api { status: status.as_u16(), message });
    }
    let payload: CollectionPayload = response.json().await?;
    Ok(payload.items)
}

#[async_trait]
impl CollectionApi for HttpCollection {
    async fn list(&self) -> Result<Vec<Entry>, ClientError> {
        let response = self.http.get(self.url()).send().await?;
        read_collection(self.kind, response).await
    }

    async fn create(&self, request: &CreateRequest) -> Result<Vec<Entry>, ClientError> {
        self.send(Method::POST, request.to_json(self.kind)).await
    }

    async fn update(&self, request: &UpdateRequest) -> Result<Vec<Entry>, ClientError> {
        let body = serde_json::to_value(request).unwrap_or_default();
        self.send(Method::PATCH, body).await
    }

    async fn delete(&self, request: &DeleteRequest) -> Result<Vec<Entry>, ClientError> {
        self.send(Method::DELETE, request.to_json()).await
    }
}
