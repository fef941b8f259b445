//! Collection API 的调用方：页面控制器、命令行、浏览器插件都走这一层

use async_trait::async_trait;

use crate::models::{CreateRequest, DeleteRequest, Entry, UpdateRequest};

pub mod http;
pub mod local;
pub mod settings;

pub use http::HttpCollection;
pub use local::LocalCollection;
pub use settings::{normalize_selection, ClientSettings};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// 网络或响应解析失败
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// 服务端返回非 2xx
    #[error("{message}")]
    Api { status: u16, message: String },
}

/// 每个调用都返回服务端的完整最新列表
#[async_trait]
pub trait CollectionApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Entry>, ClientError>;
    async fn create(&self, request: &CreateRequest) -> Result<Vec<Entry>, ClientError>;
    async fn update(&self, request: &UpdateRequest) -> Result<Vec<Entry>, ClientError>;
    async fn delete(&self, request: &DeleteRequest) -> Result<Vec<Entry>, ClientError>;
}
