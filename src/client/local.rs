use async_trait::async_trait;
use std::sync::Arc;

use super::{ClientError, CollectionApi};
use crate::error::ApiError;
use crate::models::{CreateRequest, DeleteRequest, EntityKind, Entry, UpdateRequest};
use crate::services::collection_service;
use crate::store::EntityStore;

/// 进程内直接调用 collection_service，不经过 HTTP
#[derive(Clone)]
pub struct LocalCollection {
    store: Arc<dyn EntityStore>,
    kind: EntityKind,
}

impl LocalCollection {
    pub fn new(store: Arc<dyn EntityStore>, kind: EntityKind) -> Self {
        Self { store, kind }
    }
}

impl From<ApiError> for ClientError {
    fn from(e: ApiError) -> Self {
        ClientError::Api { status: e.status().as_u16(), message: e.to_string() }
    }
}

#[async_trait]
impl CollectionApi for LocalCollection {
    async fn list(&self) -> Result<Vec<Entry>, ClientError> {
        Ok(collection_service::list(self.store.as_ref(), self.kind).await?.entries)
    }

    async fn create(&self, request: &CreateRequest) -> Result<Vec<Entry>, ClientError> {
        let collection = collection_service::create(self.store.as_ref(), self.kind, request.clone()).await?;
        Ok(collection.entries)
    }

    async fn update(&self, request: &UpdateRequest) -> Result<Vec<Entry>, ClientError> {
        let collection = collection_service::update(self.store.as_ref(), self.kind, request.clone()).await?;
        Ok(collection.entries)
    }

    async fn delete(&self, request: &DeleteRequest) -> Result<Vec<Entry>, ClientError> {
        let collection = collection_service::delete(self.store.as_ref(), self.kind, request.clone()).await?;
        Ok(collection.entries)
    }
}
