use async_trait::async_trait;

use crate::models::{EntityKind, Entry, NewEntry};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(i32),
    #[error("`{0}` already exists")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// 持久化层。列表始终按创建时间倒序返回
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Entry>, StoreError>;

    /// 批量插入，已存在的主文本直接跳过 (不更新)。返回实际插入条数
    async fn insert_skip_duplicates(&self, kind: EntityKind, entries: &[NewEntry]) -> Result<u64, StoreError>;

    /// 整条覆盖文本和注释
    async fn update(&self, kind: EntityKind, id: i32, text: &str, annotation: &str) -> Result<Entry, StoreError>;

    async fn delete_ids(&self, kind: EntityKind, ids: &[i32]) -> Result<u64, StoreError>;

    async fn delete_all(&self, kind: EntityKind) -> Result<u64, StoreError>;
}
