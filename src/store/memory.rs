use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{EntityStore, StoreError};
use crate::models::{EntityKind, Entry, NewEntry};

#[derive(Default)]
struct Tables {
    next_id: i32,
    rows: HashMap<EntityKind, Vec<Entry>>,
}

/// 进程内存储，语义与 `PgStore` 一致；测试和 `STORE_BACKEND=memory` 使用
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Entry>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows = tables.rows.get(&kind).cloned().unwrap_or_default();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert_skip_duplicates(&self, kind: EntityKind, entries: &[NewEntry]) -> Result<u64, StoreError> {
        // 写锁覆盖 "判重 + 插入"，整批原子
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut inserted = 0;
        for entry in entries {
            let exists = tables
                .rows
                .get(&kind)
                .is_some_and(|rows| rows.iter().any(|r| r.text == entry.text));
            if exists {
                continue;
            }
            tables.next_id += 1;
            let id = tables.next_id;
            tables.rows.entry(kind).or_default().push(Entry {
                id,
                text: entry.text.clone(),
                annotation: entry.annotation.clone(),
                created_at: now,
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn update(&self, kind: EntityKind, id: i32, text: &str, annotation: &str) -> Result<Entry, StoreError> {
        let mut tables = self.tables.write().await;
        let rows = tables.rows.entry(kind).or_default();

        // 单词有唯一约束
        if kind == EntityKind::Word && rows.iter().any(|r| r.id != id && r.text == text) {
            return Err(StoreError::Duplicate(text.to_string()));
        }

        let row = rows.iter_mut().find(|r| r.id == id).ok_or(StoreError::NotFound(id))?;
        row.text = text.to_string();
        row.annotation = annotation.to_string();
        Ok(row.clone())
    }

    async fn delete_ids(&self, kind: EntityKind, ids: &[i32]) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let rows = tables.rows.entry(kind).or_default();
        let before = rows.len();
        rows.retain(|r| !ids.contains(&r.id));
        Ok((before - rows.len()) as u64)
    }

    async fn delete_all(&self, kind: EntityKind) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let removed = tables.rows.remove(&kind).map(|rows| rows.len()).unwrap_or(0);
        Ok(removed as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_entry(text: &str) -> NewEntry {
        NewEntry { text: text.into(), annotation: String::new() }
    }

    #[tokio::test]
    async fn insert_skips_existing_text() {
        let store = MemoryStore::new();
        let kind = EntityKind::Phrase;
        assert_eq!(store.insert_skip_duplicates(kind, &[new_entry("a"), new_entry("b")]).await.unwrap(), 2);
        assert_eq!(store.insert_skip_duplicates(kind, &[new_entry("b"), new_entry("c")]).await.unwrap(), 1);

        let texts: Vec<String> = store.list(kind).await.unwrap().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn kinds_are_isolated() {
        let store = MemoryStore::new();
        store.insert_skip_duplicates(EntityKind::Word, &[new_entry("a")]).await.unwrap();
        assert!(store.list(EntityKind::Sentence).await.unwrap().is_empty());
        assert_eq!(store.delete_all(EntityKind::Sentence).await.unwrap(), 0);
        assert_eq!(store.list(EntityKind::Word).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_reports_missing_and_duplicate() {
        let store = MemoryStore::new();
        store
            .insert_skip_duplicates(EntityKind::Word, &[new_entry("apple"), new_entry("pear")])
            .await
            .unwrap();
        assert!(matches!(
            store.update(EntityKind::Word, 99, "kiwi", "").await,
            Err(StoreError::NotFound(99))
        ));

        let pear = store.list(EntityKind::Word).await.unwrap()[0].clone();
        assert!(matches!(
            store.update(EntityKind::Word, pear.id, "apple", "").await,
            Err(StoreError::Duplicate(_))
        ));
    }
}
