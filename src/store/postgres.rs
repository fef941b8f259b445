use async_trait::async_trait;
use sqlx::postgres::PgPool;

use super::{EntityStore, StoreError};
use crate::models::{EntityKind, Entry, NewEntry};

/// PostgreSQL 实现。表名来自 `EntityKind::resource()`，都是静态字符串
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 启动时执行 migrations/ 下的建表脚本
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn select_columns(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Word => "id, name AS text, ''::TEXT AS annotation, created_at",
        _ => "id, content AS text, annotation, created_at",
    }
}

fn map_write_error(e: sqlx::Error, text: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(text.to_string()),
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Entry>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY created_at DESC, id DESC",
            select_columns(kind),
            kind.resource()
        );
        let rows = sqlx::query_as::<_, Entry>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn insert_skip_duplicates(&self, kind: EntityKind, entries: &[NewEntry]) -> Result<u64, StoreError> {
        if entries.is_empty() {
            return Ok(0);
        }
        let texts: Vec<String> = entries.iter().map(|e| e.text.clone()).collect();

        let result = match kind {
            // 单词依赖唯一约束，并发插入同名也不会重复
            EntityKind::Word => {
                sqlx::query(
                    r#"
                    INSERT INTO words (name)
                    SELECT name FROM UNNEST($1::TEXT[]) AS t(name)
                    ON CONFLICT (name) DO NOTHING
                    "#,
                )
                .bind(texts)
                .execute(&self.pool)
                .await?
            }
            // 短语/句子没有唯一约束，只能在同一条语句里先查后插
            _ => {
                let annotations: Vec<String> = entries.iter().map(|e| e.annotation.clone()).collect();
                let sql = format!(
                    r#"
                    INSERT INTO {table} (content, annotation)
                    SELECT t.content, t.annotation
                    FROM UNNEST($1::TEXT[], $2::TEXT[]) WITH ORDINALITY AS t(content, annotation, ord)
                    WHERE NOT EXISTS (SELECT 1 FROM {table} e WHERE e.content = t.content)
                    ORDER BY t.ord
                    "#,
                    table = kind.resource()
                );
                sqlx::query(&sql)
                    .bind(texts)
                    .bind(annotations)
                    .execute(&self.pool)
                    .await?
            }
        };
        Ok(result.rows_affected())
    }

    async fn update(&self, kind: EntityKind, id: i32, text: &str, annotation: &str) -> Result<Entry, StoreError> {
        let row = match kind {
            EntityKind::Word => {
                let sql = format!("UPDATE words SET name = $1 WHERE id = $2 RETURNING {}", select_columns(kind));
                sqlx::query_as::<_, Entry>(&sql)
                    .bind(text)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
            }
            _ => {
                let sql = format!(
                    "UPDATE {} SET content = $1, annotation = $2 WHERE id = $3 RETURNING {}",
                    kind.resource(),
                    select_columns(kind)
                );
                sqlx::query_as::<_, Entry>(&sql)
                    .bind(text)
                    .bind(annotation)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
            }
        }
        .map_err(|e| map_write_error(e, text))?;

        row.ok_or(StoreError::NotFound(id))
    }

    async fn delete_ids(&self, kind: EntityKind, ids: &[i32]) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = ANY($1::INT[])", kind.resource());
        let result = sqlx::query(&sql).bind(ids).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_all(&self, kind: EntityKind) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {}", kind.resource());
        let result = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
