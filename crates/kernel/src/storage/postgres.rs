//! PostgreSQL document store.
//!
//! Documents live in a single JSONB table keyed by `(collection, id)`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use super::{Collection, ContentStore};

/// Store backed by the `content_document` table.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a pool, creating the document table if needed.
    pub async fn new(pool: PgPool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS content_document (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                document JSONB NOT NULL,
                changed BIGINT NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create content_document table")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS content_document_content_id
            ON content_document ((document->>'content_id'))
            WHERE collection = 'content_versions'
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create content_id index")?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl ContentStore for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        let document = sqlx::query_scalar::<_, Value>(
            "SELECT document FROM content_document WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch document")?;

        Ok(document)
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        let documents = sqlx::query_scalar::<_, Value>(
            "SELECT document FROM content_document WHERE collection = $1 ORDER BY id",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await
        .context("failed to list documents")?;

        Ok(documents)
    }

    async fn list_by(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Value>> {
        let documents = sqlx::query_scalar::<_, Value>(
            "SELECT document FROM content_document \
             WHERE collection = $1 AND document->>$2 = $3 ORDER BY id",
        )
        .bind(collection.as_str())
        .bind(field)
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .context("failed to list documents by field")?;

        Ok(documents)
    }

    async fn upsert(&self, collection: Collection, id: &str, document: Value) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO content_document (collection, id, document, changed)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (collection, id)
            DO UPDATE SET document = EXCLUDED.document, changed = EXCLUDED.changed
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(&document)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("failed to upsert document")?;

        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM content_document WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to delete document")?;

        Ok(result.rows_affected() > 0)
    }
}
