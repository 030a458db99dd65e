//! SQLite ApiKeyRepository implementation.

use sqlx::{Row, SqlitePool};

use crate::db::utils::{current_timestamp, generate_entity_id, or_generate};
use crate::db::{ApiKey, ApiKeyRepository, DbError, DbResult};

const KEY_COLUMNS: &str = "id, family_id, key_prefix, key_hash, name, description, is_active, \
     last_used_at, expires_at, created_at";

/// SQLx-backed API key repository.
pub struct SqliteApiKeyRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> ApiKeyRepository for SqliteApiKeyRepository<'a> {
    async fn create(&self, key: &ApiKey) -> DbResult<ApiKey> {
        let id = or_generate(&key.id, generate_entity_id);
        let created_at = or_generate(&key.created_at, current_timestamp);

        sqlx::query(
            r#"
            INSERT INTO api_key (id, family_id, key_prefix, key_hash, name, description, is_active,
                                 last_used_at, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&key.family_id)
        .bind(&key.key_prefix)
        .bind(&key.key_hash)
        .bind(&key.name)
        .bind(&key.description)
        .bind(key.is_active)
        .bind(&key.last_used_at)
        .bind(&key.expires_at)
        .bind(&created_at)
        .execute(self.pool)
        .await?;

        Ok(ApiKey {
            id,
            created_at,
            ..key.clone()
        })
    }

    async fn get(&self, id: &str) -> DbResult<ApiKey> {
        let sql = format!("SELECT {} FROM api_key WHERE id = ?", KEY_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("ApiKey", id))?;

        Ok(row_to_api_key(&row))
    }

    async fn find_by_hash(&self, hash: &str) -> DbResult<Option<ApiKey>> {
        let sql = format!("SELECT {} FROM api_key WHERE key_hash = ?", KEY_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(hash)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_api_key))
    }

    async fn list_by_family(&self, family_id: &str) -> DbResult<Vec<ApiKey>> {
        let sql = format!(
            "SELECT {} FROM api_key WHERE family_id = ? ORDER BY created_at DESC, rowid DESC",
            KEY_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(family_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.iter().map(row_to_api_key).collect())
    }

    async fn revoke(&self, id: &str) -> DbResult<ApiKey> {
        let result = sqlx::query("UPDATE api_key SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ApiKey", id));
        }

        self.get(id).await
    }

    async fn touch(&self, id: &str, used_at: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE api_key SET last_used_at = ? WHERE id = ?")
            .bind(used_at)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ApiKey", id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM api_key WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ApiKey", id));
        }

        Ok(())
    }
}

fn row_to_api_key(row: &sqlx::sqlite::SqliteRow) -> ApiKey {
    ApiKey {
        id: row.get("id"),
        family_id: row.get("family_id"),
        key_prefix: row.get("key_prefix"),
        key_hash: row.get("key_hash"),
        name: row.get("name"),
        description: row.get("description"),
        is_active: row.get("is_active"),
        last_used_at: row.get("last_used_at"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }
}
