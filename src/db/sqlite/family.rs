//! SQLite FamilyRepository implementation.

use sqlx::{Row, SqlitePool};

use crate::db::utils::{current_timestamp, generate_entity_id, or_generate};
use crate::db::{DbError, DbResult, Family, FamilyRepository};

/// SQLx-backed family repository.
pub struct SqliteFamilyRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> FamilyRepository for SqliteFamilyRepository<'a> {
    async fn create(&self, family: &Family) -> DbResult<Family> {
        let id = or_generate(&family.id, generate_entity_id);
        let created_at = or_generate(&family.created_at, current_timestamp);

        sqlx::query("INSERT INTO family (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(&family.name)
            .bind(&created_at)
            .execute(self.pool)
            .await?;

        Ok(Family {
            id,
            name: family.name.clone(),
            created_at,
        })
    }

    async fn get(&self, id: &str) -> DbResult<Family> {
        let row = sqlx::query("SELECT id, name, created_at FROM family WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Family", id))?;

        Ok(row_to_family(&row))
    }

    async fn list(&self) -> DbResult<Vec<Family>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM family ORDER BY name ASC")
            .fetch_all(self.pool)
            .await?;

        Ok(rows.iter().map(row_to_family).collect())
    }

    async fn update(&self, family: &Family) -> DbResult<()> {
        let result = sqlx::query("UPDATE family SET name = ? WHERE id = ?")
            .bind(&family.name)
            .bind(&family.id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Family", &family.id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM family WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Family", id));
        }

        Ok(())
    }
}

fn row_to_family(row: &sqlx::sqlite::SqliteRow) -> Family {
    Family {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}
