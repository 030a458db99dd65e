//! SQLite SharedListRepository implementation.

use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::db::utils::{current_timestamp, generate_entity_id, or_generate};
use crate::db::{
    DEFAULT_LIST_COLOR, DbError, DbResult, SharedList, SharedListItem, SharedListRepository,
};

const LIST_COLUMNS: &str = "id, family_id, name, description, color, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, list_id, text, checked, checked_at, checked_by, created_at";

/// SQLx-backed shared checklist repository.
pub struct SqliteSharedListRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

/// Bump `updated_at` of the list owning `item_id`.
async fn touch_list_of_item(conn: &mut SqliteConnection, item_id: &str, now: &str) -> DbResult<()> {
    sqlx::query(
        "UPDATE shared_list SET updated_at = ?
         WHERE id = (SELECT list_id FROM shared_list_item WHERE id = ?)",
    )
    .bind(now)
    .bind(item_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

impl<'a> SharedListRepository for SqliteSharedListRepository<'a> {
    async fn create(&self, list: &SharedList) -> DbResult<SharedList> {
        let id = or_generate(&list.id, generate_entity_id);
        let created_at = or_generate(&list.created_at, current_timestamp);
        let updated_at = or_generate(&list.updated_at, || created_at.clone());
        let color = or_generate(&list.color, || DEFAULT_LIST_COLOR.to_string());

        sqlx::query(
            r#"
            INSERT INTO shared_list (id, family_id, name, description, color, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&list.family_id)
        .bind(&list.name)
        .bind(&list.description)
        .bind(&color)
        .bind(&created_at)
        .bind(&updated_at)
        .execute(self.pool)
        .await?;

        Ok(SharedList {
            id,
            color,
            created_at,
            updated_at,
            ..list.clone()
        })
    }

    async fn get(&self, id: &str) -> DbResult<SharedList> {
        let sql = format!("SELECT {} FROM shared_list WHERE id = ?", LIST_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("SharedList", id))?;

        Ok(row_to_list(&row))
    }

    async fn list_by_family(&self, family_id: &str) -> DbResult<Vec<SharedList>> {
        let sql = format!(
            "SELECT {} FROM shared_list WHERE family_id = ? ORDER BY updated_at DESC, rowid DESC",
            LIST_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(family_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.iter().map(row_to_list).collect())
    }

    async fn update(&self, list: &SharedList) -> DbResult<()> {
        let color = or_generate(&list.color, || DEFAULT_LIST_COLOR.to_string());
        let result = sqlx::query(
            "UPDATE shared_list SET name = ?, description = ?, color = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&list.name)
        .bind(&list.description)
        .bind(&color)
        .bind(current_timestamp())
        .bind(&list.id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SharedList", &list.id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM shared_list WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SharedList", id));
        }

        Ok(())
    }

    async fn add_items(&self, list_id: &str, texts: &[String]) -> DbResult<Vec<SharedListItem>> {
        let texts: Vec<&str> = texts
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();

        let now = current_timestamp();
        let mut tx = self.pool.begin().await?;

        let touched = sqlx::query("UPDATE shared_list SET updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(list_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(DbError::not_found("SharedList", list_id));
        }

        let mut items = Vec::with_capacity(texts.len());
        for text in texts {
            let item = SharedListItem {
                id: generate_entity_id(),
                list_id: list_id.to_string(),
                text: text.to_string(),
                checked: false,
                checked_at: None,
                checked_by: None,
                created_at: now.clone(),
            };

            sqlx::query(
                "INSERT INTO shared_list_item (id, list_id, text, checked, created_at) VALUES (?, ?, ?, 0, ?)",
            )
            .bind(&item.id)
            .bind(&item.list_id)
            .bind(&item.text)
            .bind(&item.created_at)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        tx.commit().await?;
        Ok(items)
    }

    async fn get_item(&self, id: &str) -> DbResult<SharedListItem> {
        let sql = format!("SELECT {} FROM shared_list_item WHERE id = ?", ITEM_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("SharedListItem", id))?;

        Ok(row_to_item(&row))
    }

    async fn list_items(&self, list_id: &str) -> DbResult<Vec<SharedListItem>> {
        let sql = format!(
            "SELECT {} FROM shared_list_item WHERE list_id = ?
             ORDER BY checked ASC, created_at ASC, rowid ASC",
            ITEM_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(list_id).fetch_all(self.pool).await?;

        Ok(rows.iter().map(row_to_item).collect())
    }

    async fn update_item_text(&self, id: &str, text: &str) -> DbResult<SharedListItem> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DbError::Validation {
                message: "item text cannot be empty".to_string(),
            });
        }

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE shared_list_item SET text = ? WHERE id = ?")
            .bind(text)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SharedListItem", id));
        }
        touch_list_of_item(&mut *tx, id, &current_timestamp()).await?;
        tx.commit().await?;

        self.get_item(id).await
    }

    async fn set_item_checked(
        &self,
        id: &str,
        checked: bool,
        checked_by: Option<&str>,
    ) -> DbResult<SharedListItem> {
        let now = current_timestamp();
        let (checked_at, checked_by) = if checked {
            (Some(now.as_str()), checked_by)
        } else {
            (None, None)
        };

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE shared_list_item SET checked = ?, checked_at = ?, checked_by = ? WHERE id = ?",
        )
        .bind(checked)
        .bind(checked_at)
        .bind(checked_by)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SharedListItem", id));
        }
        touch_list_of_item(&mut *tx, id, &now).await?;
        tx.commit().await?;

        self.get_item(id).await
    }

    async fn delete_item(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        // Touch first: the subquery needs the item to still exist.
        touch_list_of_item(&mut *tx, id, &current_timestamp()).await?;
        let result = sqlx::query("DELETE FROM shared_list_item WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SharedListItem", id));
        }
        tx.commit().await?;

        Ok(())
    }
}

fn row_to_list(row: &sqlx::sqlite::SqliteRow) -> SharedList {
    SharedList {
        id: row.get("id"),
        family_id: row.get("family_id"),
        name: row.get("name"),
        description: row.get("description"),
        color: row.get("color"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> SharedListItem {
    SharedListItem {
        id: row.get("id"),
        list_id: row.get("list_id"),
        text: row.get("text"),
        checked: row.get("checked"),
        checked_at: row.get("checked_at"),
        checked_by: row.get("checked_by"),
        created_at: row.get("created_at"),
    }
}
