//! SQLite SubscriptionRepository implementation.

use sqlx::{Row, SqlitePool};

use crate::db::utils::{current_timestamp, generate_entity_id, or_generate};
use crate::db::{
    CalendarSubscription, DEFAULT_SUBSCRIPTION_COLOR, DbError, DbResult, SubscriptionRepository,
};

const SUBSCRIPTION_COLUMNS: &str =
    "id, owner_id, url, display_name, color, last_synced_at, created_at";

/// SQLx-backed calendar subscription repository.
pub struct SqliteSubscriptionRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> SqliteSubscriptionRepository<'a> {
    async fn fetch_where(&self, filter: &str, value: Option<&str>) -> DbResult<Vec<CalendarSubscription>> {
        let sql = format!(
            "SELECT {} FROM calendar_subscription {} ORDER BY display_name ASC, id ASC",
            SUBSCRIPTION_COLUMNS, filter
        );
        let mut query = sqlx::query(&sql);
        if let Some(value) = value {
            query = query.bind(value);
        }
        let rows = query.fetch_all(self.pool).await?;
        Ok(rows.iter().map(row_to_subscription).collect())
    }
}

impl<'a> SubscriptionRepository for SqliteSubscriptionRepository<'a> {
    async fn create(&self, subscription: &CalendarSubscription) -> DbResult<CalendarSubscription> {
        let id = or_generate(&subscription.id, generate_entity_id);
        let created_at = or_generate(&subscription.created_at, current_timestamp);
        let color = or_generate(&subscription.color, || DEFAULT_SUBSCRIPTION_COLOR.to_string());

        sqlx::query(
            r#"
            INSERT INTO calendar_subscription (id, owner_id, url, display_name, color, last_synced_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&subscription.owner_id)
        .bind(&subscription.url)
        .bind(&subscription.display_name)
        .bind(&color)
        .bind(&subscription.last_synced_at)
        .bind(&created_at)
        .execute(self.pool)
        .await?;

        Ok(CalendarSubscription {
            id,
            color,
            created_at,
            ..subscription.clone()
        })
    }

    async fn get(&self, id: &str) -> DbResult<CalendarSubscription> {
        let sql = format!(
            "SELECT {} FROM calendar_subscription WHERE id = ?",
            SUBSCRIPTION_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("CalendarSubscription", id))?;

        Ok(row_to_subscription(&row))
    }

    async fn list(&self) -> DbResult<Vec<CalendarSubscription>> {
        self.fetch_where("", None).await
    }

    async fn list_by_family(&self, family_id: &str) -> DbResult<Vec<CalendarSubscription>> {
        self.fetch_where(
            "WHERE owner_id IN (SELECT id FROM family_member WHERE family_id = ?)",
            Some(family_id),
        )
        .await
    }

    async fn list_by_owner(&self, owner_id: &str) -> DbResult<Vec<CalendarSubscription>> {
        self.fetch_where("WHERE owner_id = ?", Some(owner_id)).await
    }

    async fn mark_synced(&self, id: &str, synced_at: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE calendar_subscription SET last_synced_at = ? WHERE id = ?")
            .bind(synced_at)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CalendarSubscription", id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM calendar_subscription WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CalendarSubscription", id));
        }

        Ok(())
    }
}

fn row_to_subscription(row: &sqlx::sqlite::SqliteRow) -> CalendarSubscription {
    CalendarSubscription {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        url: row.get("url"),
        display_name: row.get("display_name"),
        color: row.get("color"),
        last_synced_at: row.get("last_synced_at"),
        created_at: row.get("created_at"),
    }
}
