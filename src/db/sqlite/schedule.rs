//! SQLite ScheduleRepository implementation.

use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use super::helpers::{build_limit_offset_clause, build_order_clause, build_where_clause};
use crate::db::utils::{current_timestamp, generate_entity_id, or_generate};
use crate::db::{
    DbError, DbResult, ListResult, ScheduleEntry, ScheduleQuery, ScheduleRepository, UpsertOutcome,
};
use crate::schedule::WallTime;

const SCHEDULE_COLUMNS: &str = "id, owner_id, title, description, location, date, start_time, \
     end_time, external_source_id, external_uid, last_synced_at, created_at";

/// SQLx-backed schedule repository.
pub struct SqliteScheduleRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> ScheduleRepository for SqliteScheduleRepository<'a> {
    async fn create(&self, entry: &ScheduleEntry) -> DbResult<ScheduleEntry> {
        let id = or_generate(&entry.id, generate_entity_id);
        let created_at = or_generate(&entry.created_at, current_timestamp);

        sqlx::query(
            r#"
            INSERT INTO schedule (id, owner_id, title, description, location, date, start_time,
                                  end_time, external_source_id, external_uid, last_synced_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&entry.owner_id)
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(&entry.location)
        .bind(entry.date)
        .bind(entry.start_time.to_string())
        .bind(entry.end_time.to_string())
        .bind(&entry.external_source_id)
        .bind(&entry.external_uid)
        .bind(&entry.last_synced_at)
        .bind(&created_at)
        .execute(self.pool)
        .await?;

        Ok(ScheduleEntry {
            id,
            created_at,
            ..entry.clone()
        })
    }

    async fn get(&self, id: &str) -> DbResult<ScheduleEntry> {
        let sql = format!("SELECT {} FROM schedule WHERE id = ?", SCHEDULE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("ScheduleEntry", id))?;

        row_to_schedule(&row)
    }

    async fn list(&self, query: Option<&ScheduleQuery>) -> DbResult<ListResult<ScheduleEntry>> {
        let default_query = ScheduleQuery::default();
        let query = query.unwrap_or(&default_query);
        let allowed_fields = ["date", "title", "created_at"];

        let order_clause = build_order_clause(
            &query.page,
            &allowed_fields,
            "date",
            ", start_time ASC, end_time ASC, id ASC",
        );
        let limit_clause = build_limit_offset_clause(&query.page);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_values: Vec<String> = Vec::new();

        if let Some(family_id) = &query.family_id {
            conditions
                .push("owner_id IN (SELECT id FROM family_member WHERE family_id = ?)".to_string());
            bind_values.push(family_id.clone());
        }

        if let Some(owner_id) = &query.owner_id {
            conditions.push("owner_id = ?".to_string());
            bind_values.push(owner_id.clone());
        }

        // ISO dates compare correctly as text.
        if let Some(from) = query.from {
            conditions.push("date >= ?".to_string());
            bind_values.push(from.to_string());
        }

        if let Some(to) = query.to {
            conditions.push("date <= ?".to_string());
            bind_values.push(to.to_string());
        }

        if let Some(source_id) = &query.external_source_id {
            conditions.push("external_source_id = ?".to_string());
            bind_values.push(source_id.clone());
        }

        let where_clause = build_where_clause(&conditions);

        let sql = format!(
            "SELECT {} FROM schedule {} {} {}",
            SCHEDULE_COLUMNS, where_clause, order_clause, limit_clause
        );
        let count_sql = format!("SELECT COUNT(*) FROM schedule {}", where_clause);

        let mut query_builder = sqlx::query(&sql);
        for value in &bind_values {
            query_builder = query_builder.bind(value);
        }
        let rows = query_builder.fetch_all(self.pool).await?;
        let items = rows
            .iter()
            .map(row_to_schedule)
            .collect::<DbResult<Vec<_>>>()?;

        let mut count_query = sqlx::query_scalar(&count_sql);
        for value in &bind_values {
            count_query = count_query.bind(value);
        }
        let total: i64 = count_query.fetch_one(self.pool).await?;

        Ok(ListResult {
            items,
            total: total as usize,
            limit: query.page.limit,
            offset: query.page.offset.unwrap_or(0),
        })
    }

    async fn update(&self, entry: &ScheduleEntry) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE schedule
            SET owner_id = ?, title = ?, description = ?, location = ?, date = ?,
                start_time = ?, end_time = ?
            WHERE id = ?
            "#,
        )
        .bind(&entry.owner_id)
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(&entry.location)
        .bind(entry.date)
        .bind(entry.start_time.to_string())
        .bind(entry.end_time.to_string())
        .bind(&entry.id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ScheduleEntry", &entry.id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM schedule WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ScheduleEntry", id));
        }

        Ok(())
    }

    async fn upsert_external(&self, entry: &ScheduleEntry) -> DbResult<UpsertOutcome> {
        let (Some(source_id), Some(uid)) = (&entry.external_source_id, &entry.external_uid) else {
            return Err(DbError::Validation {
                message: "external upsert requires external_source_id and external_uid"
                    .to_string(),
            });
        };

        let id = or_generate(&entry.id, generate_entity_id);
        let created_at = or_generate(&entry.created_at, current_timestamp);

        // The conflict branch only fires when a synced field differs, so an
        // unchanged event keeps its row (and last_synced_at) untouched and
        // RETURNING yields nothing.
        let returned: Option<String> = sqlx::query_scalar(
            r#"
            INSERT INTO schedule (id, owner_id, title, description, location, date, start_time,
                                  end_time, external_source_id, external_uid, last_synced_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(external_source_id, external_uid) DO UPDATE SET
                owner_id = excluded.owner_id,
                title = excluded.title,
                description = excluded.description,
                location = excluded.location,
                date = excluded.date,
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                last_synced_at = excluded.last_synced_at
            WHERE schedule.owner_id IS NOT excluded.owner_id
               OR schedule.title IS NOT excluded.title
               OR schedule.description IS NOT excluded.description
               OR schedule.location IS NOT excluded.location
               OR schedule.date IS NOT excluded.date
               OR schedule.start_time IS NOT excluded.start_time
               OR schedule.end_time IS NOT excluded.end_time
            RETURNING id
            "#,
        )
        .bind(&id)
        .bind(&entry.owner_id)
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(&entry.location)
        .bind(entry.date)
        .bind(entry.start_time.to_string())
        .bind(entry.end_time.to_string())
        .bind(source_id)
        .bind(uid)
        .bind(&entry.last_synced_at)
        .bind(&created_at)
        .fetch_optional(self.pool)
        .await?;

        Ok(match returned {
            None => UpsertOutcome::Unchanged,
            Some(returned_id) if returned_id == id => UpsertOutcome::Inserted,
            Some(_) => UpsertOutcome::Updated,
        })
    }

    async fn delete_external_except(&self, source_id: &str, keep_uids: &[String]) -> DbResult<u64> {
        let keep_json = serde_json::to_string(keep_uids).map_err(|e| DbError::InvalidData {
            message: e.to_string(),
            help: "external UIDs must serialize as a JSON array".to_string(),
        })?;

        let result = sqlx::query(
            r#"
            DELETE FROM schedule
            WHERE external_source_id = ?
              AND external_uid NOT IN (SELECT value FROM json_each(?))
            "#,
        )
        .bind(source_id)
        .bind(keep_json)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

fn parse_time(row: &sqlx::sqlite::SqliteRow, column: &str) -> DbResult<WallTime> {
    let raw: String = row.get(column);
    raw.parse().map_err(|e: crate::schedule::ScheduleError| DbError::InvalidData {
        message: e.to_string(),
        help: format!("schedule.{} must be stored as HH:MM", column),
    })
}

/// Convert a database row to a ScheduleEntry model.
fn row_to_schedule(row: &sqlx::sqlite::SqliteRow) -> DbResult<ScheduleEntry> {
    let date: NaiveDate = row.try_get("date")?;

    Ok(ScheduleEntry {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        title: row.get("title"),
        description: row.get("description"),
        location: row.get("location"),
        date,
        start_time: parse_time(row, "start_time")?,
        end_time: parse_time(row, "end_time")?,
        external_source_id: row.get("external_source_id"),
        external_uid: row.get("external_uid"),
        last_synced_at: row.get("last_synced_at"),
        created_at: row.get("created_at"),
    })
}
