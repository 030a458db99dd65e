//! SQLite TaskRepository implementation.

use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use super::helpers::{build_limit_offset_clause, build_order_clause, build_where_clause};
use crate::db::utils::{current_timestamp, generate_entity_id, or_generate};
use crate::db::{DbError, DbResult, ListResult, Task, TaskQuery, TaskRepository, TaskStatus};

const TASK_COLUMNS: &str =
    "id, family_id, assigned_to, title, description, status, due_date, created_at, completed_at";

/// SQLx-backed task repository.
pub struct SqliteTaskRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> TaskRepository for SqliteTaskRepository<'a> {
    async fn create(&self, task: &Task) -> DbResult<Task> {
        let id = or_generate(&task.id, generate_entity_id);
        let created_at = or_generate(&task.created_at, current_timestamp);

        sqlx::query(
            r#"
            INSERT INTO task (id, family_id, assigned_to, title, description, status, due_date, created_at, completed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&task.family_id)
        .bind(&task.assigned_to)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.to_string())
        .bind(task.due_date)
        .bind(&created_at)
        .bind(&task.completed_at)
        .execute(self.pool)
        .await?;

        Ok(Task {
            id,
            created_at,
            ..task.clone()
        })
    }

    async fn get(&self, id: &str) -> DbResult<Task> {
        let sql = format!("SELECT {} FROM task WHERE id = ?", TASK_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Task", id))?;

        row_to_task(&row)
    }

    async fn list(&self, query: Option<&TaskQuery>) -> DbResult<ListResult<Task>> {
        let default_query = TaskQuery::default();
        let query = query.unwrap_or(&default_query);
        let allowed_fields = ["title", "status", "due_date", "created_at", "completed_at"];

        // Undated tasks sort after dated ones, newest first among equals.
        let order_clause = build_order_clause(
            &query.page,
            &allowed_fields,
            "due_date IS NULL, due_date",
            ", created_at DESC, id ASC",
        );
        let limit_clause = build_limit_offset_clause(&query.page);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_values: Vec<String> = Vec::new();

        if let Some(family_id) = &query.family_id {
            conditions.push("family_id = ?".to_string());
            bind_values.push(family_id.clone());
        }

        if let Some(assigned_to) = &query.assigned_to {
            conditions.push("assigned_to = ?".to_string());
            bind_values.push(assigned_to.clone());
        }

        if let Some(status) = query.status {
            conditions.push("status = ?".to_string());
            bind_values.push(status.to_string());
        }

        let where_clause = build_where_clause(&conditions);

        let sql = format!(
            "SELECT {} FROM task {} {} {}",
            TASK_COLUMNS, where_clause, order_clause, limit_clause
        );
        let count_sql = format!("SELECT COUNT(*) FROM task {}", where_clause);

        let mut query_builder = sqlx::query(&sql);
        for value in &bind_values {
            query_builder = query_builder.bind(value);
        }
        let rows = query_builder.fetch_all(self.pool).await?;
        let items = rows.iter().map(row_to_task).collect::<DbResult<Vec<_>>>()?;

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

    async fn update(&self, task: &Task) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE task
            SET assigned_to = ?, title = ?, description = ?, status = ?, due_date = ?, completed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&task.assigned_to)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.to_string())
        .bind(task.due_date)
        .bind(&task.completed_at)
        .bind(&task.id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Task", &task.id));
        }

        Ok(())
    }

    async fn set_status(&self, id: &str, status: TaskStatus) -> DbResult<Task> {
        // Keep the original completion time when re-completing.
        let result = sqlx::query(
            r#"
            UPDATE task
            SET status = ?,
                completed_at = CASE
                    WHEN ? = 'completed' THEN COALESCE(completed_at, ?)
                    ELSE NULL
                END
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(status.to_string())
        .bind(current_timestamp())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Task", id));
        }

        self.get(id).await
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM task WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Task", id));
        }

        Ok(())
    }
}

/// Convert a database row to a Task model.
fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> DbResult<Task> {
    let status: String = row.get("status");
    let due_date: Option<NaiveDate> = row.try_get("due_date")?;

    Ok(Task {
        id: row.get("id"),
        family_id: row.get("family_id"),
        assigned_to: row.get("assigned_to"),
        title: row.get("title"),
        description: row.get("description"),
        status: TaskStatus::from_str(&status).map_err(|message| DbError::InvalidData {
            message,
            help: "status must be pending, in_progress or completed".to_string(),
        })?,
        due_date,
        created_at: row.get("created_at"),
        completed_at: row.get("completed_at"),
    })
}
