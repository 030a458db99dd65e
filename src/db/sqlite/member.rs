//! SQLite MemberRepository implementation.

use std::str::FromStr;

use sqlx::{Row, SqlitePool};

use crate::db::utils::{current_timestamp, generate_entity_id, or_generate};
use crate::db::{DbError, DbResult, FamilyMember, MemberRepository, MemberRole};

const MEMBER_COLUMNS: &str = "id, family_id, name, email, role, avatar_url, created_at";

/// SQLx-backed family member repository.
pub struct SqliteMemberRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> MemberRepository for SqliteMemberRepository<'a> {
    async fn create(&self, member: &FamilyMember) -> DbResult<FamilyMember> {
        let id = or_generate(&member.id, generate_entity_id);
        let created_at = or_generate(&member.created_at, current_timestamp);

        sqlx::query(
            r#"
            INSERT INTO family_member (id, family_id, name, email, role, avatar_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&member.family_id)
        .bind(&member.name)
        .bind(&member.email)
        .bind(member.role.to_string())
        .bind(&member.avatar_url)
        .bind(&created_at)
        .execute(self.pool)
        .await?;

        Ok(FamilyMember {
            id,
            created_at,
            ..member.clone()
        })
    }

    async fn get(&self, id: &str) -> DbResult<FamilyMember> {
        let sql = format!("SELECT {} FROM family_member WHERE id = ?", MEMBER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("FamilyMember", id))?;

        row_to_member(&row)
    }

    async fn list_by_family(&self, family_id: &str) -> DbResult<Vec<FamilyMember>> {
        // Parents before children, then by join order.
        let sql = format!(
            "SELECT {} FROM family_member WHERE family_id = ?
             ORDER BY CASE role WHEN 'parent' THEN 0 ELSE 1 END, created_at ASC, id ASC",
            MEMBER_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(family_id)
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(row_to_member).collect()
    }

    async fn update(&self, member: &FamilyMember) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE family_member SET name = ?, email = ?, role = ?, avatar_url = ? WHERE id = ?",
        )
        .bind(&member.name)
        .bind(&member.email)
        .bind(member.role.to_string())
        .bind(&member.avatar_url)
        .bind(&member.id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("FamilyMember", &member.id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM family_member WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("FamilyMember", id));
        }

        Ok(())
    }
}

fn row_to_member(row: &sqlx::sqlite::SqliteRow) -> DbResult<FamilyMember> {
    let role: String = row.get("role");
    let role = MemberRole::from_str(&role).map_err(|message| DbError::InvalidData {
        message,
        help: "role must be 'parent' or 'child'".to_string(),
    })?;

    Ok(FamilyMember {
        id: row.get("id"),
        family_id: row.get("family_id"),
        name: row.get("name"),
        email: row.get("email"),
        role,
        avatar_url: row.get("avatar_url"),
        created_at: row.get("created_at"),
    })
}
