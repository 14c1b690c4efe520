use anyhow::Result;
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::models::Folder;

fn folder_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Folder> {
    let parent_id: Option<String> = row.get("parent_id");
    Ok(Folder {
        id: Uuid::parse_str(&row.get::<String, _>("id"))?,
        title: row.get("title"),
        parent_id: parent_id.as_deref().map(Uuid::parse_str).transpose()?,
        user_id: Uuid::parse_str(&row.get::<String, _>("user_id"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

impl Database {
    /// Look up a child folder by title under `parent_id` (None = the owner's
    /// implicit root). `IS ?` matches NULL parents where `= ?` would not.
    pub async fn find_folder(
        &self,
        user_id: Uuid,
        parent_id: Option<&Uuid>,
        title: &str,
    ) -> Result<Option<Folder>> {
        let row = sqlx::query(
            "SELECT id, title, parent_id, user_id, created_at, updated_at
             FROM folders WHERE title = ? AND parent_id IS ? AND user_id = ?",
        )
        .bind(title)
        .bind(parent_id.map(Uuid::to_string))
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(folder_from_row).transpose()
    }

    pub async fn create_folder(
        &self,
        user_id: Uuid,
        parent_id: Option<&Uuid>,
        title: &str,
    ) -> Result<Folder> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO folders (id, title, parent_id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, title, parent_id, user_id, created_at, updated_at
            "#,
        )
        .bind(id.to_string())
        .bind(title)
        .bind(parent_id.map(Uuid::to_string))
        .bind(user_id.to_string())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        folder_from_row(&row)
    }

    /// Delete a folder and, through the schema's cascading foreign keys, its
    /// entire subtree of folders and notes in one atomic transaction.
    pub async fn delete_folder(&self, user_id: Uuid, id: Uuid) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM folders WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Immediate children of a folder, ordered by title so a listing is
    /// stable within a single response.
    pub async fn list_folders(&self, user_id: Uuid, parent_id: Option<&Uuid>) -> Result<Vec<Folder>> {
        let rows = sqlx::query(
            "SELECT id, title, parent_id, user_id, created_at, updated_at
             FROM folders WHERE parent_id IS ? AND user_id = ?
             ORDER BY title",
        )
        .bind(parent_id.map(Uuid::to_string))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(folder_from_row).collect()
    }
}
