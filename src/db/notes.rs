use anyhow::Result;
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::models::Note;

fn note_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Note> {
    let parent_id: Option<String> = row.get("parent_id");
    Ok(Note {
        id: Uuid::parse_str(&row.get::<String, _>("id"))?,
        title: row.get("title"),
        content: row.get("content"),
        syntax: row.get("syntax"),
        parent_id: parent_id.as_deref().map(Uuid::parse_str).transpose()?,
        user_id: Uuid::parse_str(&row.get::<String, _>("user_id"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

impl Database {
    /// A note's identity within a parent is (title, syntax), the two halves
    /// of its URL name.
    pub async fn find_note(
        &self,
        user_id: Uuid,
        parent_id: Option<&Uuid>,
        title: &str,
        syntax: &str,
    ) -> Result<Option<Note>> {
        let row = sqlx::query(
            "SELECT id, title, content, syntax, parent_id, user_id, created_at, updated_at
             FROM notes WHERE title = ? AND syntax = ? AND parent_id IS ? AND user_id = ?",
        )
        .bind(title)
        .bind(syntax)
        .bind(parent_id.map(Uuid::to_string))
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(note_from_row).transpose()
    }

    pub async fn create_note(
        &self,
        user_id: Uuid,
        parent_id: Option<&Uuid>,
        title: &str,
        syntax: &str,
        content: &[u8],
    ) -> Result<Note> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO notes (id, title, content, syntax, parent_id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, content, syntax, parent_id, user_id, created_at, updated_at
            "#,
        )
        .bind(id.to_string())
        .bind(title)
        .bind(content)
        .bind(syntax)
        .bind(parent_id.map(Uuid::to_string))
        .bind(user_id.to_string())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        note_from_row(&row)
    }

    /// Replace a note's content in place. Title and parent are immutable
    /// after creation; only the payload and `updated_at` change.
    pub async fn update_note_content(&self, user_id: Uuid, id: Uuid, content: &[u8]) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notes SET content = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(content)
        .bind(Utc::now())
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_note(&self, user_id: Uuid, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn list_notes(&self, user_id: Uuid, parent_id: Option<&Uuid>) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            "SELECT id, title, content, syntax, parent_id, user_id, created_at, updated_at
             FROM notes WHERE parent_id IS ? AND user_id = ?
             ORDER BY title, syntax",
        )
        .bind(parent_id.map(Uuid::to_string))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(note_from_row).collect()
    }
}
