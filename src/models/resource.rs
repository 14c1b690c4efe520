use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A collection in the resource tree. `parent_id` of `None` means the folder
/// sits directly under the owner's implicit root.
#[derive(Debug, Clone, Serialize)]
pub struct Folder {
    pub id: Uuid,
    pub title: String,
    pub parent_id: Option<Uuid>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A leaf resource. The WebDAV name of a note is `title.syntax`; content is
/// an opaque byte sequence stored and returned verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing)]
    pub content: Vec<u8>,
    pub syntax: String,
    pub parent_id: Option<Uuid>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.title, self.syntax)
    }
}
