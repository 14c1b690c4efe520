use anyhow::Result;
use uuid::Uuid;

use super::Database;
use crate::dav_path::split_note_name;
use crate::models::{Folder, Note};

/// A fully resolved resource. The root is implicit per owner: it always
/// exists and has no row of its own.
#[derive(Debug, Clone)]
pub enum Resolved {
    Root,
    Folder(Folder),
    Note(Note),
}

/// Typed outcome of walking a path against one owner's tree.
///
/// `Missing` carries the index of the first segment that failed to resolve
/// together with the deepest resolved folder (None = root), which is exactly
/// what the create preconditions need to distinguish "parent exists" from
/// "ancestor missing".
#[derive(Debug, Clone)]
pub enum Resolution {
    Found(Resolved),
    Missing {
        index: usize,
        parent_id: Option<Uuid>,
    },
}

impl Database {
    /// Resolve decoded path segments for `user_id`. Intermediate segments
    /// must be folders; the final segment is tried as a note (when its name
    /// splits into title.syntax) and then as a folder. Matching is
    /// case-sensitive and never crosses owners.
    pub async fn resolve_path(&self, user_id: Uuid, segments: &[String]) -> Result<Resolution> {
        if segments.is_empty() {
            return Ok(Resolution::Found(Resolved::Root));
        }

        let last = segments.len() - 1;
        let mut parent_id: Option<Uuid> = None;

        for (index, segment) in segments[..last].iter().enumerate() {
            match self.find_folder(user_id, parent_id.as_ref(), segment).await? {
                Some(folder) => parent_id = Some(folder.id),
                None => return Ok(Resolution::Missing { index, parent_id }),
            }
        }

        let name = &segments[last];
        if let Some((title, syntax)) = split_note_name(name) {
            if let Some(note) = self
                .find_note(user_id, parent_id.as_ref(), &title, &syntax)
                .await?
            {
                return Ok(Resolution::Found(Resolved::Note(note)));
            }
        }
        if let Some(folder) = self.find_folder(user_id, parent_id.as_ref(), name).await? {
            return Ok(Resolution::Found(Resolved::Folder(folder)));
        }

        Ok(Resolution::Missing {
            index: last,
            parent_id,
        })
    }
}
