use chrono::Utc;
use uuid::Uuid;

use crate::{ThreadId, Time, UserId};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Author {
    pub id: UserId,
    pub name: String,

    /// Reference to the avatar image, as understood by the upload service
    pub avatar: Option<String>,
}

impl Author {
    pub fn new(id: UserId, name: String) -> Author {
        Author {
            id,
            name,
            avatar: None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentRecord {
    pub id: CommentId,
    pub thread_id: ThreadId,

    /// None for a top-level comment
    pub parent_id: Option<CommentId>,

    pub author: Author,
    pub content: String,
    pub date: Time,
}

impl CommentRecord {
    pub fn now(
        author: Author,
        thread_id: ThreadId,
        parent_id: Option<CommentId>,
        content: String,
    ) -> CommentRecord {
        CommentRecord {
            id: CommentId(Uuid::new_v4()),
            thread_id,
            parent_id,
            author,
            content,
            date: Utc::now(),
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}
