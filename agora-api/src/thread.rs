use std::collections::BTreeSet;

use uuid::Uuid;

use crate::{Author, Time, UserId, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct ThreadId(pub Uuid);

impl ThreadId {
    pub fn stub() -> ThreadId {
        ThreadId(STUB_UUID)
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommunityId(pub Uuid);

impl CommunityId {
    pub fn stub() -> CommunityId {
        CommunityId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ThreadSummary {
    pub id: ThreadId,
    pub title: String,

    /// First few lines of the thread's content
    pub excerpt: String,

    pub author: Author,
    pub community_id: CommunityId,
    pub score: i64,
    pub comment_count: u64,
    pub tags: BTreeSet<String>,
    pub date: Time,
}

/// Which threads a listing should return
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum ThreadScope {
    All,
    Community(CommunityId),
    User(UserId),
}

impl ThreadScope {
    pub fn matches(&self, t: &ThreadSummary) -> bool {
        match self {
            ThreadScope::All => true,
            ThreadScope::Community(c) => t.community_id == *c,
            ThreadScope::User(u) => t.author.id == *u,
        }
    }
}
