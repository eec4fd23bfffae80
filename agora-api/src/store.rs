use std::collections::HashSet;

use async_trait::async_trait;

use crate::{
    CommentId, CommentRecord, RemoteError, Target, ThreadId, ThreadScope, ThreadSummary, UserId,
    VoteChange, VoteDirection, VoteRecord,
};

/// The hosted data store, as seen by the client core
#[async_trait]
pub trait Store: Send + Sync {
    async fn fetch_comments(&self, thread: ThreadId) -> Result<Vec<CommentRecord>, RemoteError>;

    /// Votes on any of the given targets, in no particular order
    async fn fetch_votes(&self, targets: &[Target]) -> Result<Vec<VoteRecord>, RemoteError>;

    async fn fetch_thread_summaries(
        &self,
        scope: ThreadScope,
    ) -> Result<Vec<ThreadSummary>, RemoteError>;

    async fn fetch_bookmarks(&self, user: UserId) -> Result<HashSet<ThreadId>, RemoteError>;

    async fn insert_comment(
        &self,
        thread: ThreadId,
        parent_id: Option<CommentId>,
        content: String,
        author: UserId,
    ) -> Result<CommentRecord, RemoteError>;

    /// Casts `direction` for `user` on `target`, following `VoteChange::compute`
    /// against the stored vote, and returns what was actually done
    async fn cast_vote(
        &self,
        target: Target,
        user: UserId,
        direction: VoteDirection,
    ) -> Result<VoteChange, RemoteError>;

    /// Returns whether the thread is bookmarked after the call
    async fn toggle_bookmark(&self, thread: ThreadId, user: UserId) -> Result<bool, RemoteError>;
}
