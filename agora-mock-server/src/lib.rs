use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use agora_client::{
    api::{
        validate_string, Author, CommentId, CommentRecord, CommunityId, RemoteError, Store,
        Target, ThreadId, ThreadScope, ThreadSummary, UserId, Uuid, VoteChange, VoteDirection,
        VoteRecord,
    },
    vote,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

/// In-memory stand-in for the hosted data store
///
/// Everything added through the `add_*` methods is stored as-is, which allows
/// setting up corrupted data. Everything going through `Store` is validated.
pub struct MockServer(Mutex<State>);

#[derive(Default)]
struct State {
    users: HashMap<UserId, Author>,
    threads: HashMap<ThreadId, ThreadSummary>,
    comments: Vec<CommentRecord>,
    votes: Vec<VoteRecord>,
    bookmarks: HashSet<(UserId, ThreadId)>,
    // None lets the call through
    failures: VecDeque<Option<RemoteError>>,
    calls: usize,
}

impl State {
    fn author(&self, user: UserId) -> Result<&Author, RemoteError> {
        self.users.get(&user).ok_or(RemoteError::PermissionDenied)
    }

    fn target_exists(&self, target: Target) -> bool {
        match target {
            Target::Thread(t) => self.threads.contains_key(&t),
            Target::Comment(c) => self.comments.iter().any(|r| r.id == c),
        }
    }

    fn summary(&self, t: &ThreadSummary) -> ThreadSummary {
        let target = Target::Thread(t.id);
        let mut res = t.clone();
        res.score = vote::aggregate(&self.votes, target, None).score;
        res.comment_count = self.comments.iter().filter(|c| c.thread_id == t.id).count() as u64;
        res
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer(Mutex::new(State::default()))
    }

    pub fn add_user(&self, name: &str) -> UserId {
        let id = UserId(Uuid::new_v4());
        self.0
            .lock()
            .users
            .insert(id, Author::new(id, String::from(name)));
        id
    }

    pub fn add_thread(&self, author: UserId, community: CommunityId, title: &str) -> ThreadId {
        let mut state = self.0.lock();
        let author = state
            .users
            .get(&author)
            .cloned()
            .unwrap_or_else(|| panic!("adding a thread for unknown user {author:?}"));
        let id = ThreadId(Uuid::new_v4());
        state.threads.insert(
            id,
            ThreadSummary {
                id,
                title: String::from(title),
                excerpt: String::new(),
                author,
                community_id: community,
                score: 0,
                comment_count: 0,
                tags: BTreeSet::new(),
                date: Utc::now(),
            },
        );
        id
    }

    pub fn add_comment(&self, c: CommentRecord) {
        self.0.lock().comments.push(c);
    }

    /// Stores a vote without checking the one-vote-per-user rule
    pub fn add_vote(&self, v: VoteRecord) {
        self.0.lock().votes.push(v);
    }

    /// Makes the next `Store` call fail with `err`
    ///
    /// Successive calls queue up, use `succeed_next` to fail a later call only.
    pub fn fail_next(&self, err: RemoteError) {
        self.0.lock().failures.push_back(Some(err));
    }

    pub fn succeed_next(&self) {
        self.0.lock().failures.push_back(None);
    }

    /// Number of `Store` calls received so far
    pub fn num_calls(&self) -> usize {
        self.0.lock().calls
    }

    pub fn votes_of(&self, user: UserId, target: Target) -> Vec<VoteRecord> {
        self.0
            .lock()
            .votes
            .iter()
            .filter(|v| v.voter_id == user && v.target == target)
            .cloned()
            .collect()
    }

    pub fn is_bookmarked(&self, user: UserId, thread: ThreadId) -> bool {
        self.0.lock().bookmarks.contains(&(user, thread))
    }

    async fn call<T, F>(&self, f: F) -> Result<T, RemoteError>
    where
        F: FnOnce(&mut State) -> Result<T, RemoteError>,
    {
        // let other tasks run, like a network round-trip would
        tokio::task::yield_now().await;
        let mut state = self.0.lock();
        state.calls += 1;
        if let Some(Some(err)) = state.failures.pop_front() {
            tracing::debug!(%err, "injecting failure");
            return Err(err);
        }
        f(&mut state)
    }
}

#[async_trait]
impl Store for MockServer {
    async fn fetch_comments(&self, thread: ThreadId) -> Result<Vec<CommentRecord>, RemoteError> {
        self.call(|s| {
            Ok(s.comments
                .iter()
                .filter(|c| c.thread_id == thread)
                .cloned()
                .collect())
        })
        .await
    }

    async fn fetch_votes(&self, targets: &[Target]) -> Result<Vec<VoteRecord>, RemoteError> {
        let targets = targets.iter().copied().collect::<HashSet<_>>();
        self.call(|s| {
            Ok(s.votes
                .iter()
                .filter(|v| targets.contains(&v.target))
                .cloned()
                .collect())
        })
        .await
    }

    async fn fetch_thread_summaries(
        &self,
        scope: ThreadScope,
    ) -> Result<Vec<ThreadSummary>, RemoteError> {
        self.call(|s| {
            Ok(s.threads
                .values()
                .filter(|t| scope.matches(t))
                .map(|t| s.summary(t))
                .collect())
        })
        .await
    }

    async fn fetch_bookmarks(&self, user: UserId) -> Result<HashSet<ThreadId>, RemoteError> {
        self.call(|s| {
            s.author(user)?;
            Ok(s.bookmarks
                .iter()
                .filter(|(u, _)| *u == user)
                .map(|(_, t)| *t)
                .collect())
        })
        .await
    }

    async fn insert_comment(
        &self,
        thread: ThreadId,
        parent_id: Option<CommentId>,
        content: String,
        author: UserId,
    ) -> Result<CommentRecord, RemoteError> {
        self.call(|s| {
            validate_string(&content)?;
            let author = s.author(author)?.clone();
            if !s.threads.contains_key(&thread) {
                return Err(RemoteError::NotFound);
            }
            if let Some(p) = parent_id {
                if !s.comments.iter().any(|c| c.id == p && c.thread_id == thread) {
                    return Err(RemoteError::NotFound);
                }
            }
            let c = CommentRecord::now(author, thread, parent_id, content);
            s.comments.push(c.clone());
            Ok(c)
        })
        .await
    }

    async fn cast_vote(
        &self,
        target: Target,
        user: UserId,
        direction: VoteDirection,
    ) -> Result<VoteChange, RemoteError> {
        self.call(|s| {
            s.author(user)?;
            if !s.target_exists(target) {
                return Err(RemoteError::NotFound);
            }
            let existing = s
                .votes
                .iter()
                .filter(|v| v.voter_id == user && v.target == target)
                .max_by_key(|v| (v.date, v.id))
                .map(|v| v.direction);
            let change = VoteChange::compute(existing, direction);
            s.votes
                .retain(|v| !(v.voter_id == user && v.target == target));
            if let Some(d) = change.after() {
                s.votes.push(VoteRecord::now(target, user, d));
            }
            Ok(change)
        })
        .await
    }

    async fn toggle_bookmark(&self, thread: ThreadId, user: UserId) -> Result<bool, RemoteError> {
        self.call(|s| {
            s.author(user)?;
            if !s.threads.contains_key(&thread) {
                return Err(RemoteError::NotFound);
            }
            match s.bookmarks.remove(&(user, thread)) {
                true => Ok(false),
                false => Ok(s.bookmarks.insert((user, thread))),
            }
        })
        .await
    }
}
