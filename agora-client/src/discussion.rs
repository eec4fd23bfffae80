//! Loading a thread page or a thread list from the store, and posting to it

use std::iter;

use crate::{
    api::{
        validate_string, CommentId, Error, RankMode, Store, Target, ThreadId, ThreadScope,
        ThreadSummary, UserId, VoteDirection,
    },
    vote::{self, VoteTally},
    ClientConfig, CommentNode, CommentTree, Interaction, InteractionState, InteractionStore,
    Liveness, RankExt,
};

/// The comment tree of one thread, as seen by one viewer
#[derive(Debug)]
pub struct Discussion {
    pub thread: ThreadId,
    pub thread_tally: VoteTally,
    pub tree: CommentTree,

    /// Problems found in the fetched data, whose affected parts got left out
    pub errors: Vec<Error>,
}

impl Discussion {
    /// Fetches the comments of `thread` along with the votes on it and its comments
    ///
    /// Failing to fetch comments is an error, failing to fetch votes is not and
    /// just shows every score as zero. When `interactions` is set, the loaded
    /// scores, votes and bookmark are seeded into it.
    pub async fn load(
        remote: &dyn Store,
        thread: ThreadId,
        viewer: Option<UserId>,
        config: &ClientConfig,
        interactions: Option<&InteractionStore>,
        view: &Liveness,
    ) -> Result<Discussion, Error> {
        let comments = view.guard(remote.fetch_comments(thread)).await??;

        let targets = iter::once(Target::Thread(thread))
            .chain(comments.iter().map(|c| Target::Comment(c.id)))
            .collect::<Vec<_>>();
        let votes = match view.guard(remote.fetch_votes(&targets)).await? {
            Ok(votes) => votes,
            Err(err) => {
                tracing::warn!(?thread, %err, "failed fetching votes, showing zero scores");
                Vec::new()
            }
        };
        let votes = vote::group_by_target(votes);

        let bookmarked = match viewer {
            None => false,
            Some(user) => match view.guard(remote.fetch_bookmarks(user)).await? {
                Ok(bookmarks) => bookmarks.contains(&thread),
                Err(err) => {
                    tracing::warn!(?thread, %err, "failed fetching bookmarks");
                    false
                }
            },
        };

        let thread_target = Target::Thread(thread);
        let thread_tally = vote::aggregate(
            votes.get(&thread_target).into_iter().flatten(),
            thread_target,
            viewer,
        );
        let (tree, errors) = CommentTree::build_partial(&comments, &votes, viewer, &config.tree());
        for err in errors.iter() {
            tracing::warn!(?thread, %err, "left corrupted comments out of the tree");
        }

        if let Some(store) = interactions {
            store.seed(
                thread_target,
                Interaction {
                    score: thread_tally.score,
                    vote: thread_tally.user_vote,
                    bookmarked,
                },
            );
            for n in tree.walk() {
                store.seed(
                    Target::Comment(n.id()),
                    Interaction {
                        score: n.score,
                        vote: n.user_vote,
                        bookmarked: false,
                    },
                );
            }
        }

        Ok(Discussion {
            thread,
            thread_tally,
            tree,
            errors,
        })
    }

    /// Posts a comment, or a reply if `parent_id` is set, then shows it first
    /// among its siblings
    pub async fn submit_comment(
        &mut self,
        remote: &dyn Store,
        author: Option<UserId>,
        parent_id: Option<CommentId>,
        content: String,
        view: &Liveness,
    ) -> Result<&CommentNode, Error> {
        let author = author.ok_or(Error::AuthRequired)?;
        validate_string(&content)?;
        if let Some(p) = parent_id {
            if self.tree.get(&p).is_none() {
                return Err(Error::ParentNotFound(p));
            }
        }
        let record = view
            .guard(remote.insert_comment(self.thread, parent_id, content, author))
            .await??;
        tracing::debug!(thread=?self.thread, comment=?record.id, "comment submitted");
        self.tree.insert(record)
    }

    /// Votes on the thread or one of its comments, displaying the settled
    /// outcome on the page
    ///
    /// The page is left as is if the vote fails.
    pub async fn vote(
        &mut self,
        interactions: &InteractionStore,
        target: Target,
        direction: VoteDirection,
    ) -> Result<InteractionState, Error> {
        let state = interactions.apply_vote(target, direction).await?;
        let tally = VoteTally {
            score: state.current.score,
            user_vote: state.current.vote,
        };
        let shown = match target {
            Target::Thread(t) if t == self.thread => {
                self.thread_tally = tally;
                true
            }
            Target::Thread(_) => false,
            Target::Comment(c) => self.tree.set_tally(c, tally),
        };
        if !shown {
            tracing::debug!(thread=?self.thread, ?target, "voted on something not on this page");
        }
        Ok(state)
    }
}

/// Thread summaries in the currently selected rank mode
#[derive(Clone, Debug)]
pub struct ThreadList {
    mode: RankMode,
    threads: Vec<ThreadSummary>,
}

impl ThreadList {
    pub async fn load(
        remote: &dyn Store,
        scope: ThreadScope,
        mode: RankMode,
        view: &Liveness,
    ) -> Result<ThreadList, Error> {
        let mut threads = view.guard(remote.fetch_thread_summaries(scope)).await??;
        threads.retain(|t| scope.matches(t));
        Ok(ThreadList::from_summaries(threads, mode))
    }

    pub fn from_summaries(mut threads: Vec<ThreadSummary>, mode: RankMode) -> ThreadList {
        mode.sort(&mut threads);
        ThreadList { mode, threads }
    }

    pub fn mode(&self) -> RankMode {
        self.mode
    }

    pub fn threads(&self) -> &[ThreadSummary] {
        &self.threads
    }

    pub fn set_mode(&mut self, mode: RankMode) {
        self.mode = mode;
        mode.sort(&mut self.threads);
    }
}
