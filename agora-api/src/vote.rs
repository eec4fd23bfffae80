use chrono::Utc;
use uuid::Uuid;

use crate::{CommentId, ThreadId, Time, UserId};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct VoteId(pub Uuid);

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn value(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }

    pub fn opposite(self) -> VoteDirection {
        match self {
            VoteDirection::Up => VoteDirection::Down,
            VoteDirection::Down => VoteDirection::Up,
        }
    }
}

/// Contribution of a (possibly absent) vote to a score
pub fn vote_value(v: Option<VoteDirection>) -> i64 {
    v.map(VoteDirection::value).unwrap_or(0)
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Thread,
    Comment,
}

/// What a vote (or any other per-entity interaction) applies to
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Target {
    Thread(ThreadId),
    Comment(CommentId),
}

impl Target {
    pub fn kind(&self) -> TargetKind {
        match self {
            Target::Thread(_) => TargetKind::Thread,
            Target::Comment(_) => TargetKind::Comment,
        }
    }

    pub fn uuid(&self) -> Uuid {
        match self {
            Target::Thread(t) => t.0,
            Target::Comment(c) => c.0,
        }
    }
}

impl From<ThreadId> for Target {
    fn from(t: ThreadId) -> Target {
        Target::Thread(t)
    }
}

impl From<CommentId> for Target {
    fn from(c: CommentId) -> Target {
        Target::Comment(c)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct VoteRecord {
    pub id: VoteId,
    pub target: Target,
    pub voter_id: UserId,
    pub direction: VoteDirection,
    pub date: Time,
}

impl VoteRecord {
    pub fn now(target: Target, voter_id: UserId, direction: VoteDirection) -> VoteRecord {
        VoteRecord {
            id: VoteId(Uuid::new_v4()),
            target,
            voter_id,
            direction,
            date: Utc::now(),
        }
    }
}

/// The single rule deciding what casting a vote does to the stored vote
///
/// Every surface that lets a user vote goes through `VoteChange::compute`, be it
/// the local optimistic update or the store realizing the vote.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum VoteChange {
    /// There was no vote, one is inserted
    Insert(VoteDirection),

    /// The same direction was requested again, the vote is deleted
    Delete(VoteDirection),

    /// The opposite direction was requested, the vote is flipped in place
    Update {
        from: VoteDirection,
        to: VoteDirection,
    },
}

impl VoteChange {
    pub fn compute(existing: Option<VoteDirection>, requested: VoteDirection) -> VoteChange {
        match existing {
            None => VoteChange::Insert(requested),
            Some(d) if d == requested => VoteChange::Delete(d),
            Some(from) => VoteChange::Update {
                from,
                to: requested,
            },
        }
    }

    pub fn before(&self) -> Option<VoteDirection> {
        match *self {
            VoteChange::Insert(_) => None,
            VoteChange::Delete(d) => Some(d),
            VoteChange::Update { from, .. } => Some(from),
        }
    }

    pub fn after(&self) -> Option<VoteDirection> {
        match *self {
            VoteChange::Insert(d) => Some(d),
            VoteChange::Delete(_) => None,
            VoteChange::Update { to, .. } => Some(to),
        }
    }

    pub fn score_delta(&self) -> i64 {
        vote_value(self.after()) - vote_value(self.before())
    }
}
