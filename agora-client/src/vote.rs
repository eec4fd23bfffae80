use std::collections::{hash_map, HashMap};

use crate::api::{Error, Target, UserId, VoteDirection, VoteRecord};

/// Score of a target, and how the viewing user voted on it
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct VoteTally {
    pub score: i64,
    pub user_vote: Option<VoteDirection>,
}

/// Reduces the votes on `target` to its tally
///
/// Votes on any other target are ignored. A voter is counted once, with their
/// most recent vote, even if the data source returned more than one vote for
/// them; see `aggregate_with_report` to get these violations back.
pub fn aggregate<'a, I>(votes: I, target: Target, viewer: Option<UserId>) -> VoteTally
where
    I: IntoIterator<Item = &'a VoteRecord>,
{
    aggregate_with_report(votes, target, viewer).0
}

pub fn aggregate_with_report<'a, I>(
    votes: I,
    target: Target,
    viewer: Option<UserId>,
) -> (VoteTally, Vec<Error>)
where
    I: IntoIterator<Item = &'a VoteRecord>,
{
    // voter -> (most recent vote, number of votes seen)
    let mut latest: HashMap<UserId, (&'a VoteRecord, usize)> = HashMap::new();
    for v in votes.into_iter().filter(|v| v.target == target) {
        match latest.entry(v.voter_id) {
            hash_map::Entry::Vacant(e) => {
                e.insert((v, 1));
            }
            hash_map::Entry::Occupied(mut e) => {
                let (kept, count) = e.get_mut();
                *count += 1;
                if (v.date, v.id) > (kept.date, kept.id) {
                    *kept = v;
                }
            }
        }
    }

    let mut tally = VoteTally::default();
    let mut errors = Vec::new();
    for (voter, (v, count)) in latest.iter() {
        tally.score += v.direction.value();
        if Some(*voter) == viewer {
            tally.user_vote = Some(v.direction);
        }
        if *count > 1 {
            tracing::warn!(?voter, ?target, count, "multiple votes by the same user on one target");
            errors.push(Error::DataIntegrity {
                voter: *voter,
                target,
                count: *count,
            });
        }
    }
    errors.sort_unstable_by_key(|e| match e {
        Error::DataIntegrity { voter, .. } => Some(*voter),
        _ => None,
    });
    (tally, errors)
}

/// Splits a batched vote fetch per target
pub fn group_by_target<I>(votes: I) -> HashMap<Target, Vec<VoteRecord>>
where
    I: IntoIterator<Item = VoteRecord>,
{
    let mut res: HashMap<Target, Vec<VoteRecord>> = HashMap::new();
    for v in votes {
        res.entry(v.target).or_insert_with(Vec::new).push(v);
    }
    res
}
