use std::{borrow::Borrow, cmp::Reverse};

use crate::api::{RankMode, ThreadSummary};

pub trait RankExt {
    fn sort<T: Borrow<ThreadSummary>>(&self, threads: &mut [T]);

    /// Returns a ranked copy, leaving `threads` untouched
    fn rank(&self, threads: &[ThreadSummary]) -> Vec<ThreadSummary> {
        let mut res = threads.to_vec();
        self.sort(&mut res);
        res
    }
}

fn trending_score(t: &ThreadSummary) -> i64 {
    t.score
        .saturating_add(i64::try_from(t.comment_count).unwrap_or(i64::MAX))
}

impl RankExt for RankMode {
    // Every key ends with the thread id, so that equal threads still get a stable order
    fn sort<T: Borrow<ThreadSummary>>(&self, threads: &mut [T]) {
        match self {
            RankMode::New => threads.sort_unstable_by_key(|t| {
                let t: &ThreadSummary = t.borrow();
                (Reverse(t.date), t.id)
            }),
            RankMode::Top => threads.sort_unstable_by_key(|t| {
                let t: &ThreadSummary = t.borrow();
                (Reverse(t.score), Reverse(t.date), t.id)
            }),
            RankMode::Comments => threads.sort_unstable_by_key(|t| {
                let t: &ThreadSummary = t.borrow();
                (Reverse(t.comment_count), Reverse(t.score), Reverse(t.date), t.id)
            }),
            RankMode::Trending => threads.sort_unstable_by_key(|t| {
                let t: &ThreadSummary = t.borrow();
                (Reverse(trending_score(t)), Reverse(t.date), t.id)
            }),
        }
    }
}
