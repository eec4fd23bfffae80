use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::{
    api::{
        vote_value, Error, RemoteError, Store, Target, ThreadId, UserId, VoteChange, VoteDirection,
    },
    Liveness,
};

/// What one user sees of one entity
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Interaction {
    pub score: i64,
    pub vote: Option<VoteDirection>,
    pub bookmarked: bool,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InteractionState {
    /// Optimistic updates included
    pub current: Interaction,

    /// As last confirmed by the store, restored when a mutation fails
    pub last_known_good: Interaction,

    /// A mutation was sent to the store and has not come back yet
    pub in_flight: bool,
}

struct Session {
    user: Option<UserId>,

    // bumped whenever the user changes, so that answers to older requests get dropped
    epoch: u64,

    states: HashMap<Target, InteractionState>,

    // requests the store may still be acting on, kept across user changes
    pending: HashSet<(UserId, Target)>,
}

/// Votes and bookmarks of the signed-in user, for the entities of one view
pub struct InteractionStore {
    remote: Arc<dyn Store>,
    view: Liveness,
    session: Mutex<Session>,
}

impl InteractionStore {
    pub fn new(remote: Arc<dyn Store>, user: Option<UserId>, view: Liveness) -> InteractionStore {
        InteractionStore {
            remote,
            view,
            session: Mutex::new(Session {
                user,
                epoch: 0,
                states: HashMap::new(),
                pending: HashSet::new(),
            }),
        }
    }

    pub fn user(&self) -> Option<UserId> {
        self.session.lock().user
    }

    pub fn sign_in(&self, user: UserId) {
        let mut session = self.session.lock();
        if session.user != Some(user) {
            tracing::debug!(?user, "user changed, dropping interaction state");
            session.user = Some(user);
            session.epoch += 1;
            session.states.clear();
        }
    }

    pub fn sign_out(&self) {
        let mut session = self.session.lock();
        session.user = None;
        session.epoch += 1;
        session.states.clear();
    }

    pub fn get_state(&self, target: Target) -> InteractionState {
        self.session
            .lock()
            .states
            .get(&target)
            .copied()
            .unwrap_or_default()
    }

    /// Sets the confirmed state of an entity, eg. from freshly fetched data
    pub fn seed(&self, target: Target, interaction: Interaction) {
        let mut session = self.session.lock();
        let state = session.states.entry(target).or_default();
        if state.in_flight {
            tracing::debug!(?target, "not seeding an entity with a mutation in flight");
            return;
        }
        state.current = interaction;
        state.last_known_good = interaction;
    }

    /// Casts a vote, showing its expected outcome right away
    ///
    /// The displayed state follows `VoteChange::compute` until the store answers,
    /// and is then set to what the store actually did. It is rolled back if the
    /// store fails, or if the returned future is dropped before completion.
    pub async fn apply_vote(
        &self,
        target: Target,
        direction: VoteDirection,
    ) -> Result<InteractionState, Error> {
        let flight = self.begin(target, |i| {
            let change = VoteChange::compute(i.vote, direction);
            i.score += change.score_delta();
            i.vote = change.after();
        })?;
        tracing::debug!(?target, ?direction, "submitting vote");
        let res = self.remote.cast_vote(target, flight.user, direction).await;
        flight.settle(res.map(|change| {
            move |i: &mut Interaction| {
                let base = i.score - vote_value(i.vote);
                i.vote = change.after();
                i.score = base + vote_value(i.vote);
            }
        }))
    }

    /// Returns whether the thread is now bookmarked
    pub async fn toggle_bookmark(&self, thread: ThreadId) -> Result<bool, Error> {
        let target = Target::Thread(thread);
        let flight = self.begin(target, |i| i.bookmarked = !i.bookmarked)?;
        tracing::debug!(?thread, "submitting bookmark toggle");
        let res = self.remote.toggle_bookmark(thread, flight.user).await;
        flight
            .settle(res.map(|now| move |i: &mut Interaction| i.bookmarked = now))
            .map(|s| s.current.bookmarked)
    }

    fn begin<F>(&self, target: Target, optimistic: F) -> Result<InFlight<'_>, Error>
    where
        F: FnOnce(&mut Interaction),
    {
        let mut guard = self.session.lock();
        let session = &mut *guard;
        let user = session.user.ok_or(Error::AuthRequired)?;
        if !self.view.is_alive() {
            return Err(Error::Discarded);
        }
        let state = session.states.entry(target).or_default();
        if state.in_flight || session.pending.contains(&(user, target)) {
            tracing::debug!(?target, "refusing concurrent mutation");
            return Err(Error::MutationInFlight(target));
        }
        session.pending.insert((user, target));
        state.in_flight = true;
        optimistic(&mut state.current);
        Ok(InFlight {
            store: self,
            target,
            user,
            epoch: session.epoch,
            armed: true,
        })
    }
}

/// A mutation between `begin` and the answer of the store
///
/// Dropping it unsettled rolls the entity back to its last known good state.
struct InFlight<'a> {
    store: &'a InteractionStore,
    target: Target,
    user: UserId,
    epoch: u64,
    armed: bool,
}

impl InFlight<'_> {
    fn settle<F>(mut self, res: Result<F, RemoteError>) -> Result<InteractionState, Error>
    where
        F: FnOnce(&mut Interaction),
    {
        self.armed = false;
        let target = self.target;
        let mut session = self.store.session.lock();
        if session.epoch != self.epoch || !self.store.view.is_alive() {
            tracing::debug!(?target, "dropping mutation result for a stale view or session");
            self.release(&mut session);
            return Err(Error::Discarded);
        }
        session.pending.remove(&(self.user, target));
        let state = session.states.entry(target).or_default();
        state.in_flight = false;
        match res {
            Ok(confirm) => {
                confirm(&mut state.last_known_good);
                state.current = state.last_known_good;
                tracing::trace!(?target, state=?state.current, "mutation confirmed");
                Ok(*state)
            }
            Err(err) => {
                tracing::error!(?target, %err, "mutation failed, rolling back");
                state.current = state.last_known_good;
                Err(Error::Remote(err))
            }
        }
    }

    fn release(&self, session: &mut Session) {
        session.pending.remove(&(self.user, self.target));
        if session.epoch != self.epoch {
            return;
        }
        if let Some(state) = session.states.get_mut(&self.target) {
            state.in_flight = false;
            state.current = state.last_known_good;
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            let target = self.target;
            tracing::debug!(?target, "mutation cancelled, rolling back");
            let mut session = self.store.session.lock();
            self.release(&mut session);
        }
    }
}
