use std::{
    cmp::Reverse,
    collections::{hash_map, HashMap, VecDeque},
    str::FromStr,
};

use crate::{
    api::{CommentId, CommentRecord, Error, Target, UserId, VoteDirection, VoteRecord},
    vote::{self, VoteTally},
};

pub const DEFAULT_MAX_DEPTH: usize = 5;

#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum CommentOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl FromStr for CommentOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<CommentOrder> {
        match s {
            "newest-first" => Ok(CommentOrder::NewestFirst),
            "oldest-first" => Ok(CommentOrder::OldestFirst),
            _ => Err(anyhow::anyhow!("unknown comment order {s:?}")),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TreeConfig {
    pub max_depth: usize,

    /// Order of siblings in a freshly built tree
    pub order: CommentOrder,
}

impl Default for TreeConfig {
    fn default() -> TreeConfig {
        TreeConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            order: CommentOrder::NewestFirst,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentNode {
    pub record: CommentRecord,
    pub score: i64,
    pub user_vote: Option<VoteDirection>,

    /// 0 for a top-level comment
    pub level: usize,

    /// Whether the UI should offer to reply to this comment
    pub can_reply: bool,

    children: VecDeque<CommentId>,
}

impl CommentNode {
    fn new(record: CommentRecord, level: usize, max_depth: usize) -> CommentNode {
        CommentNode {
            record,
            score: 0,
            user_vote: None,
            level,
            can_reply: level + 1 < max_depth,
            children: VecDeque::new(),
        }
    }

    pub fn id(&self) -> CommentId {
        self.record.id
    }

    pub fn child_ids(&self) -> impl Iterator<Item = &CommentId> {
        self.children.iter()
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }
}

/// A thread's comments, nested by reply
///
/// Nodes live in a flat index and refer to their children by id, so that looking
/// a comment up or attaching a reply to it does not need to walk the forest.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentTree {
    max_depth: usize,
    roots: VecDeque<CommentId>,
    nodes: HashMap<CommentId, CommentNode>,

    /// Comments left out because one of their ancestors is missing
    orphans: Vec<CommentId>,
}

#[derive(Clone, Copy, Debug)]
enum Placement {
    Level(usize),
    Orphan,

    /// In, or below, a cycle or a duplicated identifier
    Broken,
}

enum Walked {
    Root,
    Below(Placement),
    MissingParent,
    Cycle(usize),
}

impl CommentTree {
    pub fn empty(max_depth: usize) -> CommentTree {
        CommentTree {
            max_depth,
            roots: VecDeque::new(),
            nodes: HashMap::new(),
            orphans: Vec::new(),
        }
    }

    /// Builds the tree, failing on the first sign of corrupted input
    ///
    /// `votes` is looked up with `Target::Comment` keys, as returned by
    /// `vote::group_by_target`. Orphans are not an error, they are left out and
    /// listed in `orphans()`.
    pub fn build(
        comments: &[CommentRecord],
        votes: &HashMap<Target, Vec<VoteRecord>>,
        viewer: Option<UserId>,
        config: &TreeConfig,
    ) -> Result<CommentTree, Error> {
        let (tree, mut errors) = Self::build_partial(comments, votes, viewer, config);
        match errors.is_empty() {
            true => Ok(tree),
            false => Err(errors.swap_remove(0)),
        }
    }

    /// Builds the tree, leaving out the subtrees that hold a duplicated
    /// identifier or a cycle and returning the corresponding errors
    pub fn build_partial(
        comments: &[CommentRecord],
        votes: &HashMap<Target, Vec<VoteRecord>>,
        viewer: Option<UserId>,
        config: &TreeConfig,
    ) -> (CommentTree, Vec<Error>) {
        let mut index: HashMap<CommentId, &CommentRecord> = HashMap::with_capacity(comments.len());
        let mut duplicates = Vec::new();
        for c in comments {
            match index.entry(c.id) {
                hash_map::Entry::Vacant(e) => {
                    e.insert(c);
                }
                hash_map::Entry::Occupied(_) => duplicates.push(c.id),
            }
        }
        duplicates.sort_unstable();
        duplicates.dedup();

        let mut placed: HashMap<CommentId, Placement> = HashMap::with_capacity(comments.len());
        for d in duplicates.iter() {
            placed.insert(*d, Placement::Broken);
        }

        let mut cycles = Vec::new();
        let mut path = Vec::new();
        let mut on_path = HashMap::new();
        for c in comments {
            if placed.contains_key(&c.id) {
                continue;
            }

            // Walk up until reaching something already known, then place the whole path
            path.clear();
            on_path.clear();
            let mut cur = c.id;
            let walked = loop {
                if let Some(p) = placed.get(&cur) {
                    break Walked::Below(*p);
                }
                if let Some(pos) = on_path.get(&cur) {
                    break Walked::Cycle(*pos);
                }
                on_path.insert(cur, path.len());
                path.push(cur);
                let rec = index[&cur];
                match rec.parent_id {
                    None => break Walked::Root,
                    Some(parent) => match index.get(&parent) {
                        Some(p) if p.thread_id == rec.thread_id => cur = parent,
                        Some(_) => {
                            tracing::warn!(
                                comment=?cur,
                                ?parent,
                                "comment answers a comment from another thread"
                            );
                            break Walked::MissingParent;
                        }
                        None => {
                            tracing::warn!(
                                comment=?cur,
                                ?parent,
                                "comment answers a comment that is not in the dataset"
                            );
                            break Walked::MissingParent;
                        }
                    },
                }
            };

            match walked {
                Walked::Root => {
                    let len = path.len();
                    for (i, id) in path.iter().enumerate() {
                        placed.insert(*id, Placement::Level(len - 1 - i));
                    }
                }
                Walked::Below(Placement::Level(parent_level)) => {
                    let len = path.len();
                    for (i, id) in path.iter().enumerate() {
                        placed.insert(*id, Placement::Level(parent_level + len - i));
                    }
                }
                Walked::Below(p @ (Placement::Orphan | Placement::Broken)) => {
                    for id in path.iter() {
                        placed.insert(*id, p);
                    }
                }
                Walked::MissingParent => {
                    for id in path.iter() {
                        placed.insert(*id, Placement::Orphan);
                    }
                }
                Walked::Cycle(start) => {
                    let member = path[start..]
                        .iter()
                        .min()
                        .copied()
                        .expect("a cycle has at least one member");
                    tracing::warn!(?member, len = path.len() - start, "cycle in comment parents");
                    cycles.push(member);
                    for id in path.iter() {
                        placed.insert(*id, Placement::Broken);
                    }
                }
            }
        }
        cycles.sort_unstable();

        let mut tree = CommentTree::empty(config.max_depth);
        let mut parents = Vec::new();
        for (id, p) in placed.iter() {
            match *p {
                Placement::Level(level) => {
                    let rec = index[id];
                    let mut node = CommentNode::new(rec.clone(), level, config.max_depth);
                    let target = Target::Comment(*id);
                    let on_target = votes.get(&target).into_iter().flatten();
                    let tally = vote::aggregate(on_target, target, viewer);
                    node.score = tally.score;
                    node.user_vote = tally.user_vote;
                    tree.nodes.insert(*id, node);
                    match rec.parent_id {
                        None => tree.roots.push_back(*id),
                        Some(parent) => parents.push((parent, *id)),
                    }
                }
                Placement::Orphan => tree.orphans.push(*id),
                Placement::Broken => (),
            }
        }
        for (parent, child) in parents {
            if let Some(p) = tree.nodes.get_mut(&parent) {
                p.children.push_back(child);
            }
        }

        // Sort siblings, so that the result does not depend on the input order
        let key = |nodes: &HashMap<CommentId, CommentNode>, id: &CommentId| {
            let date = nodes[id].record.date;
            match config.order {
                CommentOrder::NewestFirst => (Some(Reverse(date)), None, *id),
                CommentOrder::OldestFirst => (None, Some(date), *id),
            }
        };
        let mut roots = std::mem::take(&mut tree.roots);
        roots.make_contiguous().sort_unstable_by_key(|id| key(&tree.nodes, id));
        tree.roots = roots;
        let ids = tree.nodes.keys().copied().collect::<Vec<_>>();
        for id in ids {
            let mut children = match tree.nodes.get_mut(&id) {
                Some(n) if n.children.len() > 1 => std::mem::take(&mut n.children),
                _ => continue,
            };
            children.make_contiguous().sort_unstable_by_key(|c| key(&tree.nodes, c));
            if let Some(n) = tree.nodes.get_mut(&id) {
                n.children = children;
            }
        }
        tree.orphans.sort_unstable();

        let errors = duplicates
            .into_iter()
            .map(Error::DuplicateIdentifier)
            .chain(cycles.into_iter().map(Error::CyclicReference))
            .collect();
        (tree, errors)
    }

    /// Attaches a freshly submitted reply as the first child of `parent_id`
    pub fn insert_reply(
        &mut self,
        parent_id: CommentId,
        mut comment: CommentRecord,
    ) -> Result<&CommentNode, Error> {
        if self.nodes.contains_key(&comment.id) {
            return Err(Error::DuplicateIdentifier(comment.id));
        }
        let parent = self
            .nodes
            .get_mut(&parent_id)
            .ok_or(Error::ParentNotFound(parent_id))?;
        if parent.record.thread_id != comment.thread_id {
            return Err(Error::ThreadMismatch {
                comment: comment.id,
                parent: parent_id,
            });
        }
        comment.parent_id = Some(parent_id);
        let id = comment.id;
        let level = parent.level + 1;
        parent.children.push_front(id);
        let node = CommentNode::new(comment, level, self.max_depth);
        Ok(&*self.nodes.entry(id).or_insert(node))
    }

    /// Inserts a freshly submitted comment first among its siblings
    pub fn insert(&mut self, comment: CommentRecord) -> Result<&CommentNode, Error> {
        match comment.parent_id {
            Some(parent) => self.insert_reply(parent, comment),
            None => {
                if self.nodes.contains_key(&comment.id) {
                    return Err(Error::DuplicateIdentifier(comment.id));
                }
                let id = comment.id;
                self.roots.push_front(id);
                let node = CommentNode::new(comment, 0, self.max_depth);
                Ok(&*self.nodes.entry(id).or_insert(node))
            }
        }
    }

    /// Displays a new score and viewer vote on a comment, eg. once a vote settled
    ///
    /// Returns false if the comment is not in this tree.
    pub fn set_tally(&mut self, id: CommentId, tally: VoteTally) -> bool {
        match self.nodes.get_mut(&id) {
            None => false,
            Some(n) => {
                n.score = tally.score;
                n.user_vote = tally.user_vote;
                true
            }
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &CommentId) -> Option<&CommentNode> {
        self.nodes.get(id)
    }

    pub fn orphans(&self) -> &[CommentId] {
        &self.orphans
    }

    pub fn roots(&self) -> impl Iterator<Item = &CommentNode> {
        self.roots.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn children(&self, id: &CommentId) -> impl Iterator<Item = &CommentNode> {
        self.nodes
            .get(id)
            .into_iter()
            .flat_map(|n| n.children.iter())
            .filter_map(|c| self.nodes.get(c))
    }

    /// All comments, depth-first, each one directly followed by its replies
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }
}

pub struct Walk<'a> {
    tree: &'a CommentTree,
    stack: Vec<CommentId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a CommentNode;

    fn next(&mut self) -> Option<&'a CommentNode> {
        while let Some(id) = self.stack.pop() {
            if let Some(n) = self.tree.nodes.get(&id) {
                self.stack.extend(n.children.iter().rev().copied());
                return Some(n);
            }
        }
        None
    }
}
