mod comment;
pub use comment::{CommentNode, CommentOrder, CommentTree, TreeConfig, Walk, DEFAULT_MAX_DEPTH};

mod config;
pub use config::ClientConfig;

pub mod discussion;
pub use discussion::{Discussion, ThreadList};

mod interaction;
pub use interaction::{Interaction, InteractionState, InteractionStore};

mod liveness;
pub use liveness::Liveness;

mod order;
pub use order::RankExt;

pub mod vote;
pub use vote::VoteTally;

pub mod api {
    pub use agora_api::*;
}

pub mod prelude {
    pub use crate::RankExt;
}
