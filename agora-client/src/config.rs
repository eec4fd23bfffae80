use anyhow::Context;

use crate::{api::RankMode, CommentOrder, TreeConfig, DEFAULT_MAX_DEPTH};

/// Client-side knobs, all optional when deserializing
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Number of comment levels that accept replies
    pub max_depth: usize,
    pub comment_order: CommentOrder,
    pub rank_mode: RankMode,
}

impl Default for ClientConfig {
    fn default() -> ClientConfig {
        ClientConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            comment_order: CommentOrder::default(),
            rank_mode: RankMode::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(s: &str) -> anyhow::Result<ClientConfig> {
        serde_json::from_str(s).context("parsing client configuration")
    }

    pub fn tree(&self) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            order: self.comment_order,
        }
    }
}
