//! Shared setup for the cross-crate tests

use std::sync::Arc;

use agora_client::api::{Author, CommentId, CommentRecord, CommunityId, ThreadId, UserId};
use agora_mock_server::MockServer;
use chrono::{Duration, Utc};

/// Prints logs when `RUST_LOG` is set
pub fn init_logs() {
    if std::env::var_os("RUST_LOG").is_some() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }
}

pub struct Forum {
    pub server: Arc<MockServer>,
    pub alice: UserId,
    pub bob: UserId,
    pub thread: ThreadId,
}

impl Forum {
    pub fn new() -> Forum {
        init_logs();
        let server = Arc::new(MockServer::new());
        let alice = server.add_user("alice");
        let bob = server.add_user("bob");
        let thread = server.add_thread(alice, CommunityId::stub(), "first thread");
        Forum {
            server,
            alice,
            bob,
            thread,
        }
    }

    /// Stores a comment by alice posted `age_secs` ago
    pub fn comment(&self, parent_id: Option<CommentId>, age_secs: i64) -> CommentId {
        let mut c = CommentRecord::now(
            Author::new(self.alice, String::from("alice")),
            self.thread,
            parent_id,
            lipsum::lipsum_words(8),
        );
        c.date = Utc::now() - Duration::seconds(age_secs);
        let id = c.id;
        self.server.add_comment(c);
        id
    }
}

impl Default for Forum {
    fn default() -> Forum {
        Forum::new()
    }
}
