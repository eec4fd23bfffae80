pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<chrono::Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

mod comment;
pub use comment::{Author, CommentId, CommentRecord};

mod error;
pub use error::{Error, RemoteError};

mod rank;
pub use rank::RankMode;

mod store;
pub use store::Store;

mod thread;
pub use thread::{CommunityId, ThreadId, ThreadScope, ThreadSummary};

mod user;
pub use user::UserId;

mod vote;
pub use vote::{vote_value, Target, TargetKind, VoteChange, VoteDirection, VoteId, VoteRecord};

/// Checks that a string can be stored by the remote backend
///
/// NUL bytes are refused by the underlying database, so they are refused here too
/// so that the client and the store agree on what is representable.
pub fn validate_string(s: &str) -> Result<(), RemoteError> {
    match s.contains('\0') {
        true => Err(RemoteError::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}
