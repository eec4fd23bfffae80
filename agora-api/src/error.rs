use anyhow::{anyhow, Context};
use serde_json::json;

use crate::{CommentId, Target, UserId};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{count} votes by {voter:?} on {target:?}, only the most recent one was kept")]
    DataIntegrity {
        voter: UserId,
        target: Target,
        count: usize,
    },

    #[error("Comment identifier used more than once {0:?}")]
    DuplicateIdentifier(CommentId),

    #[error("Comment is its own ancestor {0:?}")]
    CyclicReference(CommentId),

    #[error("Parent comment is not in the tree {0:?}")]
    ParentNotFound(CommentId),

    #[error("Comment {comment:?} answers {parent:?} from another thread")]
    ThreadMismatch {
        comment: CommentId,
        parent: CommentId,
    },

    #[error("Authentication required")]
    AuthRequired,

    #[error("A mutation is already in flight for {0:?}")]
    MutationInFlight(Target),

    #[error("Result discarded, the view or session that requested it is gone")]
    Discarded,

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Failure reported by the remote store
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum RemoteError {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found")]
    NotFound,

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),
}

impl RemoteError {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            RemoteError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RemoteError::Network(_) => StatusCode::BAD_GATEWAY,
            RemoteError::PermissionDenied => StatusCode::FORBIDDEN,
            RemoteError::Conflict(_) => StatusCode::CONFLICT,
            RemoteError::NotFound => StatusCode::NOT_FOUND,
            RemoteError::NullByteInString(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            RemoteError::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            RemoteError::Network(msg) => json!({
                "message": msg,
                "type": "network",
            }),
            RemoteError::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            RemoteError::Conflict(msg) => json!({
                "message": msg,
                "type": "conflict",
            }),
            RemoteError::NotFound => json!({
                "message": "not found",
                "type": "not-found",
            }),
            RemoteError::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
        })
        .expect("serializing json value")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<RemoteError> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let message = || {
            String::from(
                data.get("message")
                    .and_then(|msg| msg.as_str())
                    .unwrap_or(""),
            )
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => RemoteError::Unknown(message()),
                "network" => RemoteError::Network(message()),
                "permission-denied" => RemoteError::PermissionDenied,
                "conflict" => RemoteError::Conflict(message()),
                "not-found" => RemoteError::NotFound,
                "null-byte" => RemoteError::NullByteInString(String::from(
                    data.get("string").and_then(|s| s.as_str()).ok_or_else(|| {
                        anyhow!("error is a null-byte-in-string without a string")
                    })?,
                )),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }

    /// Classifies a failed response from the backend
    ///
    /// The body is trusted when it parses, the status code is used otherwise.
    pub fn from_response(status: http::StatusCode, body: &[u8]) -> RemoteError {
        use http::StatusCode;
        if let Ok(err) = RemoteError::parse(body) {
            return err;
        }
        let body = String::from_utf8_lossy(body).into_owned();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::PermissionDenied,
            StatusCode::NOT_FOUND => RemoteError::NotFound,
            StatusCode::CONFLICT => RemoteError::Conflict(body),
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => RemoteError::Network(body),
            _ => RemoteError::Unknown(body),
        }
    }
}
