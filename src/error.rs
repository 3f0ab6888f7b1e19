use std::path::PathBuf;

use thiserror::Error;

use crate::ir::MemberId;

/// Failures at the edges of the crate: reading member snapshots and
/// recording new relationships. Grouping and layout never fail.
#[derive(Debug, Error)]
pub enum GenogramError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid JSON5: {0}")]
    Json5(#[from] json5::Error),
    #[error("expected an array or an object of member documents")]
    NotAnArray,
    #[error("unknown member `{0}`")]
    UnknownMember(MemberId),
    #[error("member `{0}` cannot be related to itself")]
    SelfLink(MemberId),
}

pub type Result<T> = std::result::Result<T, GenogramError>;
