use deid_model::{NodeError, Path, PatternSyntaxError};
use thiserror::Error;

use crate::handler::HandlerFailure;

/// Errors surfaced by profile construction and [`deidentify`](crate::deidentify).
///
/// Every traversal error aborts the whole run; no partial document is
/// returned.
#[derive(Debug, Error)]
pub enum DeidError {
    #[error(transparent)]
    PatternSyntax(#[from] PatternSyntaxError),

    #[error("cannot enumerate fields of {type_tag} node at {path}")]
    UnsupportedNode { path: Path, type_tag: String },

    #[error("handler {handler} failed at {path}: {source}")]
    Handler {
        path: Path,
        handler: String,
        #[source]
        source: HandlerFailure,
    },

    #[error("document rejected replacement at {path}: {source}")]
    Node {
        path: Path,
        #[source]
        source: NodeError,
    },
}

impl DeidError {
    /// Path at which a traversal error occurred.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::PatternSyntax(_) => None,
            Self::UnsupportedNode { path, .. }
            | Self::Handler { path, .. }
            | Self::Node { path, .. } => Some(path),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeidError>;
