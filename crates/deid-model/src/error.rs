use thiserror::Error;

/// A pattern string that could not be parsed.
///
/// Raised at registration time, never during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pattern {source_text:?} at offset {offset}: {message}")]
pub struct PatternSyntaxError {
    /// The full pattern text as supplied by the caller.
    pub source_text: String,
    /// Byte offset of the offending character or segment.
    pub offset: usize,
    pub message: String,
}

impl PatternSyntaxError {
    pub(crate) fn new(source: &str, offset: usize, message: impl Into<String>) -> Self {
        Self {
            source_text: source.to_string(),
            offset,
            message: message.into(),
        }
    }
}

/// The document model refused a read or a replacement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("field {field:?} does not exist")]
    MissingField { field: String },

    #[error("index {index} out of range for field {field:?} (len {len})")]
    IndexOutOfRange {
        field: String,
        index: usize,
        len: usize,
    },

    #[error("field {field:?} is repeated and needs an index")]
    IndexRequired { field: String },

    #[error("field {field:?} is not repeated")]
    NotRepeated { field: String },

    #[error("node of type {type_tag} is not a leaf")]
    NotALeaf { type_tag: String },

    #[error("node of type {type_tag} has no fields")]
    NotAComposite { type_tag: String },

    #[error("{kind} value cannot be stored: {message}")]
    UnrepresentableValue { kind: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, NodeError>;
