use std::path::PathBuf;

use deid_model::PatternSyntaxError;
use thiserror::Error;

/// Failures raised by the built-in handlers.
///
/// Messages name value kinds and sizes, never the values themselves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("{handler} applies to leaf values, found {type_tag} node")]
    NotALeaf {
        handler: &'static str,
        type_tag: String,
    },

    #[error("{handler} expects text, found {kind}")]
    NotText {
        handler: &'static str,
        kind: &'static str,
    },

    #[error("unrecognized date format ({len} characters)")]
    InvalidDate { len: usize },
}

/// A rule entry that names a handler but does not describe a usable one.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule has no `pattern`")]
    MissingPattern,

    #[error("`pattern` must be a string, found {found}")]
    PatternNotText { found: &'static str },

    #[error(transparent)]
    Handler(#[from] toml::de::Error),

    #[error("unknown parameter `{key}` for handler {handler}")]
    UnknownParameter { handler: &'static str, key: String },

    #[error("hash length must be at least 1")]
    ZeroHashLength,

    #[error("pseudonym prefix must not be empty")]
    EmptyPrefix,
}

/// Failures while loading a profile definition.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read profile config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profile config{}: {source}", path_suffix(.path.as_ref()))]
    Toml {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },

    #[error("rule {index} has an invalid pattern: {source}")]
    Pattern {
        index: usize,
        #[source]
        source: PatternSyntaxError,
    },

    #[error("rule {index}: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: RuleError,
    },
}

fn path_suffix(path: Option<&PathBuf>) -> String {
    path.map(|p| format!(" {}", p.display())).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ConfigError>;
