use deid_core::{Handler, HandlerContext, HandlerFailure};
use deid_model::{DocumentNode, LeafValue, Path};

use crate::error::ValueError;

/// Placeholder written by [`RedactHandler::new`].
pub const REDACTED: &str = "[REDACTED]";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Redaction {
    Replace(String),
    Null,
}

/// Replaces a leaf with fixed text, or with null.
///
/// With a text replacement, null leaves are left as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactHandler {
    redaction: Redaction,
}

impl RedactHandler {
    pub fn new() -> Self {
        Self::with_replacement(REDACTED)
    }

    pub fn with_replacement(replacement: impl Into<String>) -> Self {
        Self {
            redaction: Redaction::Replace(replacement.into()),
        }
    }

    /// Blank every matched leaf.
    pub fn null() -> Self {
        Self {
            redaction: Redaction::Null,
        }
    }
}

impl Default for RedactHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: DocumentNode> Handler<N> for RedactHandler {
    fn name(&self) -> &str {
        match self.redaction {
            Redaction::Replace(_) => "redact",
            Redaction::Null => "null",
        }
    }

    fn handle(
        &self,
        _path: &Path,
        node: N,
        _ctx: &mut HandlerContext<'_, N>,
    ) -> Result<N, HandlerFailure> {
        let value = node.leaf_value().ok_or_else(|| ValueError::NotALeaf {
            handler: "redact",
            type_tag: node.type_tag().into_owned(),
        })?;
        let replacement = match &self.redaction {
            Redaction::Replace(_) if value.is_null() => return Ok(node),
            Redaction::Replace(text) => LeafValue::Text(text.clone()),
            Redaction::Null => LeafValue::Null,
        };
        Ok(node.with_leaf_value(replacement)?)
    }
}

/// Hands the matched node back unchanged.
///
/// Registered ahead of broader rules to exempt specific paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepHandler;

impl<N: DocumentNode> Handler<N> for KeepHandler {
    fn name(&self) -> &str {
        "keep"
    }

    fn handle(
        &self,
        _path: &Path,
        node: N,
        _ctx: &mut HandlerContext<'_, N>,
    ) -> Result<N, HandlerFailure> {
        Ok(node)
    }
}
