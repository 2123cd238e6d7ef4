//! Capability interface between the engine and a concrete document model.
//!
//! The engine never sees concrete resource types. Everything it needs is
//! expressed by [`DocumentNode`]: read a runtime type tag, enumerate named
//! fields (single or repeated), read and replace leaf values, and write a
//! rebuilt child back into its parent.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NodeError;

/// Primitive value held by a leaf node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeafValue {
    Null,
    Boolean(bool),
    Integer(i64),
    /// Integers above `i64::MAX`.
    Unsigned(u64),
    Decimal(f64),
    Text(String),
}

impl LeafValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the value kind, safe to put in logs and errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) | Self::Unsigned(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
        }
    }
}

/// Canonical text form. Used as hash input and consistency key.
impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Unsigned(u) => write!(f, "{u}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for LeafValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for LeafValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for LeafValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u64> for LeafValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self::Unsigned(value), Self::Integer)
    }
}

impl From<bool> for LeafValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Content of one named field of a composite node.
#[derive(Debug)]
pub enum Children<'a, N> {
    Single(&'a N),
    Repeated(&'a [N]),
}

impl<'a, N> Children<'a, N> {
    pub fn is_repeated(&self) -> bool {
        matches!(self, Self::Repeated(_))
    }

    /// Elements in source order. A single field yields exactly one element.
    pub fn elements(&self) -> &'a [N] {
        match *self {
            Self::Single(node) => std::slice::from_ref(node),
            Self::Repeated(nodes) => nodes,
        }
    }
}

impl<N> Clone for Children<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for Children<'_, N> {}

/// Generic access to a node of some document model.
///
/// Implementations must be cheap to [`Clone`] relative to the document size
/// they represent, since the engine builds its output as a copy.
pub trait DocumentNode: Clone + Send + Sync + 'static {
    /// Runtime type discriminator, e.g. `Patient`, `Quantity` or `string`.
    fn type_tag(&self) -> Cow<'_, str>;

    /// True when the node has no fields and carries a [`LeafValue`].
    fn is_leaf(&self) -> bool;

    /// The primitive value of a leaf, `None` for composites.
    fn leaf_value(&self) -> Option<LeafValue>;

    /// Returns a copy of this leaf holding `value`.
    ///
    /// # Errors
    ///
    /// Fails when the node is not a leaf or cannot hold the value.
    fn with_leaf_value(&self, value: LeafValue) -> Result<Self, NodeError>;

    /// Named fields in source order, or `None` when this node cannot be
    /// enumerated generically.
    fn named_children(&self) -> Option<Vec<(String, Children<'_, Self>)>>;

    /// Replace one child, addressed by field name and (for repeated fields)
    /// element index.
    ///
    /// # Errors
    ///
    /// Fails when the field does not exist, the index is out of range, or the
    /// index does not agree with whether the field is repeated.
    fn with_child_replaced(
        self,
        field: &str,
        index: Option<usize>,
        child: Self,
    ) -> Result<Self, NodeError>;
}
