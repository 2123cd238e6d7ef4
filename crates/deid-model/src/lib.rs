//! Structural model for rule-based de-identification.
//!
//! - **path**: concrete addresses of values inside one traversed document
//! - **pattern**: path templates with wildcards, index and type constraints
//! - **node**: the capability interface a document model implements
//! - **json**: that interface for `serde_json::Value`

pub mod error;
pub mod json;
pub mod node;
pub mod path;
pub mod pattern;

pub use error::{NodeError, PatternSyntaxError};
pub use node::{Children, DocumentNode, LeafValue};
pub use path::{Path, PathSegment};
pub use pattern::{IndexMatcher, NameMatcher, Pattern, SegmentMatcher, matches};
