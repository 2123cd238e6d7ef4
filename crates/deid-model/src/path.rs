//! Concrete structural addresses produced while walking a document.
//!
//! A [`Path`] always starts at the document root. The root itself has the
//! empty path; every step down adds one [`PathSegment`] naming the field, the
//! repetition index (for repeated fields) and the runtime type tag of the node
//! that was reached.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step from a composite node into one of its fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSegment {
    /// Field name as exposed by the document model.
    pub name: String,
    /// Position inside a repeated field, `None` for single-valued fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Runtime type tag of the node reached by this segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
}

impl PathSegment {
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
            type_tag: None,
        }
    }

    pub fn element(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
            type_tag: None,
        }
    }

    /// Attach the runtime type tag of the visited node.
    #[must_use]
    pub fn with_type(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(index) = self.index {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}

/// Ordered list of segments from the root to a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true for the path of the document root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Field names only, without indices or type tags.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.segments.iter().map(|s| s.name.as_str())
    }

    /// Returns a new path extended by one segment.
    #[must_use]
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    /// Push a segment in place. Used by the traversal stack.
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_path_displays_marker() {
        assert_eq!(Path::root().to_string(), "<root>");
        assert!(Path::root().is_root());
    }

    #[test]
    fn display_includes_indices_but_not_types() {
        let path = Path::root()
            .child(PathSegment::element("contact", 0).with_type("object"))
            .child(PathSegment::field("id").with_type("string"));
        assert_eq!(path.to_string(), "contact[0].id");
        assert_eq!(path.names().collect::<Vec<_>>(), vec!["contact", "id"]);
    }

    #[test]
    fn equality_is_segment_wise() {
        let a = Path::from_segments(vec![PathSegment::element("name", 1)]);
        let b = Path::from_segments(vec![PathSegment::element("name", 1)]);
        let c = Path::from_segments(vec![PathSegment::element("name", 2)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn push_and_pop_restore_path() {
        let mut path = Path::root();
        path.push(PathSegment::field("id"));
        assert_eq!(path.len(), 1);
        assert_eq!(path.pop().map(|s| s.name), Some("id".to_string()));
        assert!(path.is_root());
    }
}
