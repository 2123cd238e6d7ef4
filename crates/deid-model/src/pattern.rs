//! Path templates used for rule matching.
//!
//! # Syntax
//!
//! Segments are separated by `.`; the empty string is the root pattern.
//!
//! ```text
//! segment ::= name [ ":" TYPE ] [ "[" ( DIGITS | "*" ) "]" ]
//! name    ::= IDENT | "*"
//! ```
//!
//! | Pattern                   | Matches                                             |
//! |---------------------------|-----------------------------------------------------|
//! | `id`                      | root field `id`                                     |
//! | `name.family`             | `family` of every element of `name`                 |
//! | `name[0].family`          | `family` of the first `name` only                   |
//! | `*.id`                    | `id` one level below any root field                 |
//! | `value:Quantity`          | `value` when its runtime type tag is `Quantity`     |
//! | `*:Identifier.value`      | `value` of any root field typed `Identifier`        |
//!
//! There is no "any depth" wildcard: a pattern matches only paths of exactly
//! its own length.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PatternSyntaxError;
use crate::path::{Path, PathSegment};

/// Name part of a segment matcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameMatcher {
    Literal(String),
    /// `*`
    Any,
}

/// Index part of a segment matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexMatcher {
    /// No constraint (also written `[*]`).
    #[default]
    Any,
    Exact(usize),
}

/// Matches a single [`PathSegment`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentMatcher {
    pub name: NameMatcher,
    pub type_tag: Option<String>,
    pub index: IndexMatcher,
}

impl SegmentMatcher {
    pub fn literal(name: impl Into<String>) -> Self {
        Self {
            name: NameMatcher::Literal(name.into()),
            type_tag: None,
            index: IndexMatcher::Any,
        }
    }

    pub fn any() -> Self {
        Self {
            name: NameMatcher::Any,
            type_tag: None,
            index: IndexMatcher::Any,
        }
    }

    /// Restrict the matcher to nodes whose runtime type tag equals `type_tag`.
    #[must_use]
    pub fn typed(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    #[must_use]
    pub fn at_index(mut self, index: usize) -> Self {
        self.index = IndexMatcher::Exact(index);
        self
    }

    pub fn matches(&self, segment: &PathSegment) -> bool {
        let name_ok = match &self.name {
            NameMatcher::Literal(name) => *name == segment.name,
            NameMatcher::Any => true,
        };
        let type_ok = match &self.type_tag {
            Some(expected) => segment.type_tag.as_deref() == Some(expected.as_str()),
            None => true,
        };
        let index_ok = match self.index {
            IndexMatcher::Any => true,
            IndexMatcher::Exact(n) => segment.index == Some(n),
        };
        name_ok && type_ok && index_ok
    }
}

impl fmt::Display for SegmentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            NameMatcher::Literal(name) => f.write_str(name)?,
            NameMatcher::Any => f.write_str("*")?,
        }
        if let Some(type_tag) = &self.type_tag {
            write!(f, ":{type_tag}")?;
        }
        if let IndexMatcher::Exact(n) = self.index {
            write!(f, "[{n}]")?;
        }
        Ok(())
    }
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    segments: Vec<SegmentMatcher>,
}

impl Pattern {
    /// The empty pattern. Matches only the document root.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn from_segments(segments: Vec<SegmentMatcher>) -> Self {
        Self { segments }
    }

    /// Parse a pattern string.
    ///
    /// # Errors
    ///
    /// Returns [`PatternSyntaxError`] for empty segments, characters outside
    /// the identifier set, empty type constraints and malformed indices.
    pub fn parse(source: &str) -> Result<Self, PatternSyntaxError> {
        if source.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        let mut offset = 0;
        for part in source.split('.') {
            segments.push(parse_segment(source, part, offset)?);
            offset += part.len() + 1;
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[SegmentMatcher] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Structural match: equal length and every segment matcher accepts the
    /// corresponding path segment.
    pub fn matches(&self, path: &Path) -> bool {
        self.segments.len() == path.len()
            && self
                .segments
                .iter()
                .zip(path.segments())
                .all(|(matcher, segment)| matcher.matches(segment))
    }
}

/// Free-function form of [`Pattern::matches`].
pub fn matches(pattern: &Pattern, path: &Path) -> bool {
    pattern.matches(path)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '$')
}

fn parse_segment(
    source: &str,
    part: &str,
    base: usize,
) -> Result<SegmentMatcher, PatternSyntaxError> {
    if part.is_empty() {
        return Err(PatternSyntaxError::new(source, base, "empty segment"));
    }

    let name_end = part
        .find(|c: char| !(is_ident_char(c) || c == '*'))
        .unwrap_or(part.len());
    let name_text = &part[..name_end];
    let name = match name_text {
        "" => {
            return Err(PatternSyntaxError::new(
                source,
                base,
                "expected a field name or `*`",
            ));
        }
        "*" => NameMatcher::Any,
        text if text.contains('*') => {
            return Err(PatternSyntaxError::new(
                source,
                base,
                "`*` must stand alone as a segment name",
            ));
        }
        text => NameMatcher::Literal(text.to_string()),
    };

    let mut rest = &part[name_end..];
    let mut pos = base + name_end;

    let mut type_tag = None;
    if let Some(after) = rest.strip_prefix(':') {
        let type_end = after.find(|c: char| !is_ident_char(c)).unwrap_or(after.len());
        if type_end == 0 {
            return Err(PatternSyntaxError::new(source, pos + 1, "empty type"));
        }
        type_tag = Some(after[..type_end].to_string());
        rest = &after[type_end..];
        pos += 1 + type_end;
    }

    let mut index = IndexMatcher::Any;
    if let Some(after) = rest.strip_prefix('[') {
        let Some(close) = after.find(']') else {
            return Err(PatternSyntaxError::new(source, pos, "unterminated index"));
        };
        let inner = &after[..close];
        index = match inner {
            "*" => IndexMatcher::Any,
            digits if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
                let n = digits.parse::<usize>().map_err(|_| {
                    PatternSyntaxError::new(source, pos + 1, "index out of range")
                })?;
                IndexMatcher::Exact(n)
            }
            _ => {
                return Err(PatternSyntaxError::new(
                    source,
                    pos + 1,
                    "index must be digits or `*`",
                ));
            }
        };
        rest = &after[close + 1..];
        pos += close + 2;
    }

    if let Some(c) = rest.chars().next() {
        return Err(PatternSyntaxError::new(
            source,
            pos,
            format!("unexpected character {c:?}"),
        ));
    }

    Ok(SegmentMatcher {
        name,
        type_tag,
        index,
    })
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = PatternSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Pattern {
    type Error = PatternSyntaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.to_string()
    }
}
