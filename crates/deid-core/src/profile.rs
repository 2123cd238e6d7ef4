//! Rules, profiles and the builder that assembles them.
//!
//! Registration is the only mutable phase: a [`ProfileBuilder`] accumulates
//! rules and [`ProfileBuilder::build`] consumes it into a frozen [`Profile`].
//! A profile is `Send + Sync`, cheap to clone, and reused across any number
//! of documents.
//!
//! # Example
//!
//! ```ignore
//! let profile = Profile::builder()
//!     .register("id", HashHandler::new())?
//!     .register("name.family", RedactHandler::new())?
//!     .build();
//! ```

use std::fmt;
use std::sync::Arc;

use deid_model::{DocumentNode, Path, Pattern, PatternSyntaxError};

use crate::handler::Handler;

/// A pattern paired with the handler applied where it matches.
pub struct Rule<N: DocumentNode> {
    pattern: Pattern,
    handler: Arc<dyn Handler<N>>,
}

impl<N: DocumentNode> Rule<N> {
    pub fn new(pattern: Pattern, handler: Arc<dyn Handler<N>>) -> Self {
        Self { pattern, handler }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn handler(&self) -> &dyn Handler<N> {
        self.handler.as_ref()
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.pattern.matches(path)
    }
}

impl<N: DocumentNode> Clone for Rule<N> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<N: DocumentNode> fmt::Debug for Rule<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern.to_string())
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// Immutable, ordered set of rules.
///
/// When several rules match the same path, the one registered first wins.
pub struct Profile<N: DocumentNode> {
    name: Option<String>,
    rules: Arc<[Rule<N>]>,
}

impl<N: DocumentNode> Profile<N> {
    pub fn builder() -> ProfileBuilder<N> {
        ProfileBuilder::new()
    }

    /// A profile without rules. De-identifying with it changes nothing.
    pub fn empty() -> Self {
        Self {
            name: None,
            rules: Arc::from(Vec::new()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn rules(&self) -> &[Rule<N>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule, in registration order, whose pattern matches `path`.
    pub fn first_match(&self, path: &Path) -> Option<&Rule<N>> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// Like [`first_match`](Self::first_match), also returning the rule's
    /// position in the profile.
    pub fn first_match_index(&self, path: &Path) -> Option<(usize, &Rule<N>)> {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(path))
    }

    /// Every matching rule, in registration order.
    pub fn matching<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Rule<N>> + 'a {
        self.rules.iter().filter(move |rule| rule.matches(path))
    }

    /// Concatenate two profiles: all of `self`'s rules, then all of `other`'s.
    ///
    /// The result keeps `self`'s name, or `other`'s when `self` is unnamed.
    #[must_use]
    pub fn merge(&self, other: &Profile<N>) -> Profile<N> {
        let rules: Vec<Rule<N>> = self.rules.iter().chain(other.rules.iter()).cloned().collect();
        Profile {
            name: self.name.clone().or_else(|| other.name.clone()),
            rules: Arc::from(rules),
        }
    }

    /// Fold [`merge`](Self::merge) over `profiles`, left to right.
    pub fn merge_all<'a>(profiles: impl IntoIterator<Item = &'a Profile<N>>) -> Profile<N>
    where
        N: 'a,
    {
        profiles
            .into_iter()
            .fold(Profile::empty(), |acc, next| acc.merge(next))
    }
}

/// Free-function form of [`Profile::merge`].
pub fn merge<N: DocumentNode>(first: &Profile<N>, second: &Profile<N>) -> Profile<N> {
    first.merge(second)
}

impl<N: DocumentNode> Clone for Profile<N> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            rules: Arc::clone(&self.rules),
        }
    }
}

impl<N: DocumentNode> fmt::Debug for Profile<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("rules", &self.rules)
            .finish()
    }
}

/// Accumulates rules for a [`Profile`].
///
/// `build` consumes the builder; build once and reuse the profile.
pub struct ProfileBuilder<N: DocumentNode> {
    name: Option<String>,
    rules: Vec<Rule<N>>,
}

impl<N: DocumentNode> ProfileBuilder<N> {
    pub fn new() -> Self {
        Self {
            name: None,
            rules: Vec::new(),
        }
    }

    /// Start a builder for a named profile.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            rules: Vec::new(),
        }
    }

    /// Parse `pattern` and append a rule.
    ///
    /// # Errors
    ///
    /// Returns [`PatternSyntaxError`] when the pattern is malformed; nothing
    /// is registered in that case.
    pub fn register(
        self,
        pattern: &str,
        handler: impl Handler<N> + 'static,
    ) -> Result<Self, PatternSyntaxError> {
        let pattern = Pattern::parse(pattern)?;
        Ok(self.register_pattern(pattern, handler))
    }

    /// Append a rule for an already parsed pattern.
    #[must_use]
    pub fn register_pattern(self, pattern: Pattern, handler: impl Handler<N> + 'static) -> Self {
        self.register_shared(pattern, Arc::new(handler))
    }

    /// Append a rule whose handler is shared with other rules or profiles.
    #[must_use]
    pub fn register_shared(mut self, pattern: Pattern, handler: Arc<dyn Handler<N>>) -> Self {
        self.rules.push(Rule::new(pattern, handler));
        self
    }

    /// Append all rules of an existing profile, after those already added.
    #[must_use]
    pub fn extend(mut self, profile: &Profile<N>) -> Self {
        self.rules.extend(profile.rules().iter().cloned());
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Freeze the accumulated rules.
    pub fn build(self) -> Profile<N> {
        Profile {
            name: self.name,
            rules: Arc::from(self.rules),
        }
    }
}

impl<N: DocumentNode> Default for ProfileBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}
