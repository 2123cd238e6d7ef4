//! Recursive traversal that applies a profile to one document.
//!
//! # Strategy
//!
//! The input document is borrowed and never mutated. The walk clones only
//! the nodes a handler receives and the ancestors that must be rebuilt
//! around a replacement; the returned document is a new value. When any step
//! fails the caller gets the error and no document.
//!
//! # Order
//!
//! Depth-first, pre-order. At every node (root included) the first rule in
//! registration order whose pattern matches the current path is applied.
//! If the result is a composite, its fields are visited in source order and
//! repeated fields element by element. Handler invocation order is therefore
//! a pure function of the profile and the document.

use std::borrow::Cow;

use deid_model::{DocumentNode, Path, PathSegment};
use serde::Serialize;
use tracing::{debug, debug_span, trace};

use crate::context::{ConsistencyContext, HandlerContext};
use crate::error::{DeidError, Result};
use crate::profile::Profile;

/// Counts collected during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeidReport {
    /// Nodes whose path was checked against the profile.
    pub nodes_visited: usize,
    /// Handler invocations.
    pub replacements: usize,
    /// One entry per rule, in profile order.
    pub rule_hits: Vec<RuleHit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleHit {
    pub pattern: String,
    pub handler: String,
    pub hits: usize,
}

impl DeidReport {
    fn for_profile<N: DocumentNode>(profile: &Profile<N>) -> Self {
        Self {
            nodes_visited: 0,
            replacements: 0,
            rule_hits: profile
                .rules()
                .iter()
                .map(|rule| RuleHit {
                    pattern: rule.pattern().to_string(),
                    handler: rule.handler().name().to_string(),
                    hits: 0,
                })
                .collect(),
        }
    }

    /// Rules that never matched during the run.
    pub fn unused_rules(&self) -> impl Iterator<Item = &RuleHit> + '_ {
        self.rule_hits.iter().filter(|hit| hit.hits == 0)
    }
}

/// Applies a [`Profile`] to documents.
///
/// Holds no per-document state; one instance can serve many documents,
/// also from several threads at once.
pub struct Deidentifier<N: DocumentNode> {
    profile: Profile<N>,
}

impl<N: DocumentNode> Deidentifier<N> {
    pub fn new(profile: Profile<N>) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &Profile<N> {
        &self.profile
    }

    /// De-identify `root`, returning the transformed copy.
    ///
    /// # Errors
    ///
    /// - [`DeidError::Handler`] when a handler fails
    /// - [`DeidError::UnsupportedNode`] when a composite cannot be enumerated
    /// - [`DeidError::Node`] when the document refuses a replacement
    pub fn deidentify(&self, root: &N) -> Result<N> {
        self.deidentify_with_report(root).map(|(document, _)| document)
    }

    /// Like [`deidentify`](Self::deidentify), also returning run counters.
    pub fn deidentify_with_report(&self, root: &N) -> Result<(N, DeidReport)> {
        let span = debug_span!(
            "deidentify",
            profile = self.profile.name().unwrap_or("<unnamed>"),
            rules = self.profile.len()
        );
        let _guard = span.enter();

        let mut walk = Walk {
            profile: &self.profile,
            root,
            consistency: ConsistencyContext::new(),
            path: Path::root(),
            report: DeidReport::for_profile(&self.profile),
        };
        let rebuilt = walk.visit(root)?;
        let report = walk.report;
        debug!(
            nodes_visited = report.nodes_visited,
            replacements = report.replacements,
            "de-identification finished"
        );
        let document = rebuilt.unwrap_or_else(|| root.clone());
        Ok((document, report))
    }
}

impl<N: DocumentNode> Clone for Deidentifier<N> {
    fn clone(&self) -> Self {
        Self {
            profile: self.profile.clone(),
        }
    }
}

/// Apply `profile` to `root`. See [`Deidentifier::deidentify`].
pub fn deidentify<N: DocumentNode>(profile: &Profile<N>, root: &N) -> Result<N> {
    Deidentifier::new(profile.clone()).deidentify(root)
}

/// State of one run: the path stack, the consistency context and counters.
struct Walk<'p, 'r, N: DocumentNode> {
    profile: &'p Profile<N>,
    root: &'r N,
    consistency: ConsistencyContext,
    path: Path,
    report: DeidReport,
}

impl<N: DocumentNode> Walk<'_, '_, N> {
    /// Visit `node` at the current path. `None` means the subtree is
    /// unchanged.
    fn visit(&mut self, node: &N) -> Result<Option<N>> {
        self.report.nodes_visited += 1;

        let current = match self.apply_rule(node)? {
            Some(replaced) => Cow::Owned(replaced),
            None => Cow::Borrowed(node),
        };
        let changed = matches!(current, Cow::Owned(_));

        if current.is_leaf() {
            return Ok(changed.then(|| current.into_owned()));
        }

        let replacements = self.visit_children(&current)?;
        if replacements.is_empty() {
            return Ok(changed.then(|| current.into_owned()));
        }

        let mut rebuilt = current.into_owned();
        for (field, index, child) in replacements {
            rebuilt = rebuilt
                .with_child_replaced(&field, index, child)
                .map_err(|source| DeidError::Node {
                    path: self.path.child(segment(&field, index)),
                    source,
                })?;
        }
        Ok(Some(rebuilt))
    }

    fn visit_children(&mut self, node: &N) -> Result<Vec<(String, Option<usize>, N)>> {
        let Some(fields) = node.named_children() else {
            return Err(DeidError::UnsupportedNode {
                path: self.path.clone(),
                type_tag: node.type_tag().into_owned(),
            });
        };

        let mut replacements = Vec::new();
        for (name, children) in fields {
            let repeated = children.is_repeated();
            for (i, child) in children.elements().iter().enumerate() {
                let index = repeated.then_some(i);
                self.path
                    .push(segment(&name, index).with_type(child.type_tag().into_owned()));
                let visited = self.visit(child);
                self.path.pop();
                if let Some(replaced) = visited? {
                    replacements.push((name.clone(), index, replaced));
                }
            }
        }
        Ok(replacements)
    }

    /// Run the first matching handler on a copy of `node`.
    fn apply_rule(&mut self, node: &N) -> Result<Option<N>> {
        let profile = self.profile;
        let Some((rule_index, rule)) = profile.first_match_index(&self.path) else {
            return Ok(None);
        };
        let handler = rule.handler();
        trace!(
            path = %self.path,
            pattern = %rule.pattern(),
            handler = handler.name(),
            "applying rule"
        );

        let mut ctx = HandlerContext::new(self.root, &mut self.consistency);
        let replaced = handler
            .handle(&self.path, node.clone(), &mut ctx)
            .map_err(|source| DeidError::Handler {
                path: self.path.clone(),
                handler: handler.name().to_string(),
                source,
            })?;

        self.report.replacements += 1;
        if let Some(hit) = self.report.rule_hits.get_mut(rule_index) {
            hit.hits += 1;
        }
        Ok(Some(replaced))
    }
}

fn segment(name: &str, index: Option<usize>) -> PathSegment {
    match index {
        Some(i) => PathSegment::element(name, i),
        None => PathSegment::field(name),
    }
}

