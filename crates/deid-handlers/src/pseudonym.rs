//! Sequential pseudonyms that stay stable within one document.

use deid_core::{Handler, HandlerContext, HandlerFailure};
use deid_model::{DocumentNode, LeafValue, Path};

use crate::error::ValueError;

/// Replaces each distinct leaf value with `{prefix}-{n}`.
///
/// `n` counts distinct values in traversal order, starting at 1. Values of
/// different kinds never share a pseudonym, so text `"1"` and integer `1`
/// stay distinct. Handlers sharing a namespace share one mapping, so the same
/// identifier maps to the same pseudonym wherever it appears in the document.
/// The mapping lives in the run's consistency context and is gone when the
/// run ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudonymHandler {
    prefix: String,
    namespace: String,
}

impl PseudonymHandler {
    /// Namespace defaults to the prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            namespace: format!("pseudonym:{prefix}"),
            prefix,
        }
    }

    #[must_use]
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = format!("pseudonym:{}", namespace.into());
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl<N: DocumentNode> Handler<N> for PseudonymHandler {
    fn name(&self) -> &str {
        "pseudonym"
    }

    fn handle(
        &self,
        _path: &Path,
        node: N,
        ctx: &mut HandlerContext<'_, N>,
    ) -> Result<N, HandlerFailure> {
        let value = node.leaf_value().ok_or_else(|| ValueError::NotALeaf {
            handler: "pseudonym",
            type_tag: node.type_tag().into_owned(),
        })?;
        if value.is_null() {
            return Ok(node);
        }

        let key = format!("{}:{value}", value.kind_name());
        let consistency = ctx.consistency();
        let pseudonym = match consistency.get(&self.namespace, &key) {
            Some(existing) => existing.clone(),
            None => {
                let n = consistency.next_sequence(&self.namespace);
                let fresh = LeafValue::Text(format!("{}-{n}", self.prefix));
                consistency.insert(&self.namespace, key, fresh.clone());
                fresh
            }
        };
        Ok(node.with_leaf_value(pseudonym)?)
    }
}
