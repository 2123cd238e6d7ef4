//! Per-run state handed to handlers.
//!
//! A [`ConsistencyContext`] is created at the start of every
//! [`deidentify`](crate::deidentify) call and dropped at its end. It lets a
//! handler map equal inputs anywhere in one document to the same replacement
//! without that mapping leaking into the next document.

use std::collections::HashMap;

use deid_model::{DocumentNode, LeafValue};

/// Namespaced value mappings and counters for one run.
#[derive(Debug, Default)]
pub struct ConsistencyContext {
    mappings: HashMap<String, HashMap<String, LeafValue>>,
    sequences: HashMap<String, u64>,
}

impl ConsistencyContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<&LeafValue> {
        self.mappings.get(namespace)?.get(key)
    }

    /// Store a mapping, returning the previous value for the key.
    pub fn insert(
        &mut self,
        namespace: &str,
        key: impl Into<String>,
        value: LeafValue,
    ) -> Option<LeafValue> {
        self.mappings
            .entry(namespace.to_string())
            .or_default()
            .insert(key.into(), value)
    }

    /// Return the mapping for `key`, computing and storing it on first use.
    pub fn get_or_insert_with(
        &mut self,
        namespace: &str,
        key: &str,
        make: impl FnOnce() -> LeafValue,
    ) -> LeafValue {
        self.mappings
            .entry(namespace.to_string())
            .or_default()
            .entry(key.to_string())
            .or_insert_with(make)
            .clone()
    }

    /// Next value of a 1-based counter, independent per namespace.
    pub fn next_sequence(&mut self, namespace: &str) -> u64 {
        let counter = self.sequences.entry(namespace.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Total number of stored mappings across namespaces.
    pub fn len(&self) -> usize {
        self.mappings.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What a handler may see besides the value it is replacing.
pub struct HandlerContext<'a, N> {
    root: &'a N,
    consistency: &'a mut ConsistencyContext,
}

impl<'a, N: DocumentNode> HandlerContext<'a, N> {
    pub fn new(root: &'a N, consistency: &'a mut ConsistencyContext) -> Self {
        Self { root, consistency }
    }

    /// The input document as passed to `deidentify`, before any replacement.
    pub fn root(&self) -> &N {
        self.root
    }

    pub fn consistency(&mut self) -> &mut ConsistencyContext {
        self.consistency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_insert_with_is_stable() {
        let mut ctx = ConsistencyContext::new();
        let first = ctx.get_or_insert_with("id", "abc", || LeafValue::text("P-1"));
        let again = ctx.get_or_insert_with("id", "abc", || LeafValue::text("P-2"));
        assert_eq!(first, again);
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn namespaces_are_independent() {
        let mut ctx = ConsistencyContext::new();
        ctx.insert("a", "k", LeafValue::Integer(1));
        assert!(ctx.get("b", "k").is_none());
        assert_eq!(ctx.next_sequence("a"), 1);
        assert_eq!(ctx.next_sequence("a"), 2);
        assert_eq!(ctx.next_sequence("b"), 1);
    }
}
