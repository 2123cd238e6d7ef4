//! Transformation handlers and the adapters that build them from closures.
//!
//! A handler receives the path of the matched node, an owned copy of the
//! node, and a [`HandlerContext`]. It returns the replacement node or a
//! failure; it never touches the document itself.
//!
//! # Example
//!
//! ```ignore
//! use deid_core::handler::{leaf_fn, from_fn};
//! use deid_model::LeafValue;
//!
//! let upper = leaf_fn("upper", |_, value| {
//!     Ok(match value {
//!         LeafValue::Text(s) => LeafValue::Text(s.to_uppercase()),
//!         other => other,
//!     })
//! });
//! let drop_all = from_fn("drop", |_, _node: serde_json::Value| Ok(serde_json::Value::Null));
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use deid_model::{DocumentNode, LeafValue, Path};

use crate::context::HandlerContext;

/// Error returned by a handler. Strings and any `std::error::Error` convert
/// into it with `?` or `.into()`.
pub type HandlerFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A value transformation applied at matching paths.
///
/// Handlers are shared by every run that uses their profile, so any private
/// state must be synchronized by the handler itself.
pub trait Handler<N: DocumentNode>: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str {
        "handler"
    }

    /// Produce the replacement for `node`, found at `path`.
    ///
    /// # Errors
    ///
    /// Any failure aborts the current run and is reported with `path`.
    fn handle(
        &self,
        path: &Path,
        node: N,
        ctx: &mut HandlerContext<'_, N>,
    ) -> Result<N, HandlerFailure>;
}

impl<N: DocumentNode, H: Handler<N> + ?Sized> Handler<N> for Arc<H> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn handle(
        &self,
        path: &Path,
        node: N,
        ctx: &mut HandlerContext<'_, N>,
    ) -> Result<N, HandlerFailure> {
        (**self).handle(path, node, ctx)
    }
}

/// Handler built from `Fn(&Path, N) -> Result<N, _>`.
pub struct FnHandler<N, F> {
    name: String,
    f: F,
    _node: PhantomData<fn(N) -> N>,
}

/// Wrap a closure that ignores the handler context.
pub fn from_fn<N, F>(name: impl Into<String>, f: F) -> FnHandler<N, F>
where
    N: DocumentNode,
    F: Fn(&Path, N) -> Result<N, HandlerFailure> + Send + Sync,
{
    FnHandler {
        name: name.into(),
        f,
        _node: PhantomData,
    }
}

impl<N, F> Handler<N> for FnHandler<N, F>
where
    N: DocumentNode,
    F: Fn(&Path, N) -> Result<N, HandlerFailure> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(
        &self,
        path: &Path,
        node: N,
        _ctx: &mut HandlerContext<'_, N>,
    ) -> Result<N, HandlerFailure> {
        (self.f)(path, node)
    }
}

/// Handler built from a closure that also receives the [`HandlerContext`].
pub struct ContextFnHandler<N, F> {
    name: String,
    f: F,
    _node: PhantomData<fn(N) -> N>,
}

pub fn from_fn_with_context<N, F>(name: impl Into<String>, f: F) -> ContextFnHandler<N, F>
where
    N: DocumentNode,
    F: Fn(&Path, N, &mut HandlerContext<'_, N>) -> Result<N, HandlerFailure> + Send + Sync,
{
    ContextFnHandler {
        name: name.into(),
        f,
        _node: PhantomData,
    }
}

impl<N, F> Handler<N> for ContextFnHandler<N, F>
where
    N: DocumentNode,
    F: Fn(&Path, N, &mut HandlerContext<'_, N>) -> Result<N, HandlerFailure> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(
        &self,
        path: &Path,
        node: N,
        ctx: &mut HandlerContext<'_, N>,
    ) -> Result<N, HandlerFailure> {
        (self.f)(path, node, ctx)
    }
}

/// Handler that maps leaf values and passes composites through untouched.
pub struct LeafFnHandler<N, F> {
    name: String,
    f: F,
    _node: PhantomData<fn(N) -> N>,
}

pub fn leaf_fn<N, F>(name: impl Into<String>, f: F) -> LeafFnHandler<N, F>
where
    N: DocumentNode,
    F: Fn(&Path, LeafValue) -> Result<LeafValue, HandlerFailure> + Send + Sync,
{
    LeafFnHandler {
        name: name.into(),
        f,
        _node: PhantomData,
    }
}

impl<N, F> Handler<N> for LeafFnHandler<N, F>
where
    N: DocumentNode,
    F: Fn(&Path, LeafValue) -> Result<LeafValue, HandlerFailure> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(
        &self,
        path: &Path,
        node: N,
        _ctx: &mut HandlerContext<'_, N>,
    ) -> Result<N, HandlerFailure> {
        match node.leaf_value() {
            Some(value) => {
                let replaced = (self.f)(path, value)?;
                Ok(node.with_leaf_value(replaced)?)
            }
            None => Ok(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ConsistencyContext;
    use serde_json::{Value, json};

    fn run<H: Handler<Value>>(handler: &H, node: Value) -> Result<Value, HandlerFailure> {
        let root = json!({});
        let mut consistency = ConsistencyContext::new();
        let mut ctx = HandlerContext::new(&root, &mut consistency);
        handler.handle(&Path::root(), node, &mut ctx)
    }

    #[test]
    fn leaf_fn_skips_composites() {
        let handler = leaf_fn("upper", |_, value| {
            Ok(match value {
                LeafValue::Text(s) => LeafValue::Text(s.to_uppercase()),
                other => other,
            })
        });
        assert_eq!(run(&handler, json!("abc")).unwrap(), json!("ABC"));
        assert_eq!(run(&handler, json!({"a": "b"})).unwrap(), json!({"a": "b"}));
        assert_eq!(Handler::<Value>::name(&handler), "upper");
    }

    #[test]
    fn from_fn_failure_converts_from_str() {
        let handler = from_fn("fail", |_, _node: Value| Err("boom".into()));
        let err = run(&handler, json!(1)).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn context_handler_sees_root() {
        let handler =
            from_fn_with_context("root-type", |_, _node: Value, ctx| Ok(json!(ctx.root().type_tag())));
        let root = json!({"resourceType": "Patient"});
        let mut consistency = ConsistencyContext::new();
        let mut ctx = HandlerContext::new(&root, &mut consistency);
        let out = handler.handle(&Path::root(), json!("x"), &mut ctx).unwrap();
        assert_eq!(out, json!("Patient"));
    }

    #[test]
    fn arc_delegates() {
        let handler = Arc::new(from_fn("same", |_, node: Value| Ok(node)));
        assert_eq!(Handler::<Value>::name(&handler), "same");
        assert_eq!(run(&handler, json!(2)).unwrap(), json!(2));
    }
}
