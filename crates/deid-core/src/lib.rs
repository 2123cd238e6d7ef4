//! Rule-matching and traversal engine for structural de-identification.
//!
//! - **handler**: the [`Handler`] contract and closure adapters
//! - **context**: per-run consistency state handed to handlers
//! - **profile**: rules, frozen profiles, the builder, and merging
//! - **engine**: the depth-first walk that applies a profile to a document
//! - **profiles**: predefined profiles exposed by name
//!
//! # Example
//!
//! ```ignore
//! use deid_core::{Profile, deidentify, handler::leaf_fn};
//!
//! let profile = Profile::builder()
//!     .register("id", leaf_fn("mask", |_, _| Ok("***".into())))?
//!     .build();
//! let output = deidentify(&profile, &document)?;
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod handler;
pub mod profile;
pub mod profiles;

pub use context::{ConsistencyContext, HandlerContext};
pub use engine::{DeidReport, Deidentifier, RuleHit, deidentify};
pub use error::{DeidError, Result};
pub use handler::{Handler, HandlerFailure, from_fn, from_fn_with_context, leaf_fn};
pub use profile::{Profile, ProfileBuilder, Rule, merge};

pub use deid_model::{DocumentNode, LeafValue, Path, PathSegment, Pattern};
