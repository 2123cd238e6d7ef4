//! Built-in handlers and TOML-defined profiles.
//!
//! Every handler here works on any [`deid_model::DocumentNode`] and refuses
//! composite nodes, so a rule pointing one at an object fails loudly instead
//! of silently keeping the subtree.
//!
//! Profiles can be assembled in code with [`deid_core::ProfileBuilder`] or
//! read from a file with [`ProfileConfig::load`].

pub mod config;
pub mod dates;
pub mod error;
pub mod hash;
pub mod pseudonym;
pub mod redact;

pub use config::{HandlerSpec, ProfileConfig, RuleConfig};
pub use dates::{DateGeneralizeHandler, DatePrecision, PartialDate};
pub use error::{ConfigError, RuleError, ValueError};
pub use hash::{HashHandler, sha256_hex};
pub use pseudonym::PseudonymHandler;
pub use redact::{KeepHandler, REDACTED, RedactHandler};
