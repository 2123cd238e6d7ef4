//! Profile definitions loaded from TOML.
//!
//! ```toml
//! name = "basic"
//!
//! [[rules]]
//! pattern = "id"
//! handler = "hash"
//! salt = "s3cr3t"
//!
//! [[rules]]
//! pattern = "name.family"
//! handler = "redact"
//! replacement = "***"
//!
//! [[rules]]
//! pattern = "birthDate"
//! handler = "generalize-date"
//! precision = "year"
//! ```
//!
//! Rules keep file order, so the first matching rule in the file wins. Keys
//! a handler does not take are rejected, so a misspelled parameter fails the
//! load instead of falling back to a default.

use std::path::Path;
use std::sync::Arc;

use deid_core::{Handler, Profile, ProfileBuilder};
use deid_model::{DocumentNode, Pattern};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dates::{DateGeneralizeHandler, DatePrecision};
use crate::error::{ConfigError, Result, RuleError};
use crate::hash::HashHandler;
use crate::pseudonym::PseudonymHandler;
use crate::redact::{KeepHandler, RedactHandler};

/// A profile as written in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "toml::Table")]
pub struct RuleConfig {
    pub pattern: String,
    #[serde(flatten)]
    pub handler: HandlerSpec,
}

/// Built-in handler selected by the `handler` key, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "handler", rename_all = "kebab-case")]
pub enum HandlerSpec {
    Keep,
    Null,
    Redact {
        #[serde(default)]
        replacement: Option<String>,
    },
    Hash {
        #[serde(default)]
        salt: Option<String>,
        #[serde(default)]
        length: Option<usize>,
    },
    Pseudonym {
        prefix: String,
        #[serde(default)]
        namespace: Option<String>,
    },
    GeneralizeDate {
        #[serde(default)]
        precision: DatePrecision,
    },
}

impl TryFrom<toml::Table> for RuleConfig {
    type Error = RuleError;

    fn try_from(mut table: toml::Table) -> std::result::Result<Self, RuleError> {
        let pattern = match table.remove("pattern") {
            Some(toml::Value::String(pattern)) => pattern,
            Some(other) => {
                return Err(RuleError::PatternNotText {
                    found: other.type_str(),
                });
            }
            None => return Err(RuleError::MissingPattern),
        };
        let keys: Vec<String> = table.keys().cloned().collect();
        let handler: HandlerSpec = toml::Value::Table(table).try_into()?;

        let accepted = handler.parameter_names();
        if let Some(key) = keys
            .into_iter()
            .find(|key| key != "handler" && !accepted.contains(&key.as_str()))
        {
            return Err(RuleError::UnknownParameter {
                handler: handler.kind(),
                key,
            });
        }
        Ok(Self { pattern, handler })
    }
}

impl HandlerSpec {
    /// The `handler` tag as written in config files.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Null => "null",
            Self::Redact { .. } => "redact",
            Self::Hash { .. } => "hash",
            Self::Pseudonym { .. } => "pseudonym",
            Self::GeneralizeDate { .. } => "generalize-date",
        }
    }

    /// Keys this handler accepts besides `pattern` and `handler`.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            Self::Keep | Self::Null => &[],
            Self::Redact { .. } => &["replacement"],
            Self::Hash { .. } => &["salt", "length"],
            Self::Pseudonym { .. } => &["prefix", "namespace"],
            Self::GeneralizeDate { .. } => &["precision"],
        }
    }

    /// Instantiate the handler for a document model.
    ///
    /// # Errors
    ///
    /// Rejects parameters outside a handler's range, such as a zero hash
    /// length.
    pub fn build<N: DocumentNode>(&self) -> std::result::Result<Arc<dyn Handler<N>>, RuleError> {
        Ok(match self {
            Self::Keep => Arc::new(KeepHandler),
            Self::Null => Arc::new(RedactHandler::null()),
            Self::Redact { replacement } => Arc::new(match replacement {
                Some(text) => RedactHandler::with_replacement(text.clone()),
                None => RedactHandler::new(),
            }),
            Self::Hash { salt, length } => {
                let mut handler = HashHandler::new();
                if let Some(salt) = salt {
                    handler = handler.with_salt(salt.clone());
                }
                match length {
                    Some(0) => return Err(RuleError::ZeroHashLength),
                    Some(n) => handler = handler.truncated(*n),
                    None => {}
                }
                Arc::new(handler)
            }
            Self::Pseudonym { prefix, namespace } => {
                if prefix.is_empty() {
                    return Err(RuleError::EmptyPrefix);
                }
                let mut handler = PseudonymHandler::new(prefix.clone());
                if let Some(namespace) = namespace {
                    handler = handler.in_namespace(namespace.clone());
                }
                Arc::new(handler)
            }
            Self::GeneralizeDate { precision } => Arc::new(DateGeneralizeHandler::new(*precision)),
        })
    }
}

impl ProfileConfig {
    /// Parse a TOML profile definition.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] for malformed TOML, unknown handlers or
    /// missing parameters.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|source| ConfigError::Toml { path: None, source })
    }

    /// Read and parse a TOML profile file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: Some(path.to_path_buf()),
            source,
        })?;
        debug!(
            path = %path.display(),
            rules = config.rules.len(),
            "loaded profile config"
        );
        Ok(config)
    }

    /// Build a frozen profile, validating every pattern and parameter.
    ///
    /// # Errors
    ///
    /// Reports the first offending rule by its 0-based position.
    pub fn to_profile<N: DocumentNode>(&self) -> Result<Profile<N>> {
        let mut builder = match &self.name {
            Some(name) => ProfileBuilder::named(name.clone()),
            None => ProfileBuilder::new(),
        };
        for (index, rule) in self.rules.iter().enumerate() {
            let pattern = Pattern::parse(&rule.pattern)
                .map_err(|source| ConfigError::Pattern { index, source })?;
            let handler = rule
                .handler
                .build()
                .map_err(|source| ConfigError::Invalid { index, source })?;
            builder = builder.register_shared(pattern, handler);
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn parses_all_handler_kinds() {
        let config = ProfileConfig::from_toml_str(
            r#"
name = "all"

[[rules]]
pattern = "a"
handler = "keep"

[[rules]]
pattern = "b"
handler = "null"

[[rules]]
pattern = "c"
handler = "redact"

[[rules]]
pattern = "d"
handler = "hash"
salt = "x"
length = 12

[[rules]]
pattern = "e"
handler = "pseudonym"
prefix = "PAT"

[[rules]]
pattern = "f"
handler = "generalize-date"
precision = "year-month"
"#,
        )
        .unwrap();

        assert_eq!(config.name.as_deref(), Some("all"));
        let handlers: Vec<_> = config.rules.iter().map(|r| r.handler.clone()).collect();
        assert_eq!(
            handlers,
            vec![
                HandlerSpec::Keep,
                HandlerSpec::Null,
                HandlerSpec::Redact { replacement: None },
                HandlerSpec::Hash {
                    salt: Some("x".to_string()),
                    length: Some(12)
                },
                HandlerSpec::Pseudonym {
                    prefix: "PAT".to_string(),
                    namespace: None
                },
                HandlerSpec::GeneralizeDate {
                    precision: DatePrecision::YearMonth
                },
            ]
        );

        let profile = config.to_profile::<Value>().unwrap();
        assert_eq!(profile.len(), 6);
        assert_eq!(profile.name(), Some("all"));
    }

    #[test]
    fn unknown_handler_is_a_parse_error() {
        let err = ProfileConfig::from_toml_str(
            r#"
[[rules]]
pattern = "id"
handler = "shred"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Toml { path: None, .. }));
    }

    #[test]
    fn misspelled_parameter_is_rejected() {
        let err = ProfileConfig::from_toml_str(
            r#"
[[rules]]
pattern = "id"
handler = "hash"
sallt = "pepper"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Toml { path: None, .. }));
        assert!(
            err.to_string()
                .contains("unknown parameter `sallt` for handler hash"),
            "{err}"
        );
    }

    #[test]
    fn parameterless_handlers_reject_extra_keys() {
        let err = ProfileConfig::from_toml_str(
            r#"
[[rules]]
pattern = "id"
handler = "keep"
replacement = "x"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown parameter `replacement`"), "{err}");
    }

    #[test]
    fn rule_without_pattern_is_rejected() {
        let err = ProfileConfig::from_toml_str(
            r#"
[[rules]]
handler = "keep"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("rule has no `pattern`"), "{err}");
    }

    #[test]
    fn empty_prefix_is_a_typed_error() {
        let spec = HandlerSpec::Pseudonym {
            prefix: String::new(),
            namespace: None,
        };
        assert!(matches!(spec.build::<Value>(), Err(RuleError::EmptyPrefix)));
    }

    #[test]
    fn bad_pattern_reports_rule_index() {
        let config = ProfileConfig::from_toml_str(
            r#"
[[rules]]
pattern = "id"
handler = "keep"

[[rules]]
pattern = "name..family"
handler = "redact"
"#,
        )
        .unwrap();
        let err = config.to_profile::<Value>().unwrap_err();
        assert!(matches!(err, ConfigError::Pattern { index: 1, .. }));
    }

    #[test]
    fn zero_hash_length_is_rejected() {
        let config = ProfileConfig {
            name: None,
            rules: vec![RuleConfig {
                pattern: "id".to_string(),
                handler: HandlerSpec::Hash {
                    salt: None,
                    length: Some(0),
                },
            }],
        };
        let err = config.to_profile::<Value>().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                index: 0,
                source: RuleError::ZeroHashLength
            }
        ));
        insta::assert_snapshot!(err.to_string(), @"rule 0: hash length must be at least 1");
    }
}
