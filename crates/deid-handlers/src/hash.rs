use deid_core::{Handler, HandlerContext, HandlerFailure};
use deid_model::{DocumentNode, LeafValue, Path};
use sha2::{Digest, Sha256};

use crate::error::ValueError;

/// Lower-case hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Replaces a leaf with the SHA-256 digest of its canonical text.
///
/// The salt, when set, is hashed in front of the value. Null leaves stay
/// null; every other leaf becomes text.
#[derive(Debug, Clone, Default)]
pub struct HashHandler {
    salt: Option<String>,
    length: Option<usize>,
}

impl HashHandler {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    /// Keep only the first `length` hex characters.
    #[must_use]
    pub fn truncated(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub fn digest(&self, value: &LeafValue) -> String {
        let mut hasher = Sha256::new();
        if let Some(salt) = &self.salt {
            hasher.update(salt.as_bytes());
        }
        hasher.update(value.to_string().as_bytes());
        let mut digest = hex::encode(hasher.finalize());
        if let Some(length) = self.length {
            digest.truncate(length);
        }
        digest
    }
}

impl<N: DocumentNode> Handler<N> for HashHandler {
    fn name(&self) -> &str {
        "hash"
    }

    fn handle(
        &self,
        _path: &Path,
        node: N,
        _ctx: &mut HandlerContext<'_, N>,
    ) -> Result<N, HandlerFailure> {
        let value = node.leaf_value().ok_or_else(|| ValueError::NotALeaf {
            handler: "hash",
            type_tag: node.type_tag().into_owned(),
        })?;
        if value.is_null() {
            return Ok(node);
        }
        Ok(node.with_leaf_value(LeafValue::Text(self.digest(&value)))?)
    }
}
