//! Predefined profiles, exposed by name.
//!
//! These are ordinary profiles assembled through [`ProfileBuilder`]; the only
//! difference is that their rule lists are fixed in code.

use deid_model::{DocumentNode, Pattern};

use crate::handler::from_fn;
use crate::profile::{Profile, ProfileBuilder};

/// Name of the minimal test profile.
pub const TEST: &str = "Test";

/// Names accepted by [`by_name`].
pub const PREDEFINED: &[&str] = &[TEST];

/// Single root-level rule that hands the whole document back unchanged.
///
/// Useful to check that a document model can be traversed end to end.
pub fn test_profile<N: DocumentNode>() -> Profile<N> {
    ProfileBuilder::named(TEST)
        .register_pattern(
            Pattern::root(),
            from_fn("keep-document", |_, document: N| Ok(document)),
        )
        .build()
}

/// Look up a predefined profile, case-insensitively.
pub fn by_name<N: DocumentNode>(name: &str) -> Option<Profile<N>> {
    if name.eq_ignore_ascii_case(TEST) {
        Some(test_profile())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_profile_has_one_root_rule() {
        let profile = test_profile::<Value>();
        assert_eq!(profile.name(), Some("Test"));
        assert_eq!(profile.len(), 1);
        assert!(profile.rules()[0].pattern().is_root());
    }

    #[test]
    fn lookup_by_name() {
        assert!(by_name::<Value>("test").is_some());
        assert!(by_name::<Value>("unknown").is_none());
        for name in PREDEFINED {
            assert!(by_name::<Value>(name).is_some());
        }
    }
}
