//! Environment handed to child processes
//!
//! The child sees the parent's environment with the spec's overrides laid on
//! top. Variables are compared by name only; an override replaces the
//! inherited value for the same name. The result is ordered by name.

use std::collections::BTreeMap;
use std::ffi::OsString;

pub type Environment = BTreeMap<OsString, OsString>;

/// Merge `overrides` over `parent`, override entries winning on the same name
pub fn merge_environment<I, K, V>(parent: I, overrides: &Environment) -> Environment
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<OsString>,
    V: Into<OsString>,
{
    let mut merged: Environment = parent
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect();
    merged.extend(
        overrides
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    merged
}

/// The current process environment with `overrides` applied
pub fn inherited_environment(overrides: &Environment) -> Environment {
    merge_environment(std::env::vars_os(), overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        pairs
            .iter()
            .map(|(key, value)| (OsString::from(key), OsString::from(value)))
            .collect()
    }

    #[test]
    fn overrides_win_and_keys_stay_unique() {
        let parent = env(&[("A", "1"), ("B", "2")]);
        let overrides = env(&[("B", "9"), ("C", "3")]);

        let merged = merge_environment(parent, &overrides);

        assert_eq!(merged, env(&[("A", "1"), ("B", "9"), ("C", "3")]));
    }

    #[test]
    fn empty_overrides_keep_parent() {
        let parent = env(&[("PATH", "/bin"), ("HOME", "/root")]);

        assert_eq!(merge_environment(parent.clone(), &Environment::new()), parent);
    }

    #[test]
    fn inherited_environment_contains_current_variables() {
        let overrides = env(&[("GIT_CHAT_TEST_OVERRIDE", "yes")]);
        let merged = inherited_environment(&overrides);

        assert_eq!(
            merged.get(&OsString::from("GIT_CHAT_TEST_OVERRIDE")),
            Some(&OsString::from("yes"))
        );
        if let Some(path) = std::env::var_os("PATH") {
            assert_eq!(merged.get(&OsString::from("PATH")), Some(&path));
        }
    }

    proptest! {
        #[test]
        fn merged_is_union_with_override_precedence(
            parent in proptest::collection::btree_map("[A-Z]{1,3}", "[a-z0-9]{0,4}", 0..8),
            overrides in proptest::collection::btree_map("[A-Z]{1,3}", "[a-z0-9]{0,4}", 0..8),
        ) {
            let overrides: Environment = overrides
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect();
            let merged = merge_environment(parent.clone(), &overrides);

            for (key, value) in &overrides {
                prop_assert_eq!(merged.get(key), Some(value));
            }
            for (key, value) in &parent {
                let key = OsString::from(key);
                if !overrides.contains_key(&key) {
                    prop_assert_eq!(merged.get(&key), Some(&OsString::from(value)));
                }
            }
            let expected_len = parent
                .keys()
                .filter(|key| !overrides.contains_key(&OsString::from(*key)))
                .count()
                + overrides.len();
            prop_assert_eq!(merged.len(), expected_len);
        }
    }
}
