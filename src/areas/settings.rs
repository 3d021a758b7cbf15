//! Environment-derived settings
//!
//! The chat space's own configuration store is not read here; these are the
//! per-invocation knobs taken from the environment.

use derive_new::new;

/// Pager used when neither `GIT_CHAT_PAGER` nor `PAGER` is set
pub const DEFAULT_PAGER: &str = "less";

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Settings {
    /// Pager command, or `None` when paging is disabled
    pager: Option<String>,
}

impl Settings {
    /// Load settings from environment variables
    ///
    /// Reads GIT_CHAT_NO_PAGER, GIT_CHAT_PAGER and PAGER, in that order of
    /// precedence. An empty pager command or `cat` disables paging.
    pub fn load_from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if lookup("GIT_CHAT_NO_PAGER").is_some() {
            return Settings::new(None);
        }

        let pager = lookup("GIT_CHAT_PAGER")
            .or_else(|| lookup("PAGER"))
            .unwrap_or_else(|| DEFAULT_PAGER.to_string());
        let pager = pager.trim();

        if pager.is_empty() || pager == "cat" {
            Settings::new(None)
        } else {
            Settings::new(Some(pager.to_string()))
        }
    }

    pub fn pager(&self) -> Option<&str> {
        self.pager.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    #[rstest]
    #[case(&[], Some("less"))]
    #[case(&[("PAGER", "more")], Some("more"))]
    #[case(&[("PAGER", "more"), ("GIT_CHAT_PAGER", "less -R")], Some("less -R"))]
    #[case(&[("GIT_CHAT_PAGER", "cat")], None)]
    #[case(&[("PAGER", "  ")], None)]
    #[case(&[("GIT_CHAT_PAGER", "less"), ("GIT_CHAT_NO_PAGER", "1")], None)]
    fn pager_precedence(#[case] vars: &[(&str, &str)], #[case] expected: Option<&str>) {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();

        let settings = Settings::from_lookup(|key| vars.get(key).map(|value| value.to_string()));

        assert_eq!(settings.pager(), expected);
    }
}
