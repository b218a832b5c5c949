//! Raw environment input.
//!
//! Values are kept exactly as given; the empty string reads as absent.

use std::collections::BTreeMap;

/// Name of the escape-hatch variable that disables validation.
pub const SKIP_VALIDATION_VAR: &str = "SKIP_ENV_VALIDATION";

/// A materialized snapshot of environment key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSource {
    vars: BTreeMap<String, String>,
}

impl EnvSource {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid unicode are skipped.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable. Absent and empty values both yield `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Whether validation has been explicitly opted out of.
    ///
    /// Only `1`, `true`, `yes` and `on` count; anything else keeps validation on.
    pub fn skip_validation(&self) -> bool {
        self.get(SKIP_VALIDATION_VAR).is_some_and(|v| {
            ["1", "true", "yes", "on"]
                .iter()
                .any(|yes| v.eq_ignore_ascii_case(yes))
        })
    }

    pub(crate) fn into_raw(self) -> RawEnv {
        RawEnv { vars: self.vars }
    }
}

/// Environment values handed through without validation or coercion.
///
/// Only produced when [`EnvSource::skip_validation`] is set. Nothing here has
/// been checked, so every read is a raw, possibly missing string.
#[derive(Debug, Clone)]
pub struct RawEnv {
    vars: BTreeMap<String, String>,
}

impl RawEnv {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_reads_as_absent() {
        let env = EnvSource::from_pairs([("A", ""), ("B", "x")]);
        assert_eq!(env.get("A"), None);
        assert_eq!(env.get("B"), Some("x"));
        assert_eq!(env.get("C"), None);
    }

    #[test]
    fn skip_flag_needs_affirmative_value() {
        for yes in ["1", "true", "TRUE", "yes", "On"] {
            assert!(EnvSource::from_pairs([(SKIP_VALIDATION_VAR, yes)]).skip_validation());
        }
        for no in ["", "0", "false", "no", "off", "maybe"] {
            assert!(!EnvSource::from_pairs([(SKIP_VALIDATION_VAR, no)]).skip_validation());
        }
        assert!(!EnvSource::default().skip_validation());
    }
}
