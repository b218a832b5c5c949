//! Field-level checks.
//!
//! Checks never short-circuit: each one records its own [`FieldIssue`] and
//! the caller turns the whole list into a single [`ConfigError`].

use super::env::EnvSource;
use super::mode::RuntimeMode;
use thiserror::Error;
use url::Url;

/// Why a single variable was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueReason {
    /// Absent or empty.
    Missing,
    /// Present but not an absolute URL.
    InvalidUrl(String),
    /// Present but not a known runtime mode.
    InvalidMode(String),
}

/// One rejected variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub reason: IssueReason,
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            IssueReason::Missing => write!(f, "{}: required", self.field),
            IssueReason::InvalidUrl(e) => write!(f, "{}: invalid url ({e})", self.field),
            IssueReason::InvalidMode(e) => write!(f, "{}: {e}", self.field),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more variables were absent, empty, or malformed.
    #[error("missing or invalid environment variables: {}", join_issues(.issues))]
    MissingOrInvalid { issues: Vec<FieldIssue> },

    /// A validated config was requested while the escape hatch is on.
    #[error("SKIP_ENV_VALIDATION is set; no validated configuration is available")]
    ValidationSkipped,
}

impl ConfigError {
    /// Names of every rejected variable, in check order.
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            ConfigError::MissingOrInvalid { issues } => issues.iter().map(|i| i.field).collect(),
            ConfigError::ValidationSkipped => Vec::new(),
        }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Accumulates issues while reading typed values out of an [`EnvSource`].
pub(crate) struct Validator<'a> {
    env: &'a EnvSource,
    issues: Vec<FieldIssue>,
}

impl<'a> Validator<'a> {
    pub(crate) fn new(env: &'a EnvSource) -> Self {
        Self {
            env,
            issues: Vec::new(),
        }
    }

    fn reject(&mut self, field: &'static str, reason: IssueReason) {
        self.issues.push(FieldIssue { field, reason });
    }

    pub(crate) fn optional(&self, field: &'static str) -> Option<String> {
        self.env.get(field).map(str::to_owned)
    }

    pub(crate) fn required(&mut self, field: &'static str) -> Option<String> {
        let value = self.optional(field);
        if value.is_none() {
            self.reject(field, IssueReason::Missing);
        }
        value
    }

    /// Required, and must parse as an absolute URL. Returns the raw text
    /// alongside the parsed value.
    pub(crate) fn required_url(&mut self, field: &'static str) -> Option<(String, Url)> {
        let raw = self.required(field)?;
        match Url::parse(&raw) {
            Ok(url) => Some((raw, url)),
            Err(e) => {
                self.reject(field, IssueReason::InvalidUrl(e.to_string()));
                None
            }
        }
    }

    /// Absent or empty means the default; any other unknown value is an issue
    /// and the default stands in so dependent rules can still run.
    pub(crate) fn mode(&mut self, field: &'static str) -> RuntimeMode {
        let env = self.env;
        match env.get(field) {
            None => RuntimeMode::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                self.reject(field, IssueReason::InvalidMode(e));
                RuntimeMode::default()
            }),
        }
    }

    pub(crate) fn into_issues(self) -> Vec<FieldIssue> {
        self.issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_url_is_rejected() {
        let env = EnvSource::from_pairs([("HOST", "invalid-url")]);
        let mut v = Validator::new(&env);
        assert!(v.required_url("HOST").is_none());
        let issues = v.into_issues();
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0].reason, IssueReason::InvalidUrl(_)));
    }

    #[test]
    fn missing_and_invalid_are_both_recorded() {
        let env = EnvSource::from_pairs([("MODE", "staging"), ("B", "")]);
        let mut v = Validator::new(&env);
        assert_eq!(v.mode("MODE"), RuntimeMode::Development);
        assert!(v.required("A").is_none());
        assert!(v.required("B").is_none());
        let fields: Vec<_> = v.into_issues().into_iter().map(|i| i.field).collect();
        assert_eq!(fields, ["MODE", "A", "B"]);
    }

    #[test]
    fn error_message_lists_every_field() {
        let err = ConfigError::MissingOrInvalid {
            issues: vec![
                FieldIssue {
                    field: "DATABASE_URL",
                    reason: IssueReason::Missing,
                },
                FieldIssue {
                    field: "POSTHOG_HOST",
                    reason: IssueReason::InvalidUrl("relative URL without a base".into()),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("DATABASE_URL: required"));
        assert!(msg.contains("POSTHOG_HOST: invalid url"));
        assert_eq!(err.fields(), ["DATABASE_URL", "POSTHOG_HOST"]);
    }
}
