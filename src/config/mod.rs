//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if required vars are missing or
//! malformed, and reports every bad variable in one error. Sensitive values
//! are wrapped in `secrecy::SecretString` to prevent log leaks.

pub mod consistency;
pub mod env;
pub mod mode;
pub mod validate;

pub use env::{EnvSource, RawEnv, SKIP_VALIDATION_VAR};
pub use mode::{RuntimeMode, SessionStrategy};
pub use validate::{ConfigError, FieldIssue, IssueReason};

use crate::error::Result;
use consistency::Pair;
use secrecy::SecretString;
use serde::Serialize;
use url::Url;
use validate::Validator;

/// Validated server-side configuration. Never mutated after construction.
#[derive(Debug)]
pub struct Config {
    pub auth_secret: Option<SecretString>,
    pub resend_key: SecretString,
    pub resend_from: String,
    pub database_url: SecretString,
    pub mode: RuntimeMode,
    pub posthog_key: String,
    pub posthog_host: Url,
    pub public: PublicConfig,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

/// The client-exposed subset, safe to embed in a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicConfig {
    pub posthog_key: String,
    pub posthog_host: Url,
}

/// Outcome of [`Config::load`].
#[derive(Debug)]
pub enum Loaded {
    Validated(Config),
    /// Validation was skipped on request; values are untouched strings.
    Unchecked(RawEnv),
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Self::from_source(&EnvSource::from_process())
    }

    /// Validate `env` into a [`Config`].
    ///
    /// Fails with [`ConfigError::ValidationSkipped`] if the escape hatch is
    /// set; use [`Config::load`] to accept unchecked values.
    pub fn from_source(env: &EnvSource) -> Result<Self> {
        if env.skip_validation() {
            return Err(ConfigError::ValidationSkipped.into());
        }
        Self::validate(env)
    }

    /// Validate `env`, or hand back raw values if the escape hatch is set.
    pub fn load(env: EnvSource) -> Result<Loaded> {
        if env.skip_validation() {
            tracing::warn!("{SKIP_VALIDATION_VAR} is set; environment was not validated");
            return Ok(Loaded::Unchecked(env.into_raw()));
        }
        Self::validate(&env).map(Loaded::Validated)
    }

    pub fn public(&self) -> &PublicConfig {
        &self.public
    }

    fn validate(env: &EnvSource) -> Result<Self> {
        let mut v = Validator::new(env);

        let mode = v.mode("NODE_ENV");
        let auth_secret = if mode.requires_auth_secret() {
            v.required("AUTH_SECRET")
        } else {
            v.optional("AUTH_SECRET")
        };
        let resend_key = v.required("AUTH_RESEND_KEY");
        let resend_from = v.required("AUTH_RESEND_FROM");
        let database_url = v.required_url("DATABASE_URL");
        let posthog_key = v.required("POSTHOG_KEY");
        let posthog_host = v.required_url("POSTHOG_HOST");
        let public_key = v.required("NEXT_PUBLIC_POSTHOG_KEY");
        let public_host = v.required_url("NEXT_PUBLIC_POSTHOG_HOST");

        let otel_endpoint = v.optional("OTEL_ENDPOINT");
        let log_level = v.optional("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let issues = v.into_issues();
        let (
            Some(resend_key),
            Some(resend_from),
            Some((database_url, _)),
            Some(posthog_key),
            Some((posthog_host_raw, posthog_host)),
            Some(public_key),
            Some((public_host_raw, public_host)),
        ) = (
            resend_key,
            resend_from,
            database_url,
            posthog_key,
            posthog_host,
            public_key,
            public_host,
        )
        else {
            return Err(ConfigError::MissingOrInvalid { issues }.into());
        };
        if !issues.is_empty() {
            return Err(ConfigError::MissingOrInvalid { issues }.into());
        }

        let divergences = consistency::check(
            mode,
            Pair::new(Some(posthog_key.as_str()), Some(public_key.as_str())),
            Pair::new(Some(posthog_host_raw.as_str()), Some(public_host_raw.as_str())),
        );
        consistency::report(&divergences);

        tracing::debug!(%mode, "environment configuration loaded");

        Ok(Self {
            auth_secret: auth_secret.map(SecretString::from),
            resend_key: SecretString::from(resend_key),
            resend_from,
            database_url: SecretString::from(database_url),
            mode,
            posthog_key,
            posthog_host,
            public: PublicConfig {
                posthog_key: public_key,
                posthog_host: public_host,
            },
            otel_endpoint,
            log_level,
        })
    }
}

impl PublicConfig {
    /// Validate only the client-exposed variables. No divergence check runs
    /// here; that belongs to the server path.
    pub fn from_source(env: &EnvSource) -> Result<Self> {
        let mut v = Validator::new(env);
        let posthog_key = v.required("NEXT_PUBLIC_POSTHOG_KEY");
        let posthog_host = v.required_url("NEXT_PUBLIC_POSTHOG_HOST");
        let issues = v.into_issues();
        match (posthog_key, posthog_host) {
            (Some(posthog_key), Some((_, posthog_host))) if issues.is_empty() => Ok(Self {
                posthog_key,
                posthog_host,
            }),
            _ => Err(ConfigError::MissingOrInvalid { issues }.into()),
        }
    }
}
