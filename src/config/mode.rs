//! Runtime mode and the rules that hang off it.
//!
//! Every mode-dependent decision in the crate goes through a method here.

use serde::{Deserialize, Serialize};

/// Deployment context, read from `NODE_ENV`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    #[default]
    Development,
    Test,
    Production,
}

/// How the auth layer persists sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStrategy {
    /// Session rows in Postgres.
    Database,
    /// Signed, stateless cookies.
    Jwt,
}

impl RuntimeMode {
    pub fn is_production(self) -> bool {
        self == RuntimeMode::Production
    }

    /// `AUTH_SECRET` is mandatory only in production.
    pub fn requires_auth_secret(self) -> bool {
        self.is_production()
    }

    /// Server/client divergence warnings are a development-time check only.
    pub fn warns_on_divergence(self) -> bool {
        !self.is_production()
    }

    pub fn session_strategy(self) -> SessionStrategy {
        match self {
            RuntimeMode::Production => SessionStrategy::Database,
            RuntimeMode::Development | RuntimeMode::Test => SessionStrategy::Jwt,
        }
    }

    pub fn secure_cookies(self) -> bool {
        self.is_production()
    }

    pub fn auth_debug(self) -> bool {
        self == RuntimeMode::Development
    }
}

impl std::fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RuntimeMode::Development => "development",
            RuntimeMode::Test => "test",
            RuntimeMode::Production => "production",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(RuntimeMode::Development),
            "test" => Ok(RuntimeMode::Test),
            "production" => Ok(RuntimeMode::Production),
            other => Err(format!(
                "expected one of development, test, production; got {other:?}"
            )),
        }
    }
}
