//! Auth settings derived from the loaded config.
//!
//! The session and magic-link lifecycle belong to the auth library; this only
//! assembles what it needs.

use crate::config::{Config, SessionStrategy};
use secrecy::{ExposeSecret, SecretString};

/// Credentials for the magic-link email provider (Resend).
#[derive(Debug)]
pub struct MagicLinkSender {
    pub api_key: SecretString,
    pub from: String,
}

#[derive(Debug)]
pub struct AuthSettings {
    /// Signing secret. Always present in production.
    pub secret: Option<SecretString>,
    pub email: MagicLinkSender,
    pub session: SessionStrategy,
    pub secure_cookies: bool,
    pub debug: bool,
}

impl AuthSettings {
    pub fn from_config(config: &Config) -> Self {
        let mode = config.mode;
        Self {
            secret: config
                .auth_secret
                .as_ref()
                .map(|s| SecretString::from(s.expose_secret())),
            email: MagicLinkSender {
                api_key: SecretString::from(config.resend_key.expose_secret()),
                from: config.resend_from.clone(),
            },
            session: mode.session_strategy(),
            secure_cookies: mode.secure_cookies(),
            debug: mode.auth_debug(),
        }
    }
}
