//! Application context: the one place the loaded config lives.

use crate::analytics::{AnalyticsHandle, AnalyticsSettings};
use crate::auth::AuthSettings;
use crate::config::Config;
use crate::db::Db;
use crate::error::Result;
use secrecy::ExposeSecret;
use std::sync::Arc;

/// Built once at startup and passed down to whatever needs it.
pub struct AppContext {
    pub config: Arc<Config>,
    pub auth: AuthSettings,
    pub analytics: AnalyticsHandle,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let auth = AuthSettings::from_config(&config);
        let analytics = AnalyticsHandle::new(AnalyticsSettings::server(&config));
        Self {
            config: Arc::new(config),
            auth,
            analytics,
        }
    }

    /// Open the Postgres pool named by `DATABASE_URL`.
    pub async fn connect_db(&self) -> Result<Db> {
        Db::connect(self.config.database_url.expose_secret()).await
    }

    /// Flush and drop the analytics client.
    pub async fn shutdown(&self) -> Result<()> {
        self.analytics.shutdown().await
    }
}
