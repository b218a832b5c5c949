//! Product analytics client.
//!
//! [`AnalyticsClient`] buffers captures in memory and ships them as one
//! batch per [`flush`](AnalyticsClient::flush). [`AnalyticsHandle`] owns at
//! most one client at a time: it is created on first use and dropped by
//! [`shutdown`](AnalyticsHandle::shutdown), after which the next access
//! builds a fresh one.

use crate::config::{Config, PublicConfig};
use crate::error::{Error, Result};
use crate::telemetry::metrics;
use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

/// Project key and ingestion host for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsSettings {
    pub key: String,
    pub host: Url,
}

impl AnalyticsSettings {
    /// Server-side settings (`POSTHOG_KEY` / `POSTHOG_HOST`).
    pub fn server(config: &Config) -> Self {
        Self {
            key: config.posthog_key.clone(),
            host: config.posthog_host.clone(),
        }
    }

    /// Browser-side settings (`NEXT_PUBLIC_POSTHOG_*`).
    pub fn browser(public: &PublicConfig) -> Self {
        Self {
            key: public.posthog_key.clone(),
            host: public.posthog_host.clone(),
        }
    }

    /// `{host}/batch/`, keeping any path the host already has.
    pub(crate) fn batch_url(&self) -> Result<Url> {
        let mut url = self.host.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Other(format!("bad analytics host {}", self.host)))?
            .pop_if_empty()
            .push("batch")
            .push("");
        Ok(url)
    }
}

/// A single captured event.
#[derive(Debug, Clone, Serialize)]
pub struct Capture {
    pub event: String,
    pub distinct_id: String,
    pub properties: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct BatchBody<'a> {
    api_key: &'a str,
    batch: &'a [Capture],
}

pub struct AnalyticsClient {
    settings: AnalyticsSettings,
    http: reqwest::Client,
    buffer: Mutex<Vec<Capture>>,
    closed: AtomicBool,
}

impl AnalyticsClient {
    pub fn new(settings: AnalyticsSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
            buffer: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Set once the owning [`AnalyticsHandle`] has shut this client down.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    /// Queue an event for the next flush.
    ///
    /// A closed client drops the event.
    pub fn capture(
        &self,
        event: impl Into<String>,
        distinct_id: impl Into<String>,
        properties: serde_json::Value,
    ) {
        if self.is_closed() {
            tracing::debug!("analytics client is closed; capture dropped");
            return;
        }
        let capture = Capture {
            event: event.into(),
            distinct_id: distinct_id.into(),
            properties,
            timestamp: Utc::now(),
        };
        tracing::debug!(event = %capture.event, "analytics capture queued");
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(capture);
        metrics::analytics_captured().add(1, &[]);
    }

    /// Number of captures waiting to be sent.
    pub fn pending(&self) -> usize {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Send everything buffered as one batch. Returns how many were sent.
    ///
    /// On failure the captures go back into the buffer ahead of anything
    /// queued meanwhile.
    pub async fn flush(&self) -> Result<usize> {
        let batch = std::mem::take(&mut *self.buffer.lock().unwrap_or_else(PoisonError::into_inner));
        if batch.is_empty() {
            return Ok(0);
        }

        match self.send(&batch).await {
            Ok(()) => {
                metrics::analytics_flushes().add(1, &[KeyValue::new("result", "ok")]);
                tracing::debug!(count = batch.len(), "analytics batch sent");
                Ok(batch.len())
            }
            Err(e) => {
                metrics::analytics_flushes().add(1, &[KeyValue::new("result", "error")]);
                tracing::warn!(error = %e, count = batch.len(), "analytics flush failed");
                let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
                let newer = std::mem::replace(&mut *buffer, batch);
                buffer.extend(newer);
                Err(e)
            }
        }
    }

    async fn send(&self, batch: &[Capture]) -> Result<()> {
        let body = BatchBody {
            api_key: &self.settings.key,
            batch,
        };
        self.http
            .post(self.settings.batch_url()?)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

impl Drop for AnalyticsClient {
    fn drop(&mut self) {
        let unsent = self
            .buffer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        if unsent > 0 {
            tracing::debug!(count = unsent, "analytics client dropped with unsent captures");
        }
    }
}

/// Lazily-built, resettable holder for one [`AnalyticsClient`].
pub struct AnalyticsHandle {
    settings: AnalyticsSettings,
    slot: Mutex<Option<Arc<AnalyticsClient>>>,
}

impl AnalyticsHandle {
    pub fn new(settings: AnalyticsSettings) -> Self {
        Self {
            settings,
            slot: Mutex::new(None),
        }
    }

    /// The current client, creating it if there is none.
    ///
    /// Creation happens under the slot lock, so racing first callers share
    /// one instance. A clone held across [`shutdown`](Self::shutdown) is
    /// closed: its later captures are dropped, not sent. Call this again for
    /// the replacement client.
    pub fn client(&self) -> Arc<AnalyticsClient> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.get_or_insert_with(|| {
            tracing::debug!(host = %self.settings.host, "creating analytics client");
            Arc::new(AnalyticsClient::new(self.settings.clone()))
        })
        .clone()
    }

    pub fn is_active(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Clear the slot, close the client that was in it, and flush it.
    pub async fn shutdown(&self) -> Result<()> {
        let client = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match client {
            Some(client) => {
                client.closed.store(true, Ordering::Release);
                client.flush().await.map(|_| ())
            }
            None => Ok(()),
        }
    }
}
