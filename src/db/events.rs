//! Event persistence: create, fetch, and the public listing.

use crate::error::{Error, Result};
use crate::model::{Event, EventId, NewEvent};
use crate::telemetry::metrics;
use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use uuid::Uuid;

impl super::Db {
    /// Insert a validated event and return the stored row.
    pub async fn create_event(&self, new: NewEvent) -> Result<Event> {
        let new = new.validate()?;
        let id = Uuid::new_v4();

        let row: EventRow = sqlx::query_as(
            "INSERT INTO events (id, title, description, location, starts_at, created_by, visibility, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, now())
             RETURNING id, title, description, location, starts_at, created_by, visibility, created_at",
        )
        .bind(id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.location)
        .bind(new.starts_at)
        .bind(&new.created_by)
        .bind(new.visibility.to_string())
        .fetch_one(&self.pool)
        .await?;

        metrics::events_created().add(
            1,
            &[KeyValue::new("visibility", new.visibility.to_string())],
        );
        tracing::info!(event.id = %id, visibility = %new.visibility, "event created");

        row.try_into_event()
    }

    pub async fn get_event(&self, id: EventId) -> Result<Event> {
        let row: Option<EventRow> = sqlx::query_as(
            "SELECT id, title, description, location, starts_at, created_by, visibility, created_at
             FROM events WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| Error::NotFound(format!("event {id}")))?
            .try_into_event()
    }

    /// Public events, soonest first.
    pub async fn list_public_events(&self, limit: u32) -> Result<Vec<Event>> {
        let rows: Vec<EventRow> = sqlx::query_as(
            "SELECT id, title, description, location, starts_at, created_by, visibility, created_at
             FROM events WHERE visibility = 'public'
             ORDER BY starts_at ASC, created_at ASC
             LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EventRow::try_into_event).collect()
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    location: Option<String>,
    starts_at: DateTime<Utc>,
    created_by: String,
    visibility: String,
    created_at: DateTime<Utc>,
}

impl EventRow {
    fn try_into_event(self) -> Result<Event> {
        Ok(Event {
            id: EventId(self.id),
            title: self.title,
            description: self.description,
            location: self.location,
            starts_at: self.starts_at,
            created_by: self.created_by,
            visibility: self.visibility.parse()?,
            created_at: self.created_at,
        })
    }
}
