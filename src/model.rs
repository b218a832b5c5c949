//! Core data model.
//!
//! An event is something people can show up to. Public events appear in the
//! shared listing; private ones are only reachable by id.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    /// Email of the signed-in user who created it.
    pub created_by: String,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

/// Newtype for event IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(Error::InvalidEvent(format!("unknown visibility: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for new events.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) location: Option<String>,
    pub(crate) starts_at: DateTime<Utc>,
    pub(crate) created_by: String,
    pub(crate) visibility: Visibility,
}

impl NewEvent {
    pub fn new(
        title: impl Into<String>,
        starts_at: DateTime<Utc>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            location: None,
            starts_at,
            created_by: created_by.into(),
            visibility: Visibility::Public,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Reject blank titles and creators; blank optional text becomes `None`.
    pub fn validate(mut self) -> Result<Self> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(Error::InvalidEvent("title must not be empty".into()));
        }
        if self.created_by.trim().is_empty() {
            return Err(Error::InvalidEvent("creator must not be empty".into()));
        }
        self.description = self.description.filter(|d| !d.trim().is_empty());
        self.location = self.location.filter(|l| !l.trim().is_empty());
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        let err = NewEvent::new("   ", Utc::now(), "a@example.com")
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEvent(_)));
    }

    #[test]
    fn blank_optionals_are_dropped() {
        let new = NewEvent::new(" Meetup ", Utc::now(), "a@example.com")
            .description("")
            .location("  ")
            .validate()
            .unwrap();
        assert_eq!(new.title, "Meetup");
        assert!(new.description.is_none());
        assert!(new.location.is_none());
        assert_eq!(new.visibility, Visibility::Public);
    }

    #[test]
    fn visibility_parses() {
        assert_eq!("private".parse::<Visibility>().unwrap(), Visibility::Private);
        assert!("hidden".parse::<Visibility>().is_err());
    }
}
