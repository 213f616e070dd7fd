//! Event types shared by the store, the backends and the server.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::date::CustomDate;
use crate::error::{DecacalError, DecacalResult};

/// Longest note accepted, in characters, after trimming.
pub const MAX_NOTE_LEN: usize = 500;

/// Events of one month keyed by day of month.
pub type MonthEvents = BTreeMap<u32, Event>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    #[default]
    Event,
    Special,
    Deadline,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Event, EventKind::Special, EventKind::Deadline];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Event => "event",
            EventKind::Special => "special",
            EventKind::Deadline => "deadline",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DecacalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DecacalError::Validation(format!(
                    "Type must be one of: event, special, deadline (got '{}')",
                    s
                ))
            })
    }
}

/// An annotated date. `id` is assigned by whichever backend created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub note: String,
    #[serde(rename = "type", default)]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Event {
    pub fn date(&self) -> CustomDate {
        CustomDate {
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub note: String,
    #[serde(rename = "type", default)]
    pub kind: EventKind,
}

impl NewEvent {
    pub fn new(date: CustomDate, note: impl Into<String>, kind: EventKind) -> Self {
        NewEvent {
            year: date.year,
            month: date.month,
            day: date.day,
            note: note.into(),
            kind,
        }
    }

    pub fn date(&self) -> CustomDate {
        CustomDate {
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }
}

/// Body of an update request. Only the note and kind are mutable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EventKind>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.note.is_none() && self.kind.is_none()
    }
}

/// Trim a note and check it is non-empty and within [`MAX_NOTE_LEN`].
pub fn validate_note(note: &str) -> DecacalResult<String> {
    let trimmed = note.trim();
    if trimmed.is_empty() {
        return Err(DecacalError::Validation("Event note cannot be empty".into()));
    }
    if trimmed.chars().count() > MAX_NOTE_LEN {
        return Err(DecacalError::Validation(format!(
            "Event note must be at most {} characters",
            MAX_NOTE_LEN
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_note_trims() {
        assert_eq!(validate_note("  Important meeting \n").unwrap(), "Important meeting");
    }

    #[test]
    fn test_validate_note_rejects_blank() {
        assert!(validate_note("").unwrap_err().is_validation());
        assert!(validate_note("   \t ").unwrap_err().is_validation());
    }

    #[test]
    fn test_validate_note_rejects_long() {
        assert!(validate_note(&"x".repeat(MAX_NOTE_LEN)).is_ok());
        assert!(validate_note(&"x".repeat(MAX_NOTE_LEN + 1)).is_err());
    }

    #[test]
    fn test_kind_uses_type_on_the_wire() {
        let event = Event {
            id: "1".into(),
            year: 2025,
            month: 2,
            day: 22,
            note: "Birthday celebration".into(),
            kind: EventKind::Special,
            created_at: None,
            updated_at: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "special");
        assert!(json.get("kind").is_none());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_event_accepts_server_timestamps() {
        let json = r#"{
            "id": "abc", "year": 2025, "month": 3, "day": 5,
            "note": "Project deadline", "type": "deadline",
            "created_at": "2025-01-01T10:00:00Z",
            "updated_at": "2025-01-02T10:00:00Z"
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind, EventKind::Deadline);
        assert!(event.created_at.is_some());
        assert_eq!(event.date().date_key(), "2025-3-5");
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Deadline".parse::<EventKind>().unwrap(), EventKind::Deadline);
        assert!("today".parse::<EventKind>().is_err());
    }
}
