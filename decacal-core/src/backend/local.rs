//! Local key-value backend.
//!
//! Each key is one JSON file in the data directory:
//! - `calendar-events.json`: date key (`"{year}-{month}-{day}"`) -> event
//! - `calendar-current-date.json`: `{year, month, day}`
//!
//! Unparsable files load as empty and leave a warning behind; they are
//! only replaced by the next successful write.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use tracing::{debug, warn};

use crate::backend::{Backend, MonthFetch};
use crate::date::CustomDate;
use crate::error::{DecacalError, DecacalResult};
use crate::event::{Event, EventPatch, NewEvent, validate_note};

pub const EVENTS_KEY: &str = "calendar-events";
pub const CURRENT_DATE_KEY: &str = "calendar-current-date";

/// A directory of JSON values addressed by key.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        LocalStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Raw contents of a key, `None` if it was never written.
    pub fn read(&self, key: &str) -> DecacalResult<Option<String>> {
        match std::fs::read(self.path(key)) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| DecacalError::CorruptState(format!("{key}: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write(&self, key: &str, content: &str) -> DecacalResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path(key);
        let temp = self.dir.join(format!("{key}.json.tmp"));

        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
struct LocalState {
    events: BTreeMap<String, Event>,
    today: Option<CustomDate>,
}

/// Events and today's date kept on this machine.
pub struct LocalBackend {
    storage: LocalStorage,
    state: Mutex<LocalState>,
    warnings: Mutex<Vec<String>>,
}

impl LocalBackend {
    /// Load the store from `dir`. Corrupt data is not an error: the
    /// affected key starts empty and a warning is queued.
    pub fn open(dir: impl Into<PathBuf>) -> DecacalResult<Self> {
        let storage = LocalStorage::new(dir);
        let mut warnings = Vec::new();

        let events = match load_events(&storage) {
            Ok(events) => events,
            Err(DecacalError::CorruptState(msg)) => {
                warn!(dir = %storage.dir().display(), error = %msg, "local events are corrupt, starting empty");
                warnings.push(format!("Saved events could not be read and were ignored ({msg})"));
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        let today = match load_today(&storage) {
            Ok(today) => today,
            Err(DecacalError::CorruptState(msg)) => {
                warn!(dir = %storage.dir().display(), error = %msg, "local current date is corrupt, ignoring it");
                warnings.push(format!("Saved current date could not be read and was ignored ({msg})"));
                None
            }
            Err(e) => return Err(e),
        };

        debug!(count = events.len(), "loaded local events");

        Ok(LocalBackend {
            storage,
            state: Mutex::new(LocalState { events, today }),
            warnings: Mutex::new(warnings),
        })
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    fn state(&self) -> std::sync::MutexGuard<'_, LocalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events_in_month(&self, year: i32, month: u32) -> Vec<Event> {
        self.state()
            .events
            .values()
            .filter(|e| e.year == year && e.month == month)
            .cloned()
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<Event> {
        self.state().events.values().find(|e| e.id == id).cloned()
    }

    pub fn event_at(&self, date: &CustomDate) -> Option<Event> {
        self.state().events.get(&date.date_key()).cloned()
    }

    pub fn len(&self) -> usize {
        self.state().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a new event. Fails if the date is already taken.
    pub fn insert(&self, new: &NewEvent) -> DecacalResult<Event> {
        let note = validate_note(&new.note)?;
        let key = new.date().date_key();

        let mut state = self.state();
        if state.events.contains_key(&key) {
            return Err(DecacalError::Validation(format!(
                "An event already exists on {key}"
            )));
        }

        let now = Utc::now();
        let event = Event {
            id: uuid::Uuid::new_v4().to_string(),
            year: new.year,
            month: new.month,
            day: new.day,
            note,
            kind: new.kind,
            created_at: Some(now),
            updated_at: Some(now),
        };

        let mut events = state.events.clone();
        events.insert(key, event.clone());
        self.persist_events(&events)?;
        state.events = events;

        Ok(event)
    }

    pub fn update(&self, id: &str, patch: &EventPatch) -> DecacalResult<Event> {
        let note = patch.note.as_deref().map(validate_note).transpose()?;

        let mut state = self.state();
        let (key, current) = state
            .events
            .iter()
            .find(|(_, e)| e.id == id)
            .map(|(k, e)| (k.clone(), e.clone()))
            .ok_or_else(|| DecacalError::NotFound(format!("Event {id}")))?;

        let mut updated = current;
        if let Some(note) = note {
            updated.note = note;
        }
        if let Some(kind) = patch.kind {
            updated.kind = kind;
        }
        updated.updated_at = Some(Utc::now());

        let mut events = state.events.clone();
        events.insert(key, updated.clone());
        self.persist_events(&events)?;
        state.events = events;

        Ok(updated)
    }

    pub fn remove(&self, id: &str) -> DecacalResult<Event> {
        let mut state = self.state();
        let key = state
            .events
            .iter()
            .find(|(_, e)| e.id == id)
            .map(|(k, _)| k.clone())
            .ok_or_else(|| DecacalError::NotFound(format!("Event {id}")))?;

        let mut events = state.events.clone();
        let removed = events.remove(&key);
        self.persist_events(&events)?;
        state.events = events;

        removed.ok_or_else(|| DecacalError::NotFound(format!("Event {id}")))
    }

    pub fn today(&self) -> Option<CustomDate> {
        self.state().today
    }

    pub fn store_today(&self, date: &CustomDate) -> DecacalResult<()> {
        let mut state = self.state();
        let content = serde_json::to_string(date)
            .map_err(|e| DecacalError::Serialization(e.to_string()))?;
        self.storage.write(CURRENT_DATE_KEY, &content)?;
        state.today = Some(*date);
        Ok(())
    }

    /// Store a copy of an event another backend already accepted,
    /// replacing whatever sat on its date or carried its id.
    pub fn mirror_event(&self, event: &Event) -> DecacalResult<()> {
        let mut state = self.state();
        let mut events = state.events.clone();
        events.retain(|_, e| e.id != event.id);
        events.insert(event.date().date_key(), event.clone());
        self.persist_events(&events)?;
        state.events = events;
        Ok(())
    }

    /// Replace one month's events with a fresh remote listing.
    pub fn mirror_month(&self, year: i32, month: u32, fresh: &[Event]) -> DecacalResult<()> {
        let mut state = self.state();
        let mut events = state.events.clone();
        events.retain(|_, e| !(e.year == year && e.month == month));
        for event in fresh {
            events.insert(event.date().date_key(), event.clone());
        }
        if events == state.events {
            return Ok(());
        }
        self.persist_events(&events)?;
        state.events = events;
        Ok(())
    }

    pub fn mirror_remove(&self, id: &str) -> DecacalResult<()> {
        let mut state = self.state();
        if !state.events.values().any(|e| e.id == id) {
            return Ok(());
        }
        let mut events = state.events.clone();
        events.retain(|_, e| e.id != id);
        self.persist_events(&events)?;
        state.events = events;
        Ok(())
    }

    fn persist_events(&self, events: &BTreeMap<String, Event>) -> DecacalResult<()> {
        let content = serde_json::to_string_pretty(events)
            .map_err(|e| DecacalError::Serialization(e.to_string()))?;
        self.storage.write(EVENTS_KEY, &content)
    }
}

fn load_events(storage: &LocalStorage) -> DecacalResult<BTreeMap<String, Event>> {
    let Some(content) = storage.read(EVENTS_KEY)? else {
        return Ok(BTreeMap::new());
    };

    let stored: BTreeMap<String, Event> = serde_json::from_str(&content)
        .map_err(|e| DecacalError::CorruptState(format!("{EVENTS_KEY}: {e}")))?;

    // Re-key by each event's own date so the key always matches the record.
    let mut events = BTreeMap::new();
    for (key, event) in stored {
        let date_key = event.date().date_key();
        if date_key != key {
            warn!(stored_key = %key, date_key = %date_key, "local event stored under the wrong key");
        }
        if events.contains_key(&date_key) {
            warn!(date_key = %date_key, id = %event.id, "dropping second local event on the same date");
            continue;
        }
        events.insert(date_key, event);
    }
    Ok(events)
}

fn load_today(storage: &LocalStorage) -> DecacalResult<Option<CustomDate>> {
    let Some(content) = storage.read(CURRENT_DATE_KEY)? else {
        return Ok(None);
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| DecacalError::CorruptState(format!("{CURRENT_DATE_KEY}: {e}")))
}

impl Backend for LocalBackend {
    async fn fetch_month(&self, year: i32, month: u32) -> DecacalResult<MonthFetch> {
        Ok(MonthFetch::fresh(self.events_in_month(year, month)))
    }

    async fn get_event(&self, id: &str) -> DecacalResult<Event> {
        self.find(id)
            .ok_or_else(|| DecacalError::NotFound(format!("Event {id}")))
    }

    async fn create_event(&self, event: &NewEvent) -> DecacalResult<Event> {
        self.insert(event)
    }

    async fn update_event(&self, id: &str, patch: &EventPatch) -> DecacalResult<Event> {
        self.update(id, patch)
    }

    async fn delete_event(&self, id: &str) -> DecacalResult<()> {
        self.remove(id).map(|_| ())
    }

    async fn get_today(&self) -> DecacalResult<Option<CustomDate>> {
        Ok(self.today())
    }

    async fn set_today(&self, date: &CustomDate) -> DecacalResult<()> {
        self.store_today(date)
    }

    fn take_warnings(&self) -> Vec<String> {
        std::mem::take(&mut *self.warnings.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
