//! In-memory backend with failure injection, for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::backend::{Backend, MonthFetch};
use crate::date::CustomDate;
use crate::error::{DecacalError, DecacalResult};
use crate::event::{Event, EventPatch, NewEvent};

#[derive(Default)]
pub struct FakeBackend {
    events: Mutex<BTreeMap<String, Event>>,
    today: Mutex<Option<CustomDate>>,
    next_id: AtomicU64,
    offline: AtomicBool,
    failures_left: AtomicUsize,
    acks_lost: AtomicUsize,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a transient error until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// The next `n` calls fail with a transient error.
    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    /// The next `n` creates are stored but reported as transient failures,
    /// like a request whose response never arrived.
    pub fn lose_next_ack(&self, n: usize) {
        self.acks_lost.store(n, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| **c == op).count()
    }

    pub fn stored(&self) -> Vec<Event> {
        self.events.lock().unwrap().values().cloned().collect()
    }

    /// Seed an event directly, bypassing the call log.
    pub fn seed(&self, event: Event) {
        self.events.lock().unwrap().insert(event.id.clone(), event);
    }

    fn enter(&self, op: &'static str) -> DecacalResult<()> {
        self.calls.lock().unwrap().push(op);
        if self.offline.load(Ordering::SeqCst) {
            return Err(DecacalError::Transient("fake backend is offline".into()));
        }
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(DecacalError::Transient("injected failure".into()));
        }
        Ok(())
    }
}

impl Backend for FakeBackend {
    async fn fetch_month(&self, year: i32, month: u32) -> DecacalResult<MonthFetch> {
        self.enter("fetch_month")?;
        let events = self
            .events
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.year == year && e.month == month)
            .cloned()
            .collect();
        Ok(MonthFetch::fresh(events))
    }

    async fn get_event(&self, id: &str) -> DecacalResult<Event> {
        self.enter("get_event")?;
        self.events
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| DecacalError::NotFound(id.to_string()))
    }

    async fn create_event(&self, event: &NewEvent) -> DecacalResult<Event> {
        self.enter("create_event")?;
        let date = event.date();
        if self.events.lock().unwrap().values().any(|e| e.date() == date) {
            return Err(DecacalError::Validation(format!(
                "An event already exists on {date}"
            )));
        }
        let id = format!("fake-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let created = Event {
            id: id.clone(),
            year: event.year,
            month: event.month,
            day: event.day,
            note: event.note.clone(),
            kind: event.kind,
            created_at: None,
            updated_at: None,
        };
        self.events.lock().unwrap().insert(id, created.clone());

        let lost = self.acks_lost.load(Ordering::SeqCst);
        if lost > 0 {
            self.acks_lost.store(lost - 1, Ordering::SeqCst);
            return Err(DecacalError::Transient("response lost".into()));
        }
        Ok(created)
    }

    async fn update_event(&self, id: &str, patch: &EventPatch) -> DecacalResult<Event> {
        self.enter("update_event")?;
        let mut events = self.events.lock().unwrap();
        let event = events
            .get_mut(id)
            .ok_or_else(|| DecacalError::NotFound(id.to_string()))?;
        if let Some(note) = &patch.note {
            event.note = note.clone();
        }
        if let Some(kind) = patch.kind {
            event.kind = kind;
        }
        Ok(event.clone())
    }

    async fn delete_event(&self, id: &str) -> DecacalResult<()> {
        self.enter("delete_event")?;
        self.events
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DecacalError::NotFound(id.to_string()))
    }

    async fn get_today(&self) -> DecacalResult<Option<CustomDate>> {
        self.enter("get_today")?;
        Ok(*self.today.lock().unwrap())
    }

    async fn set_today(&self, date: &CustomDate) -> DecacalResult<()> {
        self.enter("set_today")?;
        *self.today.lock().unwrap() = Some(*date);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
