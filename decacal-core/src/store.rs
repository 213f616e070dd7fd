//! The event store: one event per date, cached per month.
//!
//! The cache is write-through. Nothing in it changes until the backend
//! has acknowledged the write, so a failed or abandoned call leaves the
//! backend as the only source of truth.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::calendar::CalendarSpec;
use crate::date::{CustomDate, month_key};
use crate::error::{DecacalError, DecacalResult};
use crate::event::{Event, EventKind, EventPatch, MonthEvents, NewEvent, validate_note};

/// How transient write failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub extra_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            extra_attempts: 1,
            delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy {
            extra_attempts: 0,
            delay: Duration::ZERO,
        }
    }
}

/// Counts an in-flight backend call for as long as it lives.
struct BusyGuard<'a>(&'a AtomicUsize);

impl<'a> BusyGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        BusyGuard(counter)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// What [`EventStore::save`] did to the date.
#[derive(Debug, Clone, PartialEq)]
pub enum Upsert {
    Created(Event),
    Updated(Event),
}

impl Upsert {
    pub fn event(&self) -> &Event {
        match self {
            Upsert::Created(event) | Upsert::Updated(event) => event,
        }
    }

    pub fn into_event(self) -> Event {
        match self {
            Upsert::Created(event) | Upsert::Updated(event) => event,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Upsert::Created(_))
    }
}

pub struct EventStore<B> {
    backend: B,
    spec: Arc<CalendarSpec>,
    retry: RetryPolicy,
    cache: Mutex<HashMap<String, MonthEvents>>,
    in_flight: AtomicUsize,
}

impl<B: Backend> EventStore<B> {
    pub fn new(backend: B, spec: Arc<CalendarSpec>) -> Self {
        EventStore {
            backend,
            spec,
            retry: RetryPolicy::default(),
            cache: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn spec(&self) -> &Arc<CalendarSpec> {
        &self.spec
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// True while any backend call is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Non-fatal warnings the backend has reported since the last call.
    pub fn take_warnings(&self) -> Vec<String> {
        self.backend.take_warnings()
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, MonthEvents>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn invalidate(&self, year: i32, month: u32) {
        self.cache().remove(&month_key(year, month));
    }

    pub fn invalidate_all(&self) {
        self.cache().clear();
    }

    /// Events of a month keyed by day.
    ///
    /// Never fails: a backend error yields the last cached copy, or an
    /// empty month if there is none.
    pub async fn get_month(&self, year: i32, month: u32) -> MonthEvents {
        if let Err(e) = self.spec.validate_month(month) {
            warn!(year, month, error = %e, "ignoring request for invalid month");
            return MonthEvents::new();
        }

        let key = month_key(year, month);
        if let Some(events) = self.cache().get(&key) {
            debug!(key = %key, "month cache hit");
            return events.clone();
        }

        match self.fetch_month(year, month).await {
            Ok((events, _)) => events,
            Err(e) => {
                warn!(key = %key, error = %e, "could not load month, showing cached data");
                self.cache().get(&key).cloned().unwrap_or_default()
            }
        }
    }

    pub async fn event_at(&self, date: &CustomDate) -> Option<Event> {
        self.get_month(date.year, date.month).await.remove(&date.day)
    }

    /// Look up one event by id, straight from the backend.
    pub async fn get_event(&self, id: &str) -> DecacalResult<Event> {
        let _busy = BusyGuard::enter(&self.in_flight);
        self.backend.get_event(id).await
    }

    /// Save the note for a date: an update if the date already has an
    /// event (keeping its id), a create otherwise.
    pub async fn upsert(&self, date: &CustomDate, note: &str, kind: EventKind) -> DecacalResult<Event> {
        self.save(date, note, kind).await.map(Upsert::into_event)
    }

    /// [`EventStore::upsert`], also telling which of the two happened.
    pub async fn save(&self, date: &CustomDate, note: &str, kind: EventKind) -> DecacalResult<Upsert> {
        self.spec.validate(date)?;
        let note = validate_note(note)?;

        let existing = self.month_for_write(date.year, date.month).await?.remove(&date.day);

        let saved = match existing {
            Some(current) => {
                let patch = EventPatch {
                    note: Some(note),
                    kind: Some(kind),
                };
                let updated = self
                    .retrying("update_event", || self.backend.update_event(&current.id, &patch))
                    .await?;
                info!(date = %date, id = %updated.id, "event updated");
                Upsert::Updated(updated)
            }
            None => {
                let new = NewEvent::new(*date, note, kind);
                let created = self.create(&new).await?;
                info!(date = %date, id = %created.id, "event created");
                Upsert::Created(created)
            }
        };

        if let Some(events) = self.cache().get_mut(&date.month_key()) {
            events.insert(date.day, saved.event().clone());
        }

        Ok(saved)
    }

    /// Delete the event on a date. Returns what was removed.
    pub async fn remove(&self, date: &CustomDate) -> DecacalResult<Event> {
        self.spec.validate(date)?;

        let existing = self
            .month_for_write(date.year, date.month)
            .await?
            .remove(&date.day)
            .ok_or_else(|| DecacalError::NotFound(format!("No event on {date}")))?;

        self.retrying("delete_event", || self.backend.delete_event(&existing.id))
            .await?;
        info!(date = %date, id = %existing.id, "event deleted");

        if let Some(events) = self.cache().get_mut(&date.month_key()) {
            events.remove(&date.day);
        }

        Ok(existing)
    }

    /// The persisted "today", dropped with a warning if it no longer fits
    /// the configured calendar.
    pub async fn load_today(&self) -> DecacalResult<Option<CustomDate>> {
        let today = {
            let _busy = BusyGuard::enter(&self.in_flight);
            self.backend.get_today().await?
        };

        match today {
            Some(date) => match self.spec.validate(&date) {
                Ok(()) => Ok(Some(date)),
                Err(e) => {
                    warn!(date = %date, error = %e, "stored current date is outside the calendar");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub async fn persist_today(&self, date: &CustomDate) -> DecacalResult<()> {
        self.spec.validate(date)?;
        self.retrying("set_today", || self.backend.set_today(date))
            .await?;
        info!(date = %date, "current date saved");
        Ok(())
    }

    /// Cached month, or a fresh fetch. Unlike [`EventStore::get_month`],
    /// fetch errors are returned, and so is a month only a local copy
    /// could answer for.
    async fn month_for_write(&self, year: i32, month: u32) -> DecacalResult<MonthEvents> {
        if let Some(events) = self.cache().get(&month_key(year, month)) {
            return Ok(events.clone());
        }
        match self.fetch_month(year, month).await? {
            (events, true) => Ok(events),
            (_, false) => Err(DecacalError::Transient(format!(
                "Events for {} could not be confirmed with the backend",
                month_key(year, month)
            ))),
        }
    }

    /// The month's events and whether they are authoritative. Only
    /// authoritative months are cached.
    async fn fetch_month(&self, year: i32, month: u32) -> DecacalResult<(MonthEvents, bool)> {
        let fetched = {
            let _busy = BusyGuard::enter(&self.in_flight);
            self.backend.fetch_month(year, month).await?
        };
        debug!(
            year,
            month,
            count = fetched.events.len(),
            authoritative = fetched.authoritative,
            backend = self.backend.name(),
            "fetched month"
        );

        let mut events = MonthEvents::new();
        for event in fetched.events {
            if event.year != year || event.month != month {
                warn!(id = %event.id, "backend returned an event from another month");
                continue;
            }
            if events.contains_key(&event.day) {
                warn!(id = %event.id, day = event.day, "backend returned two events for one day, keeping the first");
                continue;
            }
            events.insert(event.day, event);
        }

        if fetched.authoritative {
            self.cache().insert(month_key(year, month), events.clone());
        }
        Ok((events, fetched.authoritative))
    }

    /// Create `new`, retrying transient failures. A failed attempt may
    /// still have landed, so the day is re-read before each retry and
    /// after a retry is refused; an event found there is adopted.
    async fn create(&self, new: &NewEvent) -> DecacalResult<Event> {
        let _busy = BusyGuard::enter(&self.in_flight);
        let mut attempt = 0;
        loop {
            match self.backend.create_event(new).await {
                Ok(created) => return Ok(created),
                Err(e) if e.is_transient() && attempt < self.retry.extra_attempts => {
                    attempt += 1;
                    warn!(op = "create_event", attempt, error = %e, "transient backend failure, retrying");
                    tokio::time::sleep(self.retry.delay).await;
                    if let Some(existing) = self.landed(new).await {
                        return self.adopt(existing, new).await;
                    }
                }
                Err(e) if e.is_validation() && attempt > 0 => {
                    return match self.landed(new).await {
                        Some(existing) => self.adopt(existing, new).await,
                        None => Err(e),
                    };
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// The event now on `new`'s date, if the backend can say for sure.
    async fn landed(&self, new: &NewEvent) -> Option<Event> {
        match self.backend.fetch_month(new.year, new.month).await {
            Ok(fetched) if fetched.authoritative => {
                fetched.events.into_iter().find(|e| e.day == new.day)
            }
            _ => None,
        }
    }

    async fn adopt(&self, existing: Event, new: &NewEvent) -> DecacalResult<Event> {
        if existing.note == new.note && existing.kind == new.kind {
            info!(id = %existing.id, "earlier create attempt had landed");
            return Ok(existing);
        }
        let patch = EventPatch {
            note: Some(new.note.clone()),
            kind: Some(new.kind),
        };
        self.retrying("update_event", || self.backend.update_event(&existing.id, &patch))
            .await
    }

    async fn retrying<T, F, Fut>(&self, op: &'static str, mut call: F) -> DecacalResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = DecacalResult<T>>,
    {
        let _busy = BusyGuard::enter(&self.in_flight);
        let mut attempt = 0;
        loop {
            match call().await {
                Err(e) if e.is_transient() && attempt < self.retry.extra_attempts => {
                    attempt += 1;
                    warn!(op, attempt, error = %e, "transient backend failure, retrying");
                    tokio::time::sleep(self.retry.delay).await;
                }
                result => return result,
            }
        }
    }
}
