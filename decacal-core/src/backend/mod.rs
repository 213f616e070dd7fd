//! Persistence backends behind the event store.
//!
//! - `local`: JSON files in the data directory
//! - `remote`: the decacal REST API
//! - `fallback`: remote, with a local mirror that serves reads while the
//!   remote is unreachable

pub mod fallback;
pub mod local;
pub mod remote;

#[cfg(test)]
pub(crate) mod fake;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::date::CustomDate;
use crate::error::DecacalResult;
use crate::event::{Event, EventPatch, NewEvent};

pub use fallback::FallbackBackend;
pub use local::LocalBackend;
pub use remote::RemoteBackend;

/// One month of events as a backend returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthFetch {
    pub events: Vec<Event>,
    /// False when served from a local copy because the backend of record
    /// was unreachable. Such results must not be cached.
    pub authoritative: bool,
}

impl MonthFetch {
    pub fn fresh(events: Vec<Event>) -> Self {
        MonthFetch {
            events,
            authoritative: true,
        }
    }

    pub fn stale(events: Vec<Event>) -> Self {
        MonthFetch {
            events,
            authoritative: false,
        }
    }
}

/// What the event store needs from a persistence layer.
///
/// Every write is acknowledged by returning `Ok`; the store only touches
/// its cache afterwards.
#[allow(async_fn_in_trait)]
pub trait Backend {
    /// All events in one month, in any order.
    async fn fetch_month(&self, year: i32, month: u32) -> DecacalResult<MonthFetch>;

    async fn get_event(&self, id: &str) -> DecacalResult<Event>;

    /// Create an event; the backend assigns the id.
    async fn create_event(&self, event: &NewEvent) -> DecacalResult<Event>;

    async fn update_event(&self, id: &str, patch: &EventPatch) -> DecacalResult<Event>;

    async fn delete_event(&self, id: &str) -> DecacalResult<()>;

    /// The persisted "today", if one was ever saved.
    async fn get_today(&self) -> DecacalResult<Option<CustomDate>>;

    async fn set_today(&self, date: &CustomDate) -> DecacalResult<()>;

    /// Non-fatal problems noticed since the last call, e.g. corrupt data.
    fn take_warnings(&self) -> Vec<String> {
        Vec::new()
    }

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    #[default]
    Local,
    Remote,
    Fallback,
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            BackendMode::Local => "local",
            BackendMode::Remote => "remote",
            BackendMode::Fallback => "fallback",
        })
    }
}

/// The backend chosen at startup from configuration.
pub enum AnyBackend {
    Local(LocalBackend),
    Remote(RemoteBackend),
    Fallback(FallbackBackend),
}

impl AnyBackend {
    pub fn mode(&self) -> BackendMode {
        match self {
            AnyBackend::Local(_) => BackendMode::Local,
            AnyBackend::Remote(_) => BackendMode::Remote,
            AnyBackend::Fallback(_) => BackendMode::Fallback,
        }
    }
}

impl Backend for AnyBackend {
    async fn fetch_month(&self, year: i32, month: u32) -> DecacalResult<MonthFetch> {
        match self {
            AnyBackend::Local(b) => b.fetch_month(year, month).await,
            AnyBackend::Remote(b) => b.fetch_month(year, month).await,
            AnyBackend::Fallback(b) => b.fetch_month(year, month).await,
        }
    }

    async fn get_event(&self, id: &str) -> DecacalResult<Event> {
        match self {
            AnyBackend::Local(b) => b.get_event(id).await,
            AnyBackend::Remote(b) => b.get_event(id).await,
            AnyBackend::Fallback(b) => b.get_event(id).await,
        }
    }

    async fn create_event(&self, event: &NewEvent) -> DecacalResult<Event> {
        match self {
            AnyBackend::Local(b) => b.create_event(event).await,
            AnyBackend::Remote(b) => b.create_event(event).await,
            AnyBackend::Fallback(b) => b.create_event(event).await,
        }
    }

    async fn update_event(&self, id: &str, patch: &EventPatch) -> DecacalResult<Event> {
        match self {
            AnyBackend::Local(b) => b.update_event(id, patch).await,
            AnyBackend::Remote(b) => b.update_event(id, patch).await,
            AnyBackend::Fallback(b) => b.update_event(id, patch).await,
        }
    }

    async fn delete_event(&self, id: &str) -> DecacalResult<()> {
        match self {
            AnyBackend::Local(b) => b.delete_event(id).await,
            AnyBackend::Remote(b) => b.delete_event(id).await,
            AnyBackend::Fallback(b) => b.delete_event(id).await,
        }
    }

    async fn get_today(&self) -> DecacalResult<Option<CustomDate>> {
        match self {
            AnyBackend::Local(b) => b.get_today().await,
            AnyBackend::Remote(b) => b.get_today().await,
            AnyBackend::Fallback(b) => b.get_today().await,
        }
    }

    async fn set_today(&self, date: &CustomDate) -> DecacalResult<()> {
        match self {
            AnyBackend::Local(b) => b.set_today(date).await,
            AnyBackend::Remote(b) => b.set_today(date).await,
            AnyBackend::Fallback(b) => b.set_today(date).await,
        }
    }

    fn take_warnings(&self) -> Vec<String> {
        match self {
            AnyBackend::Local(b) => b.take_warnings(),
            AnyBackend::Remote(b) => b.take_warnings(),
            AnyBackend::Fallback(b) => b.take_warnings(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AnyBackend::Local(b) => b.name(),
            AnyBackend::Remote(b) => b.name(),
            AnyBackend::Fallback(b) => b.name(),
        }
    }
}
