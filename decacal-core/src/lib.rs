//! Core of decacal: a custom calendar with ten-day weeks.
//!
//! - `calendar` and `grid`: weekday lookup, validation, month rollover and
//!   the per-month day grid
//! - `navigator`: the viewed month and the user's "today"
//! - `store`: at most one event per date, cached per month, written
//!   through to a pluggable `backend`
//! - `config`: loading the calendar shape and backend choice

pub mod backend;
pub mod calendar;
pub mod config;
pub mod date;
pub mod error;
pub mod event;
pub mod grid;
pub mod navigator;
pub mod store;

pub use backend::{AnyBackend, Backend, BackendMode, MonthFetch};
pub use calendar::CalendarSpec;
pub use config::DecacalConfig;
pub use date::{CustomDate, Direction, MonthCursor};
pub use error::{DateError, DecacalError, DecacalResult};
pub use event::{Event, EventKind, EventPatch, MonthEvents, NewEvent};
pub use grid::{DayCell, MonthGrid};
pub use navigator::DateNavigator;
pub use store::{EventStore, RetryPolicy, Upsert};
