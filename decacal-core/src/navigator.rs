//! Viewed-month cursor and the user's "today".

use std::sync::Arc;

use tracing::warn;

use crate::backend::Backend;
use crate::calendar::CalendarSpec;
use crate::date::{CustomDate, Direction, MonthCursor};
use crate::error::DecacalResult;
use crate::event::MonthEvents;
use crate::grid::MonthGrid;
use crate::store::EventStore;

/// Owns the viewed month and "today". `today` only changes through
/// [`DateNavigator::set_today`], after the backend has saved it.
#[derive(Debug, Clone)]
pub struct DateNavigator {
    spec: Arc<CalendarSpec>,
    viewed: MonthCursor,
    today: CustomDate,
}

impl DateNavigator {
    /// Start on `today`'s month.
    pub fn new(spec: Arc<CalendarSpec>, today: CustomDate) -> DecacalResult<Self> {
        spec.validate(&today)?;
        Ok(DateNavigator {
            viewed: today.cursor(),
            today,
            spec,
        })
    }

    /// Startup: today comes from the backend, or `default_today` if none
    /// was saved or the backend could not be read.
    pub async fn load<B: Backend>(
        store: &EventStore<B>,
        default_today: CustomDate,
    ) -> DecacalResult<Self> {
        let today = match store.load_today().await {
            Ok(Some(today)) => today,
            Ok(None) => default_today,
            Err(e) => {
                warn!(error = %e, "could not read current date, using default");
                default_today
            }
        };
        Self::new(store.spec().clone(), today)
    }

    pub fn today(&self) -> CustomDate {
        self.today
    }

    pub fn cursor(&self) -> MonthCursor {
        self.viewed
    }

    pub fn spec(&self) -> &CalendarSpec {
        &self.spec
    }

    pub fn navigate(&mut self, direction: Direction) {
        let (month, year) = self
            .spec
            .advance_month(self.viewed.month, self.viewed.year, direction);
        self.viewed = MonthCursor { year, month };
    }

    /// Move by `offset` months; negative goes back.
    pub fn navigate_by(&mut self, offset: i32) {
        let direction = if offset < 0 {
            Direction::Prev
        } else {
            Direction::Next
        };
        for _ in 0..offset.unsigned_abs() {
            self.navigate(direction);
        }
    }

    pub fn jump_to(&mut self, month: u32, year: i32) -> DecacalResult<()> {
        self.spec.validate(&CustomDate { year, month, day: 1 })?;
        self.viewed = MonthCursor { year, month };
        Ok(())
    }

    /// Validate and save a new "today", then show its month. Nothing
    /// changes here unless the backend acknowledged the write.
    pub async fn set_today<B: Backend>(
        &mut self,
        store: &EventStore<B>,
        candidate: CustomDate,
    ) -> DecacalResult<()> {
        self.spec.validate(&candidate)?;
        store.persist_today(&candidate).await?;
        self.today = candidate;
        self.viewed = candidate.cursor();
        Ok(())
    }

    /// Grid for `cursor`, or `None` if the view has moved on since the
    /// events were requested.
    pub fn grid_for(
        &self,
        cursor: MonthCursor,
        events: &MonthEvents,
    ) -> DecacalResult<Option<MonthGrid>> {
        if cursor != self.viewed {
            return Ok(None);
        }
        self.spec
            .expand_month(cursor.month, cursor.year, &self.today, events)
            .map(Some)
    }

    /// Fetch and expand the viewed month.
    pub async fn current_grid<B: Backend>(&self, store: &EventStore<B>) -> DecacalResult<MonthGrid> {
        let events = store.get_month(self.viewed.year, self.viewed.month).await;
        self.spec
            .expand_month(self.viewed.month, self.viewed.year, &self.today, &events)
    }
}
