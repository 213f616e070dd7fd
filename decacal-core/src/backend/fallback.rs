//! Remote backend with a local mirror.
//!
//! Writes only ever go to the remote; once acknowledged they are copied
//! into the local store. Reads prefer the remote and fall back to the
//! mirror when the remote is unreachable.

use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::backend::{Backend, LocalBackend, MonthFetch, RemoteBackend};
use crate::date::CustomDate;
use crate::error::{DecacalError, DecacalResult};
use crate::event::{Event, EventPatch, NewEvent};

pub struct FallbackBackend<R = RemoteBackend> {
    remote: R,
    local: LocalBackend,
    warnings: Mutex<Vec<String>>,
}

impl<R: Backend> FallbackBackend<R> {
    pub fn new(remote: R, local: LocalBackend) -> Self {
        FallbackBackend {
            remote,
            local,
            warnings: Mutex::new(Vec::new()),
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn local(&self) -> &LocalBackend {
        &self.local
    }

    fn degraded(&self, what: &str, err: &DecacalError) {
        warn!(error = %err, "remote unavailable, serving {} from local copy", what);
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("Server unreachable, showing locally saved {what}"));
    }

    fn mirror(&self, what: &str, result: DecacalResult<()>) {
        if let Err(e) = result {
            warn!(error = %e, "failed to mirror {} locally", what);
        }
    }
}

impl<R: Backend> Backend for FallbackBackend<R> {
    async fn fetch_month(&self, year: i32, month: u32) -> DecacalResult<MonthFetch> {
        match self.remote.fetch_month(year, month).await {
            Ok(fetched) => {
                if fetched.authoritative {
                    self.mirror("month", self.local.mirror_month(year, month, &fetched.events));
                }
                Ok(fetched)
            }
            Err(e) if e.is_transient() => {
                self.degraded("events", &e);
                Ok(MonthFetch::stale(self.local.events_in_month(year, month)))
            }
            Err(e) => Err(e),
        }
    }

    async fn get_event(&self, id: &str) -> DecacalResult<Event> {
        match self.remote.get_event(id).await {
            Ok(event) => Ok(event),
            Err(e) if e.is_transient() => match self.local.find(id) {
                Some(event) => {
                    self.degraded("event", &e);
                    Ok(event)
                }
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    async fn create_event(&self, event: &NewEvent) -> DecacalResult<Event> {
        let created = self.remote.create_event(event).await?;
        self.mirror("event", self.local.mirror_event(&created));
        Ok(created)
    }

    async fn update_event(&self, id: &str, patch: &EventPatch) -> DecacalResult<Event> {
        let updated = self.remote.update_event(id, patch).await?;
        self.mirror("event", self.local.mirror_event(&updated));
        Ok(updated)
    }

    async fn delete_event(&self, id: &str) -> DecacalResult<()> {
        self.remote.delete_event(id).await?;
        self.mirror("deletion", self.local.mirror_remove(id));
        Ok(())
    }

    async fn get_today(&self) -> DecacalResult<Option<CustomDate>> {
        match self.remote.get_today().await {
            Ok(Some(today)) => {
                if self.local.today() != Some(today) {
                    self.mirror("current date", self.local.store_today(&today));
                }
                Ok(Some(today))
            }
            Ok(None) => Ok(self.local.today()),
            Err(e) if e.is_transient() => {
                self.degraded("current date", &e);
                Ok(self.local.today())
            }
            Err(e) => Err(e),
        }
    }

    async fn set_today(&self, date: &CustomDate) -> DecacalResult<()> {
        self.remote.set_today(date).await?;
        self.mirror("current date", self.local.store_today(date));
        Ok(())
    }

    fn take_warnings(&self) -> Vec<String> {
        let mut warnings = self.local.take_warnings();
        warnings.extend(self.remote.take_warnings());
        warnings.extend(std::mem::take(
            &mut *self.warnings.lock().unwrap_or_else(PoisonError::into_inner),
        ));
        warnings
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::event::EventKind;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FallbackBackend<FakeBackend>) {
        let dir = TempDir::new().unwrap();
        let local = LocalBackend::open(dir.path()).unwrap();
        (dir, FallbackBackend::new(FakeBackend::new(), local))
    }

    fn meeting() -> NewEvent {
        NewEvent::new(
            CustomDate { year: 2025, month: 2, day: 12 },
            "Important meeting",
            EventKind::Event,
        )
    }

    #[tokio::test]
    async fn test_acknowledged_write_is_mirrored() {
        let (_dir, backend) = setup();
        let created = backend.create_event(&meeting()).await.unwrap();
        assert_eq!(backend.local().find(&created.id), Some(created));
    }

    #[tokio::test]
    async fn test_failed_write_never_touches_local() {
        let (_dir, backend) = setup();
        backend.remote().set_offline(true);

        let err = backend.create_event(&meeting()).await.unwrap_err();
        assert!(err.is_transient());
        assert!(backend.local().is_empty());

        let err = backend
            .set_today(&CustomDate { year: 2025, month: 2, day: 15 })
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(backend.local().today(), None);
    }

    #[tokio::test]
    async fn test_reads_fall_back_to_mirror_when_offline() {
        let (_dir, backend) = setup();
        let created = backend.create_event(&meeting()).await.unwrap();
        backend
            .set_today(&CustomDate { year: 2025, month: 2, day: 15 })
            .await
            .unwrap();

        backend.remote().set_offline(true);
        let fetched = backend.fetch_month(2025, 2).await.unwrap();
        assert_eq!(fetched, MonthFetch::stale(vec![created.clone()]));
        assert_eq!(
            backend.get_today().await.unwrap(),
            Some(CustomDate { year: 2025, month: 2, day: 15 })
        );
        assert_eq!(backend.get_event(&created.id).await.unwrap(), created);
        assert!(!backend.take_warnings().is_empty());
    }

    #[tokio::test]
    async fn test_remote_listing_refreshes_mirror() {
        let (_dir, backend) = setup();
        let created = backend.create_event(&meeting()).await.unwrap();

        // Deleted on the server by someone else.
        backend.remote().delete_event(&created.id).await.unwrap();
        let fetched = backend.fetch_month(2025, 2).await.unwrap();
        assert!(fetched.authoritative);
        assert!(fetched.events.is_empty());
        assert!(backend.local().is_empty());
    }

    #[tokio::test]
    async fn test_permanent_errors_pass_through() {
        let (_dir, backend) = setup();
        let err = backend.get_event("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(backend.take_warnings().is_empty());
    }
}
