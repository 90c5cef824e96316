//! Data loading for a timeline view.
//!
//! Every load gets a [`LoadTicket`] from a per-view generation counter.
//! Starting another load or resetting the view bumps the generation and
//! aborts the fetch in flight, and a result that arrives with an old ticket
//! is dropped without touching the view.

use std::sync::Arc;

use serde::Serialize;
use shelter_map_analytics::{RecordResolver, TemporalIndex};
use shelter_map_source::{FeatureSource, SourceError};
use shelter_map_source_models::RawFeatureCollection;
use tokio::task::{AbortHandle, JoinError, JoinHandle};

/// Identifies one load of a [`TimelineView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

/// What a load did to the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViewStatus {
    /// The timeline was replaced.
    Ready { buckets: usize },
    /// The source returned no features; the view is unchanged.
    NoData,
    /// The fetch failed; the view is unchanged.
    Failed { message: String },
    /// The view moved on before the result arrived; it was discarded.
    Stale,
}

/// A fetch running in the background.
#[derive(Debug)]
pub struct PendingLoad {
    ticket: LoadTicket,
    task: JoinHandle<Result<RawFeatureCollection, SourceError>>,
}

impl PendingLoad {
    #[must_use]
    pub const fn ticket(&self) -> LoadTicket {
        self.ticket
    }
}

/// Owns the timeline one view plays and the fetch that fills it.
#[derive(Debug, Default)]
pub struct TimelineView {
    resolver: RecordResolver,
    generation: u64,
    in_flight: Option<AbortHandle>,
    timeline: Option<TemporalIndex>,
}

impl TimelineView {
    #[must_use]
    pub fn new(resolver: RecordResolver) -> Self {
        Self {
            resolver,
            ..Self::default()
        }
    }

    /// The loaded timeline, if any.
    #[must_use]
    pub const fn timeline(&self) -> Option<&TemporalIndex> {
        self.timeline.as_ref()
    }

    /// Whether `ticket` belongs to the latest load.
    #[must_use]
    pub const fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Spawns a fetch from `source`, superseding any load in flight.
    pub fn begin_load(&mut self, source: Arc<dyn FeatureSource>) -> PendingLoad {
        self.invalidate();
        let ticket = LoadTicket(self.generation);
        log::debug!("Loading {} (generation {})", source.id(), ticket.0);

        let task = tokio::spawn(async move { source.fetch().await });
        self.in_flight = Some(task.abort_handle());
        PendingLoad { ticket, task }
    }

    /// Waits for `pending` and applies its result.
    pub async fn finish_load(&mut self, pending: PendingLoad) -> ViewStatus {
        let PendingLoad { ticket, task } = pending;
        match task.await {
            Ok(result) => self.apply(ticket, result),
            Err(e) => self.abandon(ticket, &e),
        }
    }

    /// Fetches from `source` and applies the result.
    pub async fn load(&mut self, source: Arc<dyn FeatureSource>) -> ViewStatus {
        let pending = self.begin_load(source);
        self.finish_load(pending).await
    }

    /// Applies a fetch result obtained under `ticket`.
    pub fn apply(
        &mut self,
        ticket: LoadTicket,
        result: Result<RawFeatureCollection, SourceError>,
    ) -> ViewStatus {
        if !self.is_current(ticket) {
            log::warn!(
                "Discarding result of load {} (view is at {})",
                ticket.0,
                self.generation
            );
            return ViewStatus::Stale;
        }
        self.in_flight = None;

        match result {
            Err(e) => {
                log::warn!("Load {} failed: {e}", ticket.0);
                ViewStatus::Failed {
                    message: e.to_string(),
                }
            }
            Ok(collection) if collection.is_empty() => {
                log::info!("Load {} returned no features", ticket.0);
                ViewStatus::NoData
            }
            Ok(collection) => {
                let timeline = TemporalIndex::build(self.resolver.resolve_all(collection));
                let buckets = timeline.len();
                log::info!(
                    "Loaded {} records into {buckets} months",
                    timeline.record_count()
                );
                self.timeline = Some(timeline);
                ViewStatus::Ready { buckets }
            }
        }
    }

    /// Cancels any load in flight and drops the timeline.
    pub fn reset(&mut self) {
        self.invalidate();
        self.timeline = None;
    }

    fn invalidate(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        self.generation += 1;
    }

    fn abandon(&mut self, ticket: LoadTicket, error: &JoinError) -> ViewStatus {
        if error.is_cancelled() {
            return ViewStatus::Stale;
        }
        log::error!("Load {} task failed: {error}", ticket.0);
        if self.is_current(ticket) {
            self.in_flight = None;
            ViewStatus::Failed {
                message: error.to_string(),
            }
        } else {
            ViewStatus::Stale
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    struct StubSource {
        delay: Duration,
        result: fn() -> Result<RawFeatureCollection, SourceError>,
    }

    #[async_trait]
    impl FeatureSource for StubSource {
        fn id(&self) -> &str {
            "stub"
        }

        async fn fetch(&self) -> Result<RawFeatureCollection, SourceError> {
            tokio::time::sleep(self.delay).await;
            (self.result)()
        }
    }

    fn two_months() -> Result<RawFeatureCollection, SourceError> {
        Ok(RawFeatureCollection::from_json_value(json!({
            "type": "FeatureCollection",
            "features": [
                {"geometry": {"type": "Point", "coordinates": [12.5, 41.9]},
                 "properties": {"name": "Rex", "species": "cane", "date": "2023-01-05"}},
                {"geometry": {"type": "Point", "coordinates": [12.6, 41.8]},
                 "properties": {"name": "Tom", "species": "gatto", "date": "2023-03-09"}}
            ]
        })))
    }

    fn empty() -> Result<RawFeatureCollection, SourceError> {
        Ok(RawFeatureCollection::default())
    }

    fn broken() -> Result<RawFeatureCollection, SourceError> {
        Err(SourceError::Config {
            message: "backend unreachable".to_string(),
        })
    }

    fn source(
        delay_ms: u64,
        result: fn() -> Result<RawFeatureCollection, SourceError>,
    ) -> Arc<dyn FeatureSource> {
        Arc::new(StubSource {
            delay: Duration::from_millis(delay_ms),
            result,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn successful_load_builds_the_timeline() {
        let mut view = TimelineView::default();
        assert_eq!(
            view.load(source(10, two_months)).await,
            ViewStatus::Ready { buckets: 2 }
        );
        assert_eq!(view.timeline().unwrap().record_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_and_failed_loads_keep_the_timeline() {
        let mut view = TimelineView::default();
        view.load(source(0, two_months)).await;

        assert_eq!(view.load(source(0, empty)).await, ViewStatus::NoData);
        assert_eq!(view.timeline().unwrap().len(), 2);

        let status = view.load(source(0, broken)).await;
        assert_eq!(
            status,
            ViewStatus::Failed {
                message: "Configuration error: backend unreachable".to_string()
            }
        );
        assert_eq!(view.timeline().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_load_is_stale() {
        let mut view = TimelineView::default();
        let slow = view.begin_load(source(5_000, two_months));
        let fast = view.begin_load(source(10, empty));
        assert!(!view.is_current(slow.ticket()));
        assert!(view.is_current(fast.ticket()));

        assert_eq!(view.finish_load(slow).await, ViewStatus::Stale);
        assert!(view.timeline().is_none());
        assert_eq!(view.finish_load(fast).await, ViewStatus::NoData);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_discards_the_load_in_flight() {
        let mut view = TimelineView::default();
        let pending = view.begin_load(source(1_000, two_months));
        view.reset();

        assert_eq!(view.finish_load(pending).await, ViewStatus::Stale);
        assert!(view.timeline().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn late_result_with_old_ticket_is_ignored() {
        let mut view = TimelineView::default();
        view.load(source(0, two_months)).await;
        let pending = view.begin_load(source(0, two_months));
        let ticket = pending.ticket();
        view.reset();

        assert_eq!(view.apply(ticket, two_months()), ViewStatus::Stale);
        assert!(view.timeline().is_none());
    }
}
