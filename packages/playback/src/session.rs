//! The playback state machine.
//!
//! A session walks the buckets of a [`TemporalIndex`] in display order.
//! Each tick reveals one bucket and folds its records into the accumulated
//! set, skipping identities that were already revealed. The session has no
//! timer of its own; see [`crate::controller`] for that.

use serde::Serialize;
use shelter_map_analytics::{RecordArena, TemporalIndex};
use shelter_map_analytics_models::{BucketView, SexTally, SpeciesTally};
use shelter_map_source_models::{MonthKey, ResolvedRecord};

use crate::{PlaybackError, PlaybackState};

/// How [`PlaybackSession::start`] treats existing progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartMode {
    /// Rewind to the first bucket with an empty accumulator.
    #[default]
    Fresh,
    /// Continue from a paused session. Behaves as `Fresh` from `Idle`.
    Resume,
}

/// One revealed bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketReveal {
    /// Position of the bucket in the sorted key list.
    pub index: usize,
    /// Bucket key.
    pub month_key: MonthKey,
    /// Display label, e.g. `"Maggio 2023"`.
    pub label: String,
    /// Records of this bucket whose identity was not revealed before.
    pub new_records: Vec<ResolvedRecord>,
    /// Size of the accumulated set after this bucket.
    pub accumulated_total: usize,
    /// Species counts over the accumulated set.
    pub species: SpeciesTally,
    /// Sex counts over the accumulated set.
    pub sex: SexTally,
}

/// Result of one [`PlaybackSession::tick`].
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The bucket at the previous index was revealed.
    Revealed(BucketReveal),
    /// Every bucket has been revealed; the session is now stopped.
    EndOfData,
}

/// Playback state for one view: where it is in the timeline and what it
/// has revealed so far.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    timeline: TemporalIndex,
    state: PlaybackState,
    current_index: usize,
    accumulated: RecordArena,
    species: SpeciesTally,
    sex: SexTally,
}

impl PlaybackSession {
    /// An idle session over `timeline`.
    #[must_use]
    pub fn new(timeline: TemporalIndex) -> Self {
        Self {
            timeline,
            state: PlaybackState::Idle,
            current_index: 0,
            accumulated: RecordArena::new(),
            species: SpeciesTally::default(),
            sex: SexTally::default(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Index of the next bucket a tick would reveal. Never exceeds
    /// [`Self::bucket_count`].
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// Number of buckets in the timeline.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.timeline.len()
    }

    /// Records revealed so far, one per identity.
    #[must_use]
    pub const fn accumulated(&self) -> &RecordArena {
        &self.accumulated
    }

    /// The timeline being played.
    #[must_use]
    pub const fn timeline(&self) -> &TemporalIndex {
        &self.timeline
    }

    /// Arms the session for ticking.
    ///
    /// Unless resuming a paused session, the index rewinds to 0 and the
    /// accumulator is emptied. No bucket is revealed here.
    ///
    /// # Errors
    ///
    /// * [`PlaybackError::EmptyTimeline`] if there is nothing to play
    pub fn start(&mut self, mode: StartMode) -> Result<(), PlaybackError> {
        if self.timeline.is_empty() {
            return Err(PlaybackError::EmptyTimeline);
        }

        let resume = mode == StartMode::Resume && self.state != PlaybackState::Idle;
        if !resume {
            self.rewind();
        }
        self.state = PlaybackState::Playing;
        log::debug!(
            "Playback started at bucket {}/{} ({mode:?})",
            self.current_index,
            self.bucket_count()
        );
        Ok(())
    }

    /// Reveals the bucket at the current index and advances, or reports
    /// end of data and stops.
    ///
    /// # Errors
    ///
    /// * [`PlaybackError::InvalidTransition`] unless playing
    pub fn tick(&mut self) -> Result<TickOutcome, PlaybackError> {
        if self.state != PlaybackState::Playing {
            return Err(PlaybackError::InvalidTransition {
                operation: "tick",
                state: self.state,
            });
        }

        let Some((key, records)) = self.timeline.bucket_at(self.current_index) else {
            self.state = PlaybackState::Stopped;
            log::debug!("Playback reached end of data");
            return Ok(TickOutcome::EndOfData);
        };

        let new_records: Vec<ResolvedRecord> = self
            .accumulated
            .extend_new(records)
            .into_iter()
            .cloned()
            .collect();
        for record in &new_records {
            self.species.add(record.species_key);
            self.sex.add(record.sex);
        }

        let reveal = BucketReveal {
            index: self.current_index,
            month_key: key.clone(),
            label: key.label_it(),
            new_records,
            accumulated_total: self.accumulated.len(),
            species: self.species.clone(),
            sex: self.sex,
        };
        self.current_index += 1;

        Ok(TickOutcome::Revealed(reveal))
    }

    /// Pauses the session. From `Idle` this opens a paused session at the
    /// first bucket. Calling it again is harmless.
    ///
    /// With `snap`, the index is clamped onto the last bucket and the single
    /// bucket there is returned for display instead of the accumulated set.
    pub fn stop(&mut self, snap: bool) -> Option<BucketView> {
        self.state = PlaybackState::Stopped;
        if !snap {
            return None;
        }
        self.current_index = self
            .current_index
            .min(self.bucket_count().saturating_sub(1));
        self.timeline.view_at(self.current_index)
    }

    /// Steps a paused session by `delta` buckets, clamped to the timeline,
    /// and returns the single bucket there.
    ///
    /// # Errors
    ///
    /// * [`PlaybackError::InvalidTransition`] unless stopped
    /// * [`PlaybackError::EmptyTimeline`] if there are no buckets
    pub fn navigate(&mut self, delta: isize) -> Result<BucketView, PlaybackError> {
        if self.state != PlaybackState::Stopped {
            return Err(PlaybackError::InvalidTransition {
                operation: "navigate",
                state: self.state,
            });
        }

        let last = self
            .bucket_count()
            .checked_sub(1)
            .ok_or(PlaybackError::EmptyTimeline)?;
        self.current_index = self.current_index.saturating_add_signed(delta).min(last);
        self.timeline
            .view_at(self.current_index)
            .ok_or(PlaybackError::EmptyTimeline)
    }

    /// Back to `Idle` with nothing revealed.
    pub fn reset(&mut self) {
        self.rewind();
        self.state = PlaybackState::Idle;
    }

    fn rewind(&mut self) {
        self.current_index = 0;
        self.accumulated.clear();
        self.species = SpeciesTally::default();
        self.sex = SexTally::default();
    }
}
