#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Month-by-month playback of a [`TemporalIndex`].
//!
//! [`PlaybackSession`] is the synchronous state machine. [`PlaybackController`]
//! drives one session from a tokio task on a recurring timer and publishes
//! what it reveals. [`TimelineView`] owns the data loading that feeds a
//! session and discards fetches that resolve after the view moved on.
//!
//! [`TemporalIndex`]: shelter_map_analytics::TemporalIndex

pub mod controller;
pub mod session;
pub mod view;

use serde::Serialize;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

pub use controller::{PlaybackConfig, PlaybackController, PlaybackEvent, SessionSnapshot};
pub use session::{BucketReveal, PlaybackSession, StartMode, TickOutcome};
pub use view::{LoadTicket, PendingLoad, TimelineView, ViewStatus};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlaybackState {
    /// No session.
    #[default]
    Idle,
    /// Timer armed, auto-advancing.
    Playing,
    /// Paused at the current index.
    Stopped,
}

/// Errors that can occur while driving playback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The operation is not allowed in the session's current state.
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        /// Rejected operation.
        operation: &'static str,
        /// State the session was in.
        state: PlaybackState,
    },

    /// The timeline has no buckets to play or show.
    #[error("timeline has no buckets")]
    EmptyTimeline,

    /// A tick interval of zero was requested.
    #[error("tick interval must be greater than zero")]
    ZeroInterval,

    /// The controller task has ended.
    #[error("playback controller has shut down")]
    ControllerClosed,
}
