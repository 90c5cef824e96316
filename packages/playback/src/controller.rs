//! Timer-driven playback.
//!
//! A [`PlaybackController`] owns one [`PlaybackSession`] inside a spawned
//! tokio task. The task is the only thing that touches the session: it
//! waits on either the next command or the next timer tick, so ticks and
//! commands never interleave. At most one interval exists at a time, and
//! replacing it (start, speed change) happens between ticks.

use std::time::Duration;

use shelter_map_analytics::TemporalIndex;
use shelter_map_analytics_models::BucketView;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::session::{BucketReveal, PlaybackSession, StartMode, TickOutcome};
use crate::{PlaybackError, PlaybackState};

/// Environment variable holding the tick interval in milliseconds.
pub const PLAYBACK_MS_ENV: &str = "SHELTER_MAP_PLAYBACK_MS";

/// Tick interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(800);

/// Playback settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    pub interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl PlaybackConfig {
    /// Reads [`PLAYBACK_MS_ENV`], falling back to [`DEFAULT_INTERVAL`] when
    /// unset, unparsable or zero.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(PLAYBACK_MS_ENV)
            .ok()
            .map_or_else(Self::default, |raw| Self::parse_millis(&raw))
    }

    fn parse_millis(raw: &str) -> Self {
        match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => Self {
                interval: Duration::from_millis(ms),
            },
            _ => {
                log::warn!("Ignoring {PLAYBACK_MS_ENV}={raw:?}, using {DEFAULT_INTERVAL:?}");
                Self::default()
            }
        }
    }
}

/// What the controller tells its consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A bucket was added to the accumulated set.
    BucketRevealed(BucketReveal),
    /// A single bucket to display in place of the accumulated set (after a
    /// snapping stop or a navigation step).
    BucketShown(BucketView),
    /// Every bucket has been revealed; the timer is gone.
    EndOfData,
    /// The session is back to `Idle`; derived view state should be cleared.
    SessionReset,
    /// A command was not valid in the current state.
    Rejected(PlaybackError),
}

/// Point-in-time view of the session, for status displays and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: PlaybackState,
    pub current_index: usize,
    pub bucket_count: usize,
    pub accumulated: usize,
    pub interval: Duration,
}

#[derive(Debug)]
enum Command {
    Start(StartMode),
    Stop { snap: bool },
    Navigate(isize),
    Reset,
    SetInterval(Duration),
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

/// Handle to a running playback task.
///
/// Dropping the handle aborts the task along with its timer.
#[derive(Debug)]
pub struct PlaybackController {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl PlaybackController {
    /// Spawns the playback task for `timeline` on the current runtime.
    ///
    /// Returns the handle and the event stream.
    ///
    /// # Errors
    ///
    /// * [`PlaybackError::ZeroInterval`] if `interval` is zero
    pub fn spawn(
        timeline: TemporalIndex,
        interval: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<PlaybackEvent>), PlaybackError> {
        if interval.is_zero() {
            return Err(PlaybackError::ZeroInterval);
        }

        let (commands, command_rx) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::unbounded_channel();
        let worker = PlaybackWorker {
            session: PlaybackSession::new(timeline),
            period: interval,
            ticker: None,
            events: event_tx,
        };
        let task = tokio::spawn(worker.run(command_rx));

        Ok((Self { commands, task }, events))
    }

    /// Starts (or restarts) playback. The first bucket is revealed
    /// immediately, the rest one per interval.
    ///
    /// # Errors
    ///
    /// * [`PlaybackError::ControllerClosed`] if the task has ended
    pub fn start(&self, mode: StartMode) -> Result<(), PlaybackError> {
        self.send(Command::Start(mode))
    }

    /// Pauses playback, optionally snapping to the single current bucket.
    ///
    /// # Errors
    ///
    /// * [`PlaybackError::ControllerClosed`] if the task has ended
    pub fn stop(&self, snap: bool) -> Result<(), PlaybackError> {
        self.send(Command::Stop { snap })
    }

    /// Steps a paused session by `delta` buckets.
    ///
    /// # Errors
    ///
    /// * [`PlaybackError::ControllerClosed`] if the task has ended
    pub fn navigate(&self, delta: isize) -> Result<(), PlaybackError> {
        self.send(Command::Navigate(delta))
    }

    /// Returns the session to `Idle`.
    ///
    /// # Errors
    ///
    /// * [`PlaybackError::ControllerClosed`] if the task has ended
    pub fn reset(&self) -> Result<(), PlaybackError> {
        self.send(Command::Reset)
    }

    /// Changes the tick interval. While playing, the timer is replaced and
    /// the next tick lands one new interval from now.
    ///
    /// # Errors
    ///
    /// * [`PlaybackError::ZeroInterval`] if `interval` is zero
    /// * [`PlaybackError::ControllerClosed`] if the task has ended
    pub fn set_interval(&self, interval: Duration) -> Result<(), PlaybackError> {
        if interval.is_zero() {
            return Err(PlaybackError::ZeroInterval);
        }
        self.send(Command::SetInterval(interval))
    }

    /// Current session state, after every previously sent command has been
    /// applied.
    ///
    /// # Errors
    ///
    /// * [`PlaybackError::ControllerClosed`] if the task has ended
    pub async fn snapshot(&self) -> Result<SessionSnapshot, PlaybackError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await.map_err(|_| PlaybackError::ControllerClosed)
    }

    fn send(&self, command: Command) -> Result<(), PlaybackError> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::ControllerClosed)
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct PlaybackWorker {
    session: PlaybackSession,
    period: Duration,
    ticker: Option<Interval>,
    events: mpsc::UnboundedSender<PlaybackEvent>,
}

impl PlaybackWorker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            tokio::select! {
                biased;

                command = commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    self.handle(command);
                }
                () = next_tick(self.ticker.as_mut()) => {
                    self.tick();
                }
            }
        }
        log::debug!("Playback task finished");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Start(mode) => {
                self.ticker = None;
                match self.session.start(mode) {
                    Ok(()) => {
                        self.tick();
                        if self.session.state() == PlaybackState::Playing {
                            self.ticker = Some(new_interval(self.period));
                        }
                    }
                    Err(e) => self.emit(PlaybackEvent::Rejected(e)),
                }
            }
            Command::Stop { snap } => {
                self.ticker = None;
                if let Some(view) = self.session.stop(snap) {
                    self.emit(PlaybackEvent::BucketShown(view));
                }
            }
            Command::Navigate(delta) => match self.session.navigate(delta) {
                Ok(view) => self.emit(PlaybackEvent::BucketShown(view)),
                Err(e) => self.emit(PlaybackEvent::Rejected(e)),
            },
            Command::Reset => {
                self.ticker = None;
                self.session.reset();
                self.emit(PlaybackEvent::SessionReset);
            }
            Command::SetInterval(period) => {
                self.period = period;
                if self.ticker.is_some() {
                    self.ticker = Some(new_interval(period));
                }
                log::debug!("Playback interval set to {period:?}");
            }
            Command::Snapshot(reply) => {
                let snapshot = SessionSnapshot {
                    state: self.session.state(),
                    current_index: self.session.current_index(),
                    bucket_count: self.session.bucket_count(),
                    accumulated: self.session.accumulated().len(),
                    interval: self.period,
                };
                // The caller may have given up waiting.
                let _ = reply.send(snapshot);
            }
        }
    }

    fn tick(&mut self) {
        match self.session.tick() {
            Ok(TickOutcome::Revealed(reveal)) => {
                self.emit(PlaybackEvent::BucketRevealed(reveal));
            }
            Ok(TickOutcome::EndOfData) => {
                self.ticker = None;
                self.emit(PlaybackEvent::EndOfData);
            }
            Err(e) => {
                self.ticker = None;
                log::warn!("Dropping stray playback tick: {e}");
            }
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        if self.events.send(event).is_err() {
            log::debug!("Playback event dropped, no consumer");
        }
    }
}

/// First tick one full period from now.
fn new_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
