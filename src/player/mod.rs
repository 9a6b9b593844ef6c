use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;

use crate::foundation::error::{PlaycastError, PlaycastResult};
use crate::playable::{PlayOptions, Playable};
use crate::timing::clock::{Clock, wrap_position};
use crate::timing::ticks::Ticks;

/// Capacity of the player's event channel; a subscriber that lags behind by
/// more than this many events starts missing the oldest ones.
const EVENT_CAPACITY: usize = 256;

/// Events published by a [`Player`] during a play session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    /// A tick was delivered to the root; carries the current position.
    Progress(Duration),
    /// The clock wrapped: one full pass over the root's duration finished.
    /// Hosts use this to run between-loop side effects (e.g. re-resolving a
    /// play-list) without stopping playback.
    EndOfPass,
    /// The root playable ran to completion and the clock was torn down.
    Completed,
    /// A fatal child failure ended the session; the player is idle again and
    /// can be replayed.
    Error(String),
}

struct Session {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Binds one clock to one root playable for a play session.
///
/// The player owns the externally visible playback position: it survives
/// stop/play cycles so a new session resumes where the previous one left
/// off, and it is threaded into the session explicitly rather than read from
/// ambient state. At most one session (and therefore one clock) runs at a
/// time; `play` while running stops the old session first.
pub struct Player {
    root: Arc<Mutex<Playable>>,
    interval: Duration,
    position_ms: Arc<AtomicU64>,
    events: broadcast::Sender<PlayerEvent>,
    session: Option<Session>,
}

impl Player {
    /// Create an idle player around a root playable. `interval` is the tick
    /// interval of every clock this player creates and must be nonzero.
    pub fn new(root: impl Into<Playable>, interval: Duration) -> PlaycastResult<Self> {
        if interval.is_zero() {
            return Err(PlaycastError::validation("player tick interval must be > 0"));
        }
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            root: Arc::new(Mutex::new(root.into())),
            interval,
            position_ms: Arc::new(AtomicU64::new(0)),
            events,
            session: None,
        })
    }

    /// Subscribe to session events. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    /// Shared handle to the root playable.
    pub fn root(&self) -> Arc<Mutex<Playable>> {
        Arc::clone(&self.root)
    }

    /// Current playback position.
    pub fn position(&self) -> Duration {
        Duration::from_millis(self.position_ms.load(Ordering::Relaxed))
    }

    /// Whether a session is currently running.
    pub fn is_playing(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.task.is_finished())
    }

    /// Record the position the next session starts from. Takes effect on the
    /// next `play`; a running session is not interrupted. Offsets at or
    /// beyond the root's duration wrap into its period when the session
    /// starts.
    pub fn seek(&mut self, offset: Duration) {
        self.position_ms
            .store(offset.as_millis() as u64, Ordering::Relaxed);
    }

    /// Start a play session.
    ///
    /// Stops any running session first, resolves the starting offset from
    /// the tracked position, creates a clock whose period is the root's
    /// duration and spawns the session task. Every tick is forwarded to
    /// subscribers as [`PlayerEvent::Progress`]; a tick smaller than its
    /// predecessor signals a wrap and additionally emits
    /// [`PlayerEvent::EndOfPass`]. Completion tears the clock down, rewinds
    /// the position and emits [`PlayerEvent::Completed`]; a child failure
    /// emits [`PlayerEvent::Error`] and returns the player to idle.
    #[tracing::instrument(skip(self))]
    pub async fn play(&mut self, opts: PlayOptions) -> PlaycastResult<()> {
        self.stop().await;

        let start;
        let period;
        {
            let mut root = self.root.lock().await;
            period = root.duration();
            if period.is_zero() {
                // Nothing to schedule; an empty tree completes immediately.
                let _ = self.events.send(PlayerEvent::Completed);
                return Ok(());
            }
            start = wrap_position(self.position(), period);
            root.seek(start);
        }
        self.position_ms
            .store(start.as_millis() as u64, Ordering::Relaxed);

        let clock = Clock::new(start, self.interval, period)?;
        tracing::debug!(?start, interval = ?self.interval, ?period, "session starting");

        let progress_events = self.events.clone();
        let position_ms = Arc::clone(&self.position_ms);
        let mut previous: Option<Duration> = None;
        let positions = clock.positions().map(move |tick| {
            if previous.is_some_and(|previous| tick < previous) {
                let _ = progress_events.send(PlayerEvent::EndOfPass);
            }
            previous = Some(tick);
            position_ms.store(tick.as_millis() as u64, Ordering::Relaxed);
            let _ = progress_events.send(PlayerEvent::Progress(tick));
            tick
        });
        let mut ticks = Ticks::from_stream(Box::pin(positions), self.interval);

        let (cancel, mut cancelled) = watch::channel(false);
        let root = Arc::clone(&self.root);
        let events = self.events.clone();
        let position_ms = Arc::clone(&self.position_ms);
        let task = tokio::spawn(async move {
            let mut root = root.lock().await;
            tokio::select! {
                biased;
                _ = cancelled.changed() => {
                    // Cancellation drops the tick stream (and its pending
                    // timer) together with the root's play future.
                }
                outcome = root.play(&mut ticks, &opts) => match outcome {
                    Ok(()) => {
                        position_ms.store(0, Ordering::Relaxed);
                        let _ = events.send(PlayerEvent::Completed);
                    }
                    Err(err) => {
                        let _ = events.send(PlayerEvent::Error(err.to_string()));
                    }
                },
            }
        });
        self.session = Some(Session { cancel, task });
        Ok(())
    }

    /// Stop the running session, if any. Cancels the tick subscription and
    /// the root's play future, waits for the session task to wind down, then
    /// stops the root. Safe to call when already idle.
    #[tracing::instrument(skip(self))]
    pub async fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let _ = session.cancel.send(true);
        let _ = session.task.await;
        self.root.lock().await.stop();
        tracing::debug!("session stopped");
    }

    /// Stop and release every resource the tree owns; the position rewinds
    /// to zero.
    pub async fn unload(&mut self) {
        self.stop().await;
        self.position_ms.store(0, Ordering::Relaxed);
        self.root.lock().await.unload();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/player.rs"]
mod tests;
