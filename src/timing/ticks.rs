use std::ops::{Deref, DerefMut};
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tokio::sync::mpsc;

/// A pull-based stream of logical tick positions.
///
/// Every tick is a position within the driving clock's period; consecutive
/// ticks are `interval()` apart in logical time regardless of wall-clock
/// jitter. A `Ticks` value is consumed by a playable's `play` and can be
/// bounded to a sub-range so a child only ever observes the ticks that belong
/// to its own slot. End of stream is the completion signal: it is synthesized
/// when a bounded window is exhausted, independent of whether the underlying
/// source has terminated.
pub struct Ticks {
    interval: Duration,
    source: TickSource,
    limits: Vec<u64>,
    consumed: u64,
    ended: bool,
}

enum TickSource {
    Stream(BoxStream<'static, Duration>),
    Channel(mpsc::UnboundedReceiver<Duration>),
}

impl Ticks {
    /// Wrap an arbitrary tick stream (a live clock or a prepared sequence).
    pub fn from_stream(stream: BoxStream<'static, Duration>, interval: Duration) -> Self {
        Self {
            interval,
            source: TickSource::Stream(stream),
            limits: Vec::new(),
            consumed: 0,
            ended: false,
        }
    }

    /// Wrap a channel receiver; the stream ends when all senders are dropped.
    pub fn from_channel(receiver: mpsc::UnboundedReceiver<Duration>, interval: Duration) -> Self {
        Self {
            interval,
            source: TickSource::Channel(receiver),
            limits: Vec::new(),
            consumed: 0,
            ended: false,
        }
    }

    /// Build a finite tick stream from explicit positions (tests, replays).
    pub fn from_values(values: Vec<Duration>, interval: Duration) -> Self {
        Self::from_stream(Box::pin(futures_util::stream::iter(values)), interval)
    }

    /// Logical distance between consecutive ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the underlying source has terminated.
    ///
    /// Distinguishes natural completion of a bounded window (the source is
    /// still live) from an upstream stream that ended early.
    pub fn source_ended(&self) -> bool {
        self.ended
    }

    /// Total number of ticks pulled through this stream so far.
    pub(crate) fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Pull the next tick, or `None` when the stream (or the innermost
    /// bounding window) is exhausted.
    pub async fn next(&mut self) -> Option<Duration> {
        if self.ended || self.limits.iter().any(|&limit| limit == 0) {
            return None;
        }
        let tick = match &mut self.source {
            TickSource::Stream(stream) => stream.next().await,
            TickSource::Channel(receiver) => receiver.recv().await,
        };
        match tick {
            Some(tick) => {
                self.consumed += 1;
                for limit in &mut self.limits {
                    *limit -= 1;
                }
                Some(tick)
            }
            None => {
                self.ended = true;
                None
            }
        }
    }

    /// Bound the next `count` ticks as a sub-range.
    ///
    /// The returned guard dereferences to this stream; dropping it restores
    /// the parent's view, so a cancelled child can never leave a stale bound
    /// behind. Windows nest: an inner window can only shrink what the outer
    /// one allows.
    pub(crate) fn window(&mut self, count: u64) -> TickWindow<'_> {
        self.limits.push(count);
        TickWindow { ticks: self }
    }
}

/// Scoped bound over a [`Ticks`] stream; see [`Ticks::window`].
pub(crate) struct TickWindow<'a> {
    ticks: &'a mut Ticks,
}

impl Deref for TickWindow<'_> {
    type Target = Ticks;

    fn deref(&self) -> &Ticks {
        self.ticks
    }
}

impl DerefMut for TickWindow<'_> {
    fn deref_mut(&mut self) -> &mut Ticks {
        self.ticks
    }
}

impl Drop for TickWindow<'_> {
    fn drop(&mut self) {
        self.ticks.limits.pop();
    }
}

/// Number of ticks spanning `duration` at the given interval, rounded up.
pub(crate) fn ticks_spanning(duration: Duration, interval: Duration) -> u64 {
    if duration.is_zero() || interval.is_zero() {
        return 0;
    }
    let duration = duration.as_nanos();
    let interval = interval.as_nanos();
    (duration.div_ceil(interval)) as u64
}
