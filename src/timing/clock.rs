use std::time::Duration;

use futures_util::stream::BoxStream;
use tokio::time::Instant;

use crate::foundation::error::{PlaycastError, PlaycastResult};
use crate::timing::ticks::Ticks;

/// Drift-corrected periodic tick source.
///
/// A clock emits logical positions starting at `start`, advancing by
/// `interval` and wrapping at `period`. The first tick fires immediately;
/// every subsequent wake-up is scheduled against an absolute deadline
/// (`baseline + n * interval`), so a slow consumer or scheduler jitter
/// shortens the next real delay (clamped at zero) instead of accumulating
/// permanent lag or skipping logical ticks.
///
/// The stream never terminates on its own; dropping it cancels the pending
/// wake-up timer synchronously and no tick fires afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clock {
    start: Duration,
    interval: Duration,
    period: Duration,
}

impl Clock {
    /// Create a clock. `interval` and `period` must be nonzero; `start` is
    /// normalized into `[0, period)`.
    pub fn new(start: Duration, interval: Duration, period: Duration) -> PlaycastResult<Self> {
        if interval.is_zero() {
            return Err(PlaycastError::validation("clock interval must be > 0"));
        }
        if period.is_zero() {
            return Err(PlaycastError::validation("clock period must be > 0"));
        }
        Ok(Self {
            start: wrap_position(start, period),
            interval,
            period,
        })
    }

    /// First emitted position.
    pub fn start(&self) -> Duration {
        self.start
    }

    /// Logical distance between consecutive ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wrap period; emitted positions stay in `[0, period)`.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Raw infinite stream of positions. Each call starts a fresh run.
    pub fn positions(&self) -> BoxStream<'static, Duration> {
        let interval = self.interval;
        let period = self.period;
        let state = (self.start, None::<Instant>);
        Box::pin(futures_util::stream::unfold(
            state,
            move |(tick, deadline)| async move {
                let deadline = match deadline {
                    None => Instant::now(),
                    Some(previous) => previous + interval,
                };
                // A deadline already in the past resolves immediately: the
                // late wake-up eats into the next delay, never into the
                // logical schedule.
                tokio::time::sleep_until(deadline).await;
                let next = wrap_position(tick + interval, period);
                Some((tick, (next, Some(deadline))))
            },
        ))
    }

    /// Infinite [`Ticks`] stream over [`Clock::positions`].
    pub fn ticks(&self) -> Ticks {
        Ticks::from_stream(self.positions(), self.interval)
    }
}

/// Fold a position into `[0, period)`.
pub(crate) fn wrap_position(position: Duration, period: Duration) -> Duration {
    if position < period {
        return position;
    }
    Duration::from_nanos((position.as_nanos() % period.as_nanos()) as u64)
}
