use std::time::Duration;

use crate::foundation::error::{PlaycastError, PlaycastResult};
use crate::playable::{PlayOptions, Playable};
use crate::timing::ticks::{Ticks, ticks_spanning};

/// Sequential composition of playables, one active at a time.
///
/// A timeline owns its children in insertion order; they are never reordered
/// during playback. Its duration is the sum of the children's durations, and
/// a timeline-global offset maps onto `(child index, child-local offset)` by
/// a linear accumulate-and-locate scan.
#[derive(Debug, Default)]
pub struct Timeline {
    children: Vec<Playable>,
    current: usize,
    offset_in_current: Duration,
    completed: usize,
    passes: u64,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child. Children play in insertion order.
    pub fn push(&mut self, child: impl Into<Playable>) {
        self.children.push(child.into());
    }

    /// Owned children, in play order.
    pub fn children(&self) -> &[Playable] {
        &self.children
    }

    /// Index of the child owning the current position.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Offset into the current child.
    pub fn local_offset(&self) -> Duration {
        self.offset_in_current
    }

    /// Number of children completed during the current `play`.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Number of full loop passes finished since `play` began.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Sum of all children's durations.
    pub fn duration(&self) -> Duration {
        self.children.iter().map(Playable::duration).sum()
    }

    /// Play children in order, bounding each one to the tick sub-range that
    /// covers its remaining duration. With `opts.looping` the timeline wraps
    /// back to the first child instead of completing, for as long as the
    /// underlying tick source stays live.
    pub(crate) async fn play(&mut self, ticks: &mut Ticks, opts: &PlayOptions) -> PlaycastResult<()> {
        let interval = ticks.interval();
        if interval.is_zero() {
            return Err(PlaycastError::validation("tick interval must be > 0"));
        }
        self.completed = 0;
        self.passes = 0;
        if self.children.is_empty() {
            return Ok(());
        }
        let mut pass_started_at = ticks.consumed();
        loop {
            let local = self.offset_in_current;
            self.offset_in_current = Duration::ZERO;
            let child = &mut self.children[self.current];
            child.seek(local);
            let remaining = child.duration().saturating_sub(local);
            let count = ticks_spanning(remaining, interval);
            if count > 0 {
                let mut window = ticks.window(count);
                if let Err(err) = Box::pin(child.play(&mut window, opts)).await {
                    drop(window);
                    self.stop();
                    return Err(err);
                }
            }
            self.completed += 1;
            self.current += 1;
            if self.current < self.children.len() {
                continue;
            }
            self.current = 0;
            let consumed_this_pass = ticks.consumed() > pass_started_at;
            if opts.looping && consumed_this_pass && !ticks.source_ended() {
                self.passes += 1;
                pass_started_at = ticks.consumed();
                continue;
            }
            return Ok(());
        }
    }

    /// Stop all children. Resources stay loaded.
    pub fn stop(&mut self) {
        for child in &mut self.children {
            child.stop();
        }
    }

    /// Map a timeline-global offset onto the child owning it.
    ///
    /// The offset is clamped into `[0, duration()]`; the last child absorbs
    /// anything at or beyond the end. The residual local offset is propagated
    /// into the located child's own `seek`. Play state is untouched; seeking
    /// while idle simply repositions the next `play`.
    pub fn seek(&mut self, offset: Duration) {
        let mut remaining = offset.min(self.duration());
        let last = self.children.len().saturating_sub(1);
        for (index, child) in self.children.iter_mut().enumerate() {
            let child_duration = child.duration();
            if remaining < child_duration || index == last {
                self.current = index;
                self.offset_in_current = remaining.min(child_duration);
                child.seek(self.offset_in_current);
                return;
            }
            remaining -= child_duration;
        }
        // No children: nothing owns any offset.
        self.current = 0;
        self.offset_in_current = Duration::ZERO;
    }

    /// Rewind and release every child.
    pub fn unload(&mut self) {
        self.current = 0;
        self.offset_in_current = Duration::ZERO;
        for child in &mut self.children {
            child.unload();
        }
    }
}

impl FromIterator<Playable> for Timeline {
    fn from_iter<I: IntoIterator<Item = Playable>>(iter: I) -> Self {
        Self {
            children: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playable/timeline.rs"]
mod tests;
