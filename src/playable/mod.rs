use std::time::Duration;

use crate::foundation::error::PlaycastResult;
use crate::timing::ticks::Ticks;

pub mod composition;
pub mod leaf;
pub mod timeline;

use composition::Composition;
use leaf::Leaf;
use timeline::Timeline;

/// Options recognized by [`Playable::play`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlayOptions {
    /// Restart from the first child when the last one completes. Honored by
    /// timelines; leaves and compositions ignore it.
    #[serde(rename = "loop", default)]
    pub looping: bool,
}

impl PlayOptions {
    /// Options with looping enabled.
    pub fn looped() -> Self {
        Self { looping: true }
    }
}

/// Anything schedulable by the engine.
///
/// The variant set is closed: a single content slot, a sequential timeline or
/// a parallel composition. Timelines and compositions hold `Playable`
/// children themselves, so trees nest to arbitrary depth and a composition
/// can sit inside a timeline as ordinary content.
///
/// Control flows downward (`play` / `stop` / `seek` / `unload`), completion
/// flows upward (the `play` future resolving). Cancellation is structured:
/// dropping a `play` future stops every descendant before the drop returns.
/// Stopping or cancelling never releases resources; only `unload` does.
#[derive(Debug)]
pub enum Playable {
    /// A single piece of external content.
    Leaf(Leaf),
    /// Sequential children, one active at a time.
    Timeline(Timeline),
    /// Independently-timed parallel regions.
    Composition(Composition),
}

impl Playable {
    /// Total logical duration of this node.
    pub fn duration(&self) -> Duration {
        match self {
            Playable::Leaf(leaf) => leaf.duration(),
            Playable::Timeline(timeline) => timeline.duration(),
            Playable::Composition(composition) => composition.duration(),
        }
    }

    /// Consume ticks until this node has run its course; resolves on
    /// completion, errs on a fatal child failure.
    pub async fn play(&mut self, ticks: &mut Ticks, opts: &PlayOptions) -> PlaycastResult<()> {
        match self {
            Playable::Leaf(leaf) => leaf.play(ticks).await,
            Playable::Timeline(timeline) => timeline.play(ticks, opts).await,
            Playable::Composition(composition) => composition.play(ticks).await,
        }
    }

    /// Halt playback; resources stay loaded.
    pub fn stop(&mut self) {
        match self {
            Playable::Leaf(leaf) => leaf.stop(),
            Playable::Timeline(timeline) => timeline.stop(),
            Playable::Composition(composition) => composition.stop(),
        }
    }

    /// Map a node-global offset onto descendant-local positions.
    pub fn seek(&mut self, offset: Duration) {
        match self {
            Playable::Leaf(leaf) => leaf.seek(offset),
            Playable::Timeline(timeline) => timeline.seek(offset),
            Playable::Composition(composition) => composition.seek(offset),
        }
    }

    /// Reset positions and release owned resources.
    pub fn unload(&mut self) {
        match self {
            Playable::Leaf(leaf) => leaf.unload(),
            Playable::Timeline(timeline) => timeline.unload(),
            Playable::Composition(composition) => composition.unload(),
        }
    }
}

impl From<Leaf> for Playable {
    fn from(leaf: Leaf) -> Self {
        Playable::Leaf(leaf)
    }
}

impl From<Timeline> for Playable {
    fn from(timeline: Timeline) -> Self {
        Playable::Timeline(timeline)
    }
}

impl From<Composition> for Playable {
    fn from(composition: Composition) -> Self {
        Playable::Composition(composition)
    }
}
