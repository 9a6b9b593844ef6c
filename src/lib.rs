//! Playcast is a timed, composable playback scheduling engine.
//!
//! Playcast drives presentations built from a tree of playable nodes: single
//! content slots ([`Leaf`]), sequential timelines ([`Timeline`]) and parallel
//! multi-region compositions ([`Composition`]), all advanced by one
//! authoritative, drift-corrected [`Clock`]. The engine decides when every
//! node starts, stops and loops, and how a global seek position maps onto
//! nested local positions.
//!
//! # Engine overview
//!
//! 1. **Clock**: `(start, interval, period) -> Ticks`, an infinite, lazy
//!    stream of logical positions that wraps at the period
//! 2. **Playable tree**: ticks flow downward; a timeline bounds the sub-range
//!    each child consumes, a composition fans the same ticks out to all regions
//! 3. **Player**: binds one clock to one root playable for a play session and
//!    publishes `Progress` / `EndOfPass` / `Completed` / `Error` events
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic timing**: the clock compensates scheduler jitter by
//!   shortening the next delay rather than skipping logical ticks.
//! - **Structured cancellation**: dropping a play session drops every
//!   descendant future and any pending timer; nothing leaks.
//! - **No IO in the core**: content loading and rendering live behind the
//!   [`Content`] and [`Surface`] collaborator traits.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod content;
mod foundation;
mod playable;
mod player;
mod timing;

pub use content::{Content, Surface};
pub use foundation::error::{PlaycastError, PlaycastResult};
pub use playable::composition::{Composition, Region};
pub use playable::leaf::Leaf;
pub use playable::timeline::Timeline;
pub use playable::{PlayOptions, Playable};
pub use player::{Player, PlayerEvent};
pub use timing::clock::Clock;
pub use timing::ticks::Ticks;
