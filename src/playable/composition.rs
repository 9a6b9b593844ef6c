use std::time::Duration;

use futures_util::future::try_join_all;
use tokio::sync::mpsc;

use crate::foundation::error::PlaycastResult;
use crate::playable::PlayOptions;
use crate::playable::timeline::Timeline;
use crate::timing::ticks::Ticks;

/// One independently-timed slot of a [`Composition`].
///
/// The placement descriptor is opaque to the engine: it travels to the
/// embedding host untouched (typically geometry or CSS-like positioning for
/// the region's surface).
#[derive(Debug)]
pub struct Region {
    name: String,
    placement: serde_json::Value,
    timeline: Timeline,
}

impl Region {
    /// Create a region owning its own timeline.
    pub fn new(name: impl Into<String>, placement: serde_json::Value, timeline: Timeline) -> Self {
        Self {
            name: name.into(),
            placement,
            timeline,
        }
    }

    /// Region name, unique within its composition by convention.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opaque placement descriptor, passed through to the host.
    pub fn placement(&self) -> &serde_json::Value {
        &self.placement
    }

    /// The region's timeline.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Mutable access to the region's timeline.
    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }
}

/// Parallel composition of named regions, each owning its own timeline.
///
/// All regions play concurrently against the same tick stream; the
/// composition's duration is the maximum region duration and it completes
/// when the longest-running region completes. A region that finishes early
/// stays idle, receiving nothing further, until the composition-level `stop`
/// or `unload`.
///
/// The region set is fixed before `play` is invoked; mutating it while a
/// play session is running is a precondition violation, not a checked error.
#[derive(Debug, Default)]
pub struct Composition {
    regions: Vec<Region>,
}

impl Composition {
    /// Create a composition with no regions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region. Must not be called after `play` has begun.
    pub fn add_region(&mut self, region: Region) {
        self.regions.push(region);
    }

    /// All regions, in insertion order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Look a region up by name.
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.name() == name)
    }

    /// Maximum region duration; zero with no regions.
    pub fn duration(&self) -> Duration {
        self.regions
            .iter()
            .map(|region| region.timeline.duration())
            .max()
            .unwrap_or(Duration::ZERO)
    }

    /// Play every region concurrently with the same ticks.
    ///
    /// Each tick is fanned out by value to all still-running regions within
    /// the same scheduling turn, so regions never observe diverging time.
    /// Regions always play non-looping: a looping region could never let the
    /// composition complete. The first region error cancels the rest and
    /// propagates.
    pub(crate) async fn play(&mut self, ticks: &mut Ticks) -> PlaycastResult<()> {
        if self.regions.is_empty() {
            return Ok(());
        }
        let interval = ticks.interval();
        let mut senders = Vec::with_capacity(self.regions.len());
        let mut sessions = Vec::with_capacity(self.regions.len());
        for region in self.regions.iter_mut() {
            let (sender, receiver) = mpsc::unbounded_channel();
            senders.push(sender);
            let timeline = &mut region.timeline;
            let mut region_ticks = Ticks::from_channel(receiver, interval);
            sessions.push(async move {
                timeline.play(&mut region_ticks, &PlayOptions::default()).await
            });
        }

        let outcome = {
            let regions_done = try_join_all(sessions);
            tokio::pin!(regions_done);
            let fan_out = async move {
                while let Some(tick) = ticks.next().await {
                    senders.retain(|sender| sender.send(tick).is_ok());
                    if senders.is_empty() {
                        break;
                    }
                }
            };
            tokio::select! {
                outcome = &mut regions_done => outcome,
                // The source ended first: the fan-out future (and with it
                // every sender) is dropped, which closes the region channels
                // and lets the regions wind down.
                _ = fan_out => regions_done.await,
            }
        };

        if let Err(err) = outcome {
            self.stop();
            return Err(err);
        }
        Ok(())
    }

    /// Stop every region.
    pub fn stop(&mut self) {
        for region in &mut self.regions {
            region.timeline.stop();
        }
    }

    /// Forward the same composition-global offset to every region.
    ///
    /// A composition's duration is a maximum, not a sum, so the offset is not
    /// redistributed; each region clamps it against its own duration.
    pub fn seek(&mut self, offset: Duration) {
        for region in &mut self.regions {
            region.timeline.seek(offset);
        }
    }

    /// Unload every region.
    pub fn unload(&mut self) {
        for region in &mut self.regions {
            region.timeline.unload();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playable/composition.rs"]
mod tests;
