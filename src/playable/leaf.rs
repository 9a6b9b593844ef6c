use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::content::{Content, Surface};
use crate::foundation::error::PlaycastResult;
use crate::timing::ticks::Ticks;

/// A playable wrapping one piece of external content.
///
/// A leaf owns its content handle's lifecycle: the handle is supplied at
/// construction and torn down on [`Leaf::unload`]. A leaf without content is
/// a pure time-filler: it occupies its explicit duration on the timeline and
/// completes when its tick window ends.
pub struct Leaf {
    name: String,
    content: Option<Box<dyn Content>>,
    surface: Option<Arc<dyn Surface>>,
    duration_override: Duration,
    offset: Duration,
}

impl Leaf {
    /// Create an empty leaf with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: None,
            surface: None,
            duration_override: Duration::ZERO,
            offset: Duration::ZERO,
        }
    }

    /// Attach a content handle.
    pub fn with_content(mut self, content: Box<dyn Content>) -> Self {
        self.content = Some(content);
        self
    }

    /// Set an explicit duration. Nonzero values take precedence over the
    /// content's intrinsic duration; zero means "ask the content".
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_override = duration;
        self
    }

    /// Attach the surface handed to the content on `show`.
    pub fn with_surface(mut self, surface: Arc<dyn Surface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Leaf name, for authoring and debugging.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current content-local offset.
    pub fn offset(&self) -> Duration {
        self.offset
    }

    /// Explicit override if nonzero, else the content's own duration, else
    /// zero.
    pub fn duration(&self) -> Duration {
        if !self.duration_override.is_zero() {
            return self.duration_override;
        }
        self.content
            .as_ref()
            .map(|content| content.duration())
            .unwrap_or(Duration::ZERO)
    }

    pub(crate) async fn play(&mut self, ticks: &mut Ticks) -> PlaycastResult<()> {
        let offset = self.offset;
        if let Some(content) = self.content.as_mut() {
            content.ready().await?;
            content.show(self.surface.as_deref(), offset);
            content.play(ticks).await?;
        } else {
            let cap = self.duration();
            let interval = ticks.interval();
            while ticks.next().await.is_some() {
                self.offset = (self.offset + interval).min(cap);
            }
        }
        // Natural completion rewinds; an upstream end (the cancellation path)
        // keeps the offset so a later session can resume here.
        if !ticks.source_ended() {
            self.offset = Duration::ZERO;
        }
        Ok(())
    }

    /// Halt the content, if any. The handle stays loaded.
    pub fn stop(&mut self) {
        if let Some(content) = self.content.as_mut() {
            content.stop();
        }
    }

    /// Reposition to a leaf-local offset, clamped to the duration.
    pub fn seek(&mut self, offset: Duration) {
        self.offset = offset.min(self.duration());
        if let Some(content) = self.content.as_mut() {
            content.seek(self.offset);
        }
    }

    /// Rewind and release the content handle.
    pub fn unload(&mut self) {
        self.offset = Duration::ZERO;
        if let Some(mut content) = self.content.take() {
            content.unload();
        }
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("name", &self.name)
            .field("duration", &self.duration())
            .field("offset", &self.offset)
            .field("has_content", &self.content.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playable/leaf.rs"]
mod tests;
