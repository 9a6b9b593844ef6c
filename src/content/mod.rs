use std::time::Duration;

use async_trait::async_trait;

use crate::foundation::error::PlaycastResult;
use crate::timing::ticks::Ticks;


/// Opaque handle to the visual surface a piece of content renders into.
///
/// Produced by the embedding host and passed through to [`Content::show`];
/// the engine never inspects or mutates it.
pub trait Surface: Send + Sync {}

/// External content consumed by a [`crate::Leaf`].
///
/// This is the engine's only boundary toward renderable things (images,
/// video, text, ...). Implementations adapt their own lifecycle to the tick
/// stream: `play` should consume ticks until the stream ends and resolve at
/// that point; the end of the stream is the completion signal, whether it
/// comes from the slot being over or from cancellation upstream.
#[async_trait]
pub trait Content: Send {
    /// Intrinsic duration of this content; zero when open-ended.
    fn duration(&self) -> Duration;

    /// Resolve once the content is ready to be played. A failure here is
    /// fatal to the play session that requested it.
    async fn ready(&mut self) -> PlaycastResult<()> {
        Ok(())
    }

    /// Drive the content with a tick stream until the stream ends.
    async fn play(&mut self, ticks: &mut Ticks) -> PlaycastResult<()>;

    /// Halt playback without releasing resources.
    fn stop(&mut self) {}

    /// Reposition to a content-local offset.
    fn seek(&mut self, offset: Duration) {
        let _ = offset;
    }

    /// One-shot "now visible" notification, fired before ticks start
    /// flowing. Fire-and-forget: the engine does not await an acknowledgment.
    /// `surface` is `None` when the owning leaf has no surface attached.
    fn show(&mut self, surface: Option<&dyn Surface>, offset: Duration) {
        let _ = (surface, offset);
    }

    /// Release everything this handle owns. Called at most once, on unload.
    fn unload(&mut self) {}
}
