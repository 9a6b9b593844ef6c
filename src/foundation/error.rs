/// Convenience result type used across Playcast.
pub type PlaycastResult<T> = Result<T, PlaycastError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Degenerate configurations (an empty timeline, a composition with zero
/// regions, a leaf with neither content nor an explicit duration) are treated
/// as zero-duration playables, not errors. Cancellation is not an error either
/// and never travels through this type.
#[derive(thiserror::Error, Debug)]
pub enum PlaycastError {
    /// Invalid user-provided scheduling parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// A content handle rejected while getting ready or while playing.
    #[error("content error: {0}")]
    Content(String),

    /// Wrapped lower-level error from collaborators.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlaycastError {
    /// Build a [`PlaycastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PlaycastError::Content`] value.
    pub fn content(msg: impl Into<String>) -> Self {
        Self::Content(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
