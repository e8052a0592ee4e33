/// Convenience result type used across storyloop.
pub type StoryResult<T> = Result<T, StoryError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum StoryError {
    /// Invalid user-provided or story document data.
    #[error("validation error: {0}")]
    Validation(String),

    /// No capture API or no acceptable container/codec is available.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// The source bitmap could not be decoded.
    #[error("image load error: {0}")]
    ImageLoad(String),

    /// The audio track could not be fetched or decoded for export.
    #[error("audio decode error: {0}")]
    AudioDecode(String),

    /// Encoder construction or runtime failure.
    #[error("encoder error: {0}")]
    Encoder(String),

    /// Errors while drawing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryError {
    /// Build a [`StoryError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StoryError::UnsupportedPlatform`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedPlatform(msg.into())
    }

    /// Build a [`StoryError::ImageLoad`] value.
    pub fn image_load(msg: impl Into<String>) -> Self {
        Self::ImageLoad(msg.into())
    }

    /// Build a [`StoryError::AudioDecode`] value.
    pub fn audio_decode(msg: impl Into<String>) -> Self {
        Self::AudioDecode(msg.into())
    }

    /// Build a [`StoryError::Encoder`] value.
    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }

    /// Build a [`StoryError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
