//! Error types for mix extraction.

use thiserror::Error;

/// Result type alias using [`ExtractionError`].
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Boxed transport failure, kept opaque.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// A required JSON field was absent or null.
    #[error("missing field: {0}")]
    MissingField(String),

    /// The caller handed in a page descriptor (or URL) that cannot be used.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The last window entry carries no navigable endpoint, so the mix cannot continue.
    #[error("could not extract next page url: {0}")]
    ContinuationNotFound(String),

    /// Channel mixes have no per-video thumbnail.
    #[error("playlist is a channel mix")]
    ChannelMix,

    #[error("video id derived from playlist id is empty")]
    EmptyIdentifier,

    /// Both the playlist-id and the current-video thumbnail failed.
    #[error("could not get playlist thumbnail")]
    ThumbnailUnavailable {
        #[source]
        source: Box<ExtractionError>,
    },

    #[error("network failure: {0}")]
    NetworkFailure(#[source] TransportError),

    #[error("response is not valid json: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Fieldless discriminant of [`ExtractionError`], handy for matching in callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingField,
    InvalidArgument,
    ContinuationNotFound,
    ChannelMix,
    EmptyIdentifier,
    ThumbnailUnavailable,
    NetworkFailure,
    InvalidJson,
}

impl ExtractionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_) => ErrorKind::MissingField,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::ContinuationNotFound(_) => ErrorKind::ContinuationNotFound,
            Self::ChannelMix => ErrorKind::ChannelMix,
            Self::EmptyIdentifier => ErrorKind::EmptyIdentifier,
            Self::ThumbnailUnavailable { .. } => ErrorKind::ThumbnailUnavailable,
            Self::NetworkFailure(_) => ErrorKind::NetworkFailure,
            Self::InvalidJson(_) => ErrorKind::InvalidJson,
        }
    }

    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        Self::NetworkFailure(Box::new(err))
    }
}
