//! Mix thumbnail derivation.
//!
//! The playlist id of a mix usually embeds the seed video id, so the thumbnail
//! is built from it. Channel mixes (and anything that yields no id) fall back
//! to the video currently being played.

use crate::error::{ExtractionError, Result};

/// Auto mix of a single video: `RDMM<videoId>`.
const SINGLE_VIDEO_MIX_PREFIX: &str = "RDMM";
/// Channel mix: `RDCMUC<channelId>`, carries no video id.
const CHANNEL_MIX_PREFIX: &str = "RDCMUC";
/// Length of the generic mix prefix, e.g. `RD<videoId>`.
const GENERIC_PREFIX_LEN: usize = 2;

pub fn thumbnail_url_from_video_id(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg")
}

/// Extracts the seed video id from a mix playlist id.
pub fn video_id_from_playlist_id(playlist_id: &str) -> Result<&str> {
    let video_id = if let Some(rest) = playlist_id.strip_prefix(SINGLE_VIDEO_MIX_PREFIX) {
        rest
    } else if playlist_id.starts_with(CHANNEL_MIX_PREFIX) {
        return Err(ExtractionError::ChannelMix);
    } else {
        playlist_id.get(GENERIC_PREFIX_LEN..).unwrap_or_default()
    };

    if video_id.is_empty() {
        return Err(ExtractionError::EmptyIdentifier);
    }
    Ok(video_id)
}

/// One way of getting a thumbnail, tried in order.
#[derive(Debug, Clone, Copy)]
pub enum ThumbnailSource<'a> {
    PlaylistId(Option<&'a str>),
    CurrentVideo(Option<&'a str>),
}

impl ThumbnailSource<'_> {
    pub fn resolve(&self) -> Result<String> {
        match *self {
            Self::PlaylistId(id) => {
                let id = id.ok_or_else(|| ExtractionError::missing("playlistId"))?;
                video_id_from_playlist_id(id).map(thumbnail_url_from_video_id)
            }
            Self::CurrentVideo(id) => id
                .filter(|id| !id.is_empty())
                .map(thumbnail_url_from_video_id)
                .ok_or_else(|| ExtractionError::missing("currentVideoEndpoint.watchEndpoint.videoId")),
        }
    }
}

/// Tries every source in order. If all fail, the error of the first one is
/// surfaced wrapped in [`ExtractionError::ThumbnailUnavailable`].
pub fn resolve_thumbnail(sources: &[ThumbnailSource<'_>]) -> Result<String> {
    let mut first_err = None;
    for source in sources {
        match source.resolve() {
            Ok(url) => return Ok(url),
            Err(e) => {
                tracing::debug!(?source, error = %e, "thumbnail source failed");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
    }

    Err(ExtractionError::ThumbnailUnavailable {
        source: Box::new(
            first_err.unwrap_or_else(|| ExtractionError::missing("thumbnail source")),
        ),
    })
}

/// Thumbnail of a mix, falling back to the current video's thumbnail.
pub fn thumbnail_for(playlist_id: Option<&str>, fallback_video_id: Option<&str>) -> Result<String> {
    resolve_thumbnail(&[
        ThumbnailSource::PlaylistId(playlist_id),
        ThumbnailSource::CurrentVideo(fallback_video_id),
    ])
}
