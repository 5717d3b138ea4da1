use crate::error::{ExtractionError, Result};
use crate::mix::thumbnail::thumbnail_url_from_video_id;
use crate::ytm::endpoint::{url_from_navigation_endpoint, watch_url};
use crate::ytm::models::{Localization, PlaylistEntry};
use serde_json::Value;

/// Key of the item renderer wrapped around every real mix entry.
pub const ITEM_RENDERER: &str = "playlistPanelVideoRenderer";

/// Turns one item renderer into a [`PlaylistEntry`].
pub trait StreamItemExtractor: Send + Sync {
    fn extract(&self, renderer: &Value, time_context: &Localization) -> Result<PlaylistEntry>;
}

/// Collects entries from a window in order. Entries that are not objects or
/// lack an item renderer object are placeholders and get skipped; errors from
/// the item extractor propagate.
pub fn collect(
    window: &[Value],
    extractor: &dyn StreamItemExtractor,
    time_context: &Localization,
) -> Result<Vec<PlaylistEntry>> {
    let mut out = Vec::with_capacity(window.len());
    for item in window {
        if let Some(renderer) = item.get(ITEM_RENDERER).filter(|r| r.is_object()) {
            out.push(extractor.extract(renderer, time_context)?);
        }
    }
    Ok(out)
}

/// Default extractor for `playlistPanelVideoRenderer` items.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelVideoExtractor;

impl StreamItemExtractor for PanelVideoExtractor {
    fn extract(&self, r: &Value, _time_context: &Localization) -> Result<PlaylistEntry> {
        let video_id = r
            .get("videoId")
            .and_then(|x| x.as_str())
            .or_else(|| {
                r.pointer("/navigationEndpoint/watchEndpoint/videoId")
                    .and_then(|x| x.as_str())
            })
            .ok_or_else(|| ExtractionError::missing("playlistPanelVideoRenderer.videoId"))?
            .to_string();

        let title = text_of(r.get("title")).unwrap_or_else(|| "Unknown title".to_string());

        let uploader_run = r.pointer("/shortBylineText/runs/0");
        let uploader_name = uploader_run
            .and_then(|run| run.get("text"))
            .and_then(|x| x.as_str())
            .map(|s| s.to_string())
            .or_else(|| text_of(r.get("longBylineText")));
        let uploader_url = uploader_run
            .and_then(|run| run.get("navigationEndpoint"))
            .and_then(url_from_navigation_endpoint);

        let duration_seconds = text_of(r.get("lengthText"))
            .as_deref()
            .and_then(parse_duration_text);

        // Thumbnails are listed smallest first.
        let thumbnail_url = r
            .pointer("/thumbnail/thumbnails")
            .and_then(|x| x.as_array())
            .and_then(|thumbs| thumbs.last())
            .and_then(|t| t.get("url"))
            .and_then(|x| x.as_str())
            .map(|s| s.to_string())
            .or_else(|| Some(thumbnail_url_from_video_id(&video_id)));

        Ok(PlaylistEntry {
            url: watch_url(&video_id, None),
            video_id,
            title,
            uploader_name,
            uploader_url,
            duration_seconds,
            thumbnail_url,
        })
    }
}

/// Reads a text object, either `{simpleText}` or `{runs: [{text}]}`.
fn text_of(v: Option<&Value>) -> Option<String> {
    let v = v?;
    if let Some(s) = v.get("simpleText").and_then(|x| x.as_str()) {
        return Some(s.to_string());
    }
    let text = v
        .get("runs")?
        .as_array()?
        .iter()
        .filter_map(|run| run.get("text").and_then(|t| t.as_str()))
        .collect::<String>();
    (!text.is_empty()).then_some(text)
}

/// Parse duration text like "3:45" or "1:23:45" into seconds
fn parse_duration_text(text: &str) -> Option<u32> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    match parts.len() {
        2 => {
            let mins: u32 = parts[0].parse().ok()?;
            let secs: u32 = parts[1].parse().ok()?;
            mins.checked_mul(60)?.checked_add(secs)
        }
        3 => {
            let hours: u32 = parts[0].parse().ok()?;
            let mins: u32 = parts[1].parse().ok()?;
            let secs: u32 = parts[2].parse().ok()?;
            hours
                .checked_mul(3600)?
                .checked_add(mins.checked_mul(60)?)?
                .checked_add(secs)
        }
        _ => None,
    }
}
