use serde_json::Value;

pub const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

/// Query marker that makes watch pages answer with JSON instead of HTML.
pub const STRUCTURED_RESPONSE_MARKER: &str = "&pbj=1";

pub fn watch_url(video_id: &str, playlist_id: Option<&str>) -> String {
    let mut url = format!(
        "{YOUTUBE_BASE_URL}/watch?v={}",
        urlencoding::encode(video_id)
    );
    if let Some(list) = playlist_id {
        url.push_str(&format!("&list={}", urlencoding::encode(list)));
    }
    url
}

/// Resolves a `navigationEndpoint` object to an absolute URL.
pub fn url_from_navigation_endpoint(endpoint: &Value) -> Option<String> {
    if let Some(watch) = endpoint.get("watchEndpoint") {
        let video_id = watch.get("videoId").and_then(|x| x.as_str())?;
        let mut url = watch_url(video_id, watch.get("playlistId").and_then(|x| x.as_str()));
        if let Some(t) = watch.get("startTimeSeconds").and_then(|x| x.as_u64()) {
            url.push_str(&format!("&t={t}"));
        }
        return Some(url);
    }

    if let Some(url) = endpoint
        .pointer("/urlEndpoint/url")
        .and_then(|x| x.as_str())
    {
        return Some(url.to_string());
    }

    endpoint
        .pointer("/commandMetadata/webCommandMetadata/url")
        .and_then(|x| x.as_str())
        .map(|path| {
            if path.starts_with("http") {
                path.to_string()
            } else {
                format!("{YOUTUBE_BASE_URL}{path}")
            }
        })
}
