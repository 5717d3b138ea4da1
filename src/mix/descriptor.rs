use crate::error::{ExtractionError, Result};
use crate::ytm::endpoint::watch_url;
use reqwest::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    YouTube,
}

/// Identity of one mix, parsed from the URL the extractor was built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixDescriptor {
    pub playlist_id: String,
    pub video_id: Option<String>,
    pub service: Service,
}

const HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
];

impl MixDescriptor {
    /// Accepts `youtube.com/watch?v=<video>&list=<playlist>` style URLs.
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| ExtractionError::InvalidArgument(format!("{url}: {e}")))?;

        let host = parsed.host_str().unwrap_or_default();
        if !HOSTS.contains(&host) {
            return Err(ExtractionError::InvalidArgument(format!(
                "{url}: not a youtube url"
            )));
        }

        let mut playlist_id = None;
        let mut video_id = None;
        for (k, v) in parsed.query_pairs() {
            match k.as_ref() {
                "list" if !v.is_empty() => playlist_id = Some(v.into_owned()),
                "v" if !v.is_empty() => video_id = Some(v.into_owned()),
                _ => {}
            }
        }

        let playlist_id = playlist_id.ok_or_else(|| {
            ExtractionError::InvalidArgument(format!("{url}: missing list parameter"))
        })?;

        Ok(Self {
            playlist_id,
            video_id,
            service: Service::YouTube,
        })
    }

    /// Canonical watch URL of the mix.
    pub fn url(&self) -> String {
        match &self.video_id {
            Some(v) => watch_url(v, Some(&self.playlist_id)),
            None => format!(
                "https://www.youtube.com/watch?list={}",
                urlencoding::encode(&self.playlist_id)
            ),
        }
    }
}
