use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Returned as the item count of playlists that never end.
pub const ITEM_COUNT_INFINITE: i64 = -2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub video_id: String,
    pub url: String,
    pub title: String,
    pub uploader_name: Option<String>,
    pub uploader_url: Option<String>,
    pub duration_seconds: Option<u32>,
    pub thumbnail_url: Option<String>,
}

/// How to fetch the next batch of a mix.
///
/// The serialized form is exactly `{url, cookies}` so callers can persist it
/// and resume later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    pub url: String,
    #[serde(default)]
    pub cookies: HashMap<String, String>,
}

impl PageDescriptor {
    pub fn new(url: impl Into<String>, cookies: HashMap<String, String>) -> Self {
        Self {
            url: url.into(),
            cookies,
        }
    }
}

/// One page of entries together with the descriptor of the page after it.
#[derive(Debug, Clone)]
pub struct ItemsPage {
    pub entries: Vec<PlaylistEntry>,
    pub next_page: PageDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixMetadata {
    pub name: String,
    pub thumbnail_url: String,
    pub banner_url: String,
    pub uploader_name: String,
    pub uploader_url: String,
    pub uploader_avatar_url: String,
    pub sub_channel_name: String,
    pub sub_channel_url: String,
    pub sub_channel_avatar_url: String,
    pub item_count: i64,
}

/// Language and region sent along with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Localization {
    pub language: String,
    pub country: String,
}

impl Default for Localization {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            country: "US".to_string(),
        }
    }
}

impl Localization {
    /// Value for the `Accept-Language` header, e.g. `en-US`.
    pub fn accept_language(&self) -> String {
        if self.country.is_empty() {
            self.language.clone()
        } else {
            format!("{}-{}", self.language, self.country)
        }
    }
}
