use crate::error::{ExtractionError, Result};
use crate::mix::collector::{PanelVideoExtractor, StreamItemExtractor, collect};
use crate::mix::continuation::{next_page_url, trim};
use crate::mix::descriptor::MixDescriptor;
use crate::mix::thumbnail::thumbnail_for;
use crate::ytm::client::Transport;
use crate::ytm::cookies::{MIX_COOKIE_NAME, read_cookie};
use crate::ytm::endpoint::STRUCTURED_RESPONSE_MARKER;
use crate::ytm::models::{
    ITEM_COUNT_INFINITE, ItemsPage, Localization, MixMetadata, PageDescriptor,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Extracts an auto-generated, endless playlist ("mix").
///
/// Handles URLs like `youtube.com/watch?v=<video>&list=<mix>`. The first fetch
/// populates [`MixState`] once; later pages are requested with the
/// [`PageDescriptor`] returned by the previous call.
pub struct MixPlaylistExtractor {
    descriptor: MixDescriptor,
    transport: Arc<dyn Transport>,
    item_extractor: Arc<dyn StreamItemExtractor>,
    locale: Localization,
    state: OnceCell<MixState>,
}

/// What the first fetch captured. Never changes afterwards.
#[derive(Debug)]
pub struct MixState {
    initial_data: Value,
    playlist_data: Value,
    cookie_value: Option<String>,
}

impl MixPlaylistExtractor {
    pub fn new(url: &str, transport: Arc<dyn Transport>, locale: Localization) -> Result<Self> {
        Ok(Self::with_descriptor(
            MixDescriptor::parse(url)?,
            transport,
            Arc::new(PanelVideoExtractor),
            locale,
        ))
    }

    pub fn with_descriptor(
        descriptor: MixDescriptor,
        transport: Arc<dyn Transport>,
        item_extractor: Arc<dyn StreamItemExtractor>,
        locale: Localization,
    ) -> Self {
        Self {
            descriptor,
            transport,
            item_extractor,
            locale,
            state: OnceCell::new(),
        }
    }

    pub fn descriptor(&self) -> &MixDescriptor {
        &self.descriptor
    }

    /// Fetches the mix's watch page once. Concurrent callers wait for the same fetch.
    pub async fn fetch_page(&self) -> Result<&MixState> {
        self.state
            .get_or_try_init(|| async {
                let url = format!("{}{STRUCTURED_RESPONSE_MARKER}", self.descriptor.url());
                debug!(%url, "fetching first mix page");

                let response = self.transport.fetch(&url, &self.locale).await?;
                let cookie_value = read_cookie(MIX_COOKIE_NAME, &response);
                let json = response.json()?;

                let initial_data = watch_response(&json)?.clone();
                let playlist_data = playlist_panel(&initial_data)?.clone();

                info!(
                    playlist_id = %self.descriptor.playlist_id,
                    cookie = cookie_value.is_some(),
                    "fetched mix"
                );

                Ok::<_, ExtractionError>(MixState {
                    initial_data,
                    playlist_data,
                    cookie_value,
                })
            })
            .await
    }

    pub async fn metadata(&self) -> Result<MixMetadata> {
        self.fetch_page().await?.metadata()
    }

    pub async fn initial_page(&self) -> Result<ItemsPage> {
        let state = self.fetch_page().await?;
        let window = state.window();

        let entries = collect(window, self.item_extractor.as_ref(), &self.locale)?;
        let next_url = next_page_url(window)?;
        debug!(entries = entries.len(), %next_url, "initial mix page");

        let mut cookies = HashMap::new();
        if let Some(value) = &state.cookie_value {
            cookies.insert(MIX_COOKIE_NAME.to_string(), value.clone());
        }

        Ok(ItemsPage {
            entries,
            next_page: PageDescriptor::new(next_url, cookies),
        })
    }

    /// Fetches the page `page` points at and yields only the items that were
    /// not part of an earlier page. The caller's cookies are forwarded unchanged.
    pub async fn get_page(&self, page: &PageDescriptor) -> Result<ItemsPage> {
        if page.url.is_empty() {
            return Err(ExtractionError::InvalidArgument(
                "page url is empty".to_string(),
            ));
        }

        let json = self.transport.fetch_page_json(page, &self.locale).await?;
        let playlist = playlist_panel(watch_response(&json)?)?;

        let all = playlist
            .get("contents")
            .and_then(|x| x.as_array())
            .ok_or_else(|| ExtractionError::missing("playlist.contents"))?;
        let current_index = playlist
            .get("currentIndex")
            .and_then(|x| x.as_u64())
            .ok_or_else(|| ExtractionError::missing("playlist.currentIndex"))?;
        let current_index = usize::try_from(current_index).map_err(|_| {
            ExtractionError::ContinuationNotFound(format!("currentIndex {current_index}"))
        })?;

        let fresh = trim(all, current_index)?;
        let entries = collect(fresh, self.item_extractor.as_ref(), &self.locale)?;
        let next_url = next_page_url(all)?;
        debug!(
            window = all.len(),
            current_index,
            entries = entries.len(),
            %next_url,
            "mix page"
        );

        Ok(ItemsPage {
            entries,
            next_page: PageDescriptor::new(next_url, page.cookies.clone()),
        })
    }
}

impl MixState {
    /// Auto-generated mixes have no banner.
    pub const BANNER_URL: &'static str = "";
    /// Mixes are generated by YouTube itself.
    pub const UPLOADER_NAME: &'static str = "YouTube";
    pub const UPLOADER_URL: &'static str = "";
    pub const UPLOADER_AVATAR_URL: &'static str = "";
    pub const SUB_CHANNEL_NAME: &'static str = "";
    pub const SUB_CHANNEL_URL: &'static str = "";
    pub const SUB_CHANNEL_AVATAR_URL: &'static str = "";

    pub fn name(&self) -> Result<String> {
        self.playlist_data
            .get("title")
            .and_then(|x| x.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ExtractionError::missing("playlist.title"))
    }

    /// Thumbnail of the seed video, or of the current video for channel mixes.
    pub fn thumbnail_url(&self) -> Result<String> {
        let playlist_id = self.playlist_data.get("playlistId").and_then(|x| x.as_str());
        let current_video = self
            .initial_data
            .pointer("/currentVideoEndpoint/watchEndpoint/videoId")
            .and_then(|x| x.as_str());
        thumbnail_for(playlist_id, current_video)
    }

    /// Mixes are endless, so this is never a real count.
    pub fn item_count(&self) -> i64 {
        ITEM_COUNT_INFINITE
    }

    pub fn cookie_value(&self) -> Option<&str> {
        self.cookie_value.as_deref()
    }

    /// The watch response the first page was read from.
    pub fn initial_data(&self) -> &Value {
        &self.initial_data
    }

    pub fn metadata(&self) -> Result<MixMetadata> {
        Ok(MixMetadata {
            name: self.name()?,
            thumbnail_url: self.thumbnail_url()?,
            banner_url: Self::BANNER_URL.to_string(),
            uploader_name: Self::UPLOADER_NAME.to_string(),
            uploader_url: Self::UPLOADER_URL.to_string(),
            uploader_avatar_url: Self::UPLOADER_AVATAR_URL.to_string(),
            sub_channel_name: Self::SUB_CHANNEL_NAME.to_string(),
            sub_channel_url: Self::SUB_CHANNEL_URL.to_string(),
            sub_channel_avatar_url: Self::SUB_CHANNEL_AVATAR_URL.to_string(),
            item_count: self.item_count(),
        })
    }

    fn window(&self) -> &[Value] {
        self.playlist_data
            .get("contents")
            .and_then(|x| x.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// `pbj=1` answers with an array of parts; the watch response is the one carrying `response`.
fn watch_response(json: &Value) -> Result<&Value> {
    let found = match json {
        Value::Array(parts) => parts
            .iter()
            .find_map(|p| p.get("response").filter(|r| r.is_object())),
        Value::Object(o) => o.get("response"),
        _ => None,
    };
    found
        .filter(|r| r.is_object())
        .ok_or_else(|| ExtractionError::missing("response"))
}

fn playlist_panel(response: &Value) -> Result<&Value> {
    response
        .pointer("/contents/twoColumnWatchNextResults/playlist/playlist")
        .filter(|p| p.is_object())
        .ok_or_else(|| {
            ExtractionError::missing("contents.twoColumnWatchNextResults.playlist.playlist")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ytm::client::Response;
    use async_trait::async_trait;
    use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Mutex;

    const MIX_URL: &str = "https://www.youtube.com/watch?v=seed&list=RDMMseed";
    const FIRST_URL: &str = "https://www.youtube.com/watch?v=seed&list=RDMMseed&pbj=1";

    #[derive(Default)]
    struct FakeTransport {
        pages: HashMap<String, (Value, Option<&'static str>)>,
        calls: Mutex<Vec<(String, HashMap<String, String>)>>,
    }

    impl FakeTransport {
        fn with(mut self, url: &str, body: Value, cookie: Option<&'static str>) -> Self {
            self.pages.insert(url.to_string(), (body, cookie));
            self
        }

        fn calls(&self) -> Vec<(String, HashMap<String, String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(
            &self,
            url: &str,
            cookies: &HashMap<String, String>,
            _locale: &Localization,
        ) -> Result<Response> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), cookies.clone()));
            tokio::task::yield_now().await;

            let (body, cookie) = self
                .pages
                .get(url)
                .ok_or_else(|| ExtractionError::NetworkFailure(format!("404 {url}").into()))?;
            let mut headers = HeaderMap::new();
            if let Some(c) = *cookie {
                headers.insert(SET_COOKIE, HeaderValue::from_static(c));
            }
            Ok(Response {
                status: 200,
                headers,
                body: serde_json::to_vec(body).unwrap(),
            })
        }
    }

    fn item(id: &str) -> Value {
        json!({
            "playlistPanelVideoRenderer": {
                "videoId": id,
                "title": { "simpleText": format!("Song {id}") },
                "navigationEndpoint": {
                    "watchEndpoint": { "videoId": id, "playlistId": "RDMMseed" }
                }
            }
        })
    }

    fn page_url(id: &str) -> String {
        format!("https://www.youtube.com/watch?v={id}&list=RDMMseed&pbj=1")
    }

    fn watch_json(playlist: Value) -> Value {
        json!([
            { "page": "watch" },
            { "player": {} },
            { "playerResponse": {} },
            { "response": {
                "contents": { "twoColumnWatchNextResults": { "playlist": { "playlist": playlist } } },
                "currentVideoEndpoint": { "watchEndpoint": { "videoId": "current" } }
            } }
        ])
    }

    fn playlist(ids: std::ops::Range<usize>, current_index: usize) -> Value {
        json!({
            "title": "Mix - Seed",
            "playlistId": "RDMMseed",
            "currentIndex": current_index,
            "contents": ids.map(|i| item(&format!("v{i}"))).collect::<Vec<_>>()
        })
    }

    /// Three honest pages: v0..v4, then v0..v9 at index 4, then v5..v14 at index 4.
    fn session_transport() -> FakeTransport {
        let mut first = playlist(0..5, 0);
        first["contents"]
            .as_array_mut()
            .unwrap()
            .insert(2, json!({ "automixPreviewVideoRenderer": {} }));

        FakeTransport::default()
            .with(
                FIRST_URL,
                watch_json(first),
                Some("VISITOR_INFO1_LIVE=cookie123; Path=/; Domain=.youtube.com"),
            )
            .with(&page_url("v4"), watch_json(playlist(0..10, 4)), None)
            .with(&page_url("v9"), watch_json(playlist(5..15, 4)), None)
    }

    fn extractor(transport: Arc<FakeTransport>) -> MixPlaylistExtractor {
        MixPlaylistExtractor::new(MIX_URL, transport, Localization::default()).unwrap()
    }

    fn ids(page: &ItemsPage) -> Vec<String> {
        page.entries.iter().map(|e| e.video_id.clone()).collect()
    }

    #[tokio::test]
    async fn test_initial_page() {
        let transport = Arc::new(session_transport());
        let ex = extractor(transport.clone());

        let page = ex.initial_page().await.unwrap();
        assert_eq!(ids(&page), ["v0", "v1", "v2", "v3", "v4"]);
        assert_eq!(page.next_page.url, page_url("v4"));
        assert_eq!(
            page.next_page.cookies.get(MIX_COOKIE_NAME).map(String::as_str),
            Some("cookie123")
        );
        assert_eq!(transport.calls().len(), 1);
        assert_eq!(transport.calls()[0].0, FIRST_URL);
    }

    #[tokio::test]
    async fn test_pages_trim_overlap_and_keep_cookie() {
        let transport = Arc::new(session_transport());
        let ex = extractor(transport.clone());

        let first = ex.initial_page().await.unwrap();
        let second = ex.get_page(&first.next_page).await.unwrap();
        assert_eq!(ids(&second), ["v5", "v6", "v7", "v8", "v9"]);
        assert_eq!(second.next_page.url, page_url("v9"));

        let third = ex.get_page(&second.next_page).await.unwrap();
        assert_eq!(ids(&third), ["v10", "v11", "v12", "v13", "v14"]);

        let mut seen = HashSet::new();
        for id in [&first, &second, &third].into_iter().flat_map(ids) {
            assert!(seen.insert(id.clone()), "{id} yielded twice");
        }

        for page in [&first, &second, &third] {
            assert_eq!(page.next_page.cookies, first.next_page.cookies);
        }
        for (_, cookies) in &transport.calls()[1..] {
            assert_eq!(cookies.get(MIX_COOKIE_NAME).map(String::as_str), Some("cookie123"));
        }
    }

    #[tokio::test]
    async fn test_get_page_entry_count() {
        let transport = Arc::new(
            FakeTransport::default().with(&page_url("x"), watch_json(playlist(0..8, 2)), None),
        );
        let ex = extractor(transport);
        let page = ex
            .get_page(&PageDescriptor::new(page_url("x"), HashMap::new()))
            .await
            .unwrap();
        assert_eq!(page.entries.len(), 8 - 2 - 1);
        assert!(page.next_page.cookies.is_empty());
    }

    #[tokio::test]
    async fn test_get_page_empty_url_makes_no_call() {
        let transport = Arc::new(session_transport());
        let ex = extractor(transport.clone());

        let err = ex.get_page(&PageDescriptor::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_page_index_out_of_range() {
        let transport = Arc::new(
            FakeTransport::default().with(&page_url("x"), watch_json(playlist(0..3, 3)), None),
        );
        let err = extractor(transport)
            .get_page(&PageDescriptor::new(page_url("x"), HashMap::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContinuationNotFound);
    }

    #[tokio::test]
    async fn test_get_page_missing_current_index() {
        let mut pl = playlist(0..3, 0);
        pl.as_object_mut().unwrap().remove("currentIndex");
        let transport =
            Arc::new(FakeTransport::default().with(&page_url("x"), watch_json(pl), None));
        let err = extractor(transport)
            .get_page(&PageDescriptor::new(page_url("x"), HashMap::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);
    }

    #[tokio::test]
    async fn test_missing_playlist_panel() {
        let body = json!([{}, {}, {}, { "response": { "contents": {} } }]);
        let transport = Arc::new(FakeTransport::default().with(FIRST_URL, body, None));
        let ex = extractor(transport);
        assert_eq!(ex.initial_page().await.unwrap_err().kind(), ErrorKind::MissingField);
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let ex = extractor(Arc::new(FakeTransport::default()));
        assert_eq!(ex.metadata().await.unwrap_err().kind(), ErrorKind::NetworkFailure);
    }

    #[tokio::test]
    async fn test_last_item_without_endpoint() {
        let mut pl = playlist(0..3, 0);
        pl["contents"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "automixPreviewVideoRenderer": {} }));
        let transport = Arc::new(FakeTransport::default().with(FIRST_URL, watch_json(pl), None));
        let err = extractor(transport).initial_page().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContinuationNotFound);
    }

    #[tokio::test]
    async fn test_concurrent_first_fetch_hits_network_once() {
        let transport = Arc::new(session_transport());
        let ex = extractor(transport.clone());

        let (a, b) = tokio::join!(ex.metadata(), ex.initial_page());
        a.unwrap();
        b.unwrap();
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_metadata() {
        let transport = Arc::new(session_transport());
        let ex = extractor(transport);

        let meta = ex.metadata().await.unwrap();
        assert_eq!(meta.name, "Mix - Seed");
        assert_eq!(meta.thumbnail_url, "https://i.ytimg.com/vi/seed/hqdefault.jpg");
        assert_eq!(meta.uploader_name, "YouTube");
        assert_eq!(meta.banner_url, "");
        assert_eq!(meta.uploader_url, "");
        assert_eq!(meta.sub_channel_name, "");
        assert_eq!(meta.item_count, ITEM_COUNT_INFINITE);

        let first = ex.initial_page().await.unwrap();
        ex.get_page(&first.next_page).await.unwrap();
        assert_eq!(ex.metadata().await.unwrap(), meta);
    }

    #[tokio::test]
    async fn test_metadata_channel_mix_thumbnail_fallback() {
        let mut pl = playlist(0..2, 0);
        pl["playlistId"] = json!("RDCMUCabcdef");
        let transport = Arc::new(FakeTransport::default().with(FIRST_URL, watch_json(pl), None));
        let state_ex = extractor(transport);
        let state = state_ex.fetch_page().await.unwrap();
        assert_eq!(
            state.thumbnail_url().unwrap(),
            "https://i.ytimg.com/vi/current/hqdefault.jpg"
        );
        assert_eq!(state.cookie_value(), None);
    }

    #[tokio::test]
    async fn test_metadata_missing_title() {
        let mut pl = playlist(0..2, 0);
        pl["title"] = Value::Null;
        let transport = Arc::new(FakeTransport::default().with(FIRST_URL, watch_json(pl), None));
        let err = extractor(transport).metadata().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);
    }

    #[test]
    fn test_watch_response_shapes() {
        let inner = json!({ "contents": {} });
        assert_eq!(watch_response(&json!([{}, { "response": inner }])).unwrap(), &inner);
        assert_eq!(watch_response(&json!({ "response": inner })).unwrap(), &inner);
        assert!(watch_response(&json!([{ "response": null }])).is_err());
        assert_eq!(
            watch_response(&json!([{ "response": null }, { "response": inner }])).unwrap(),
            &inner
        );
        assert!(watch_response(&json!("html")).is_err());
    }
}
