use crate::config::HttpConfig;
use crate::error::{ExtractionError, Result};
use crate::ytm::cookies::cookie_header;
use crate::ytm::models::{Localization, PageDescriptor};
use async_trait::async_trait;
use reqwest::header::{
    ACCEPT_LANGUAGE, COOKIE, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER, USER_AGENT,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Raw result of one HTTP fetch.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Fetches pages for the extractors. Retries and rate limiting live behind this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        cookies: &HashMap<String, String>,
        locale: &Localization,
    ) -> Result<Response>;

    async fn fetch(&self, url: &str, locale: &Localization) -> Result<Response> {
        self.get(url, &HashMap::new(), locale).await
    }

    /// Fetches the page a descriptor points at, forwarding its cookies.
    async fn fetch_page_json(
        &self,
        page: &PageDescriptor,
        locale: &Localization,
    ) -> Result<serde_json::Value> {
        self.get(&page.url, &page.cookies, locale).await?.json()
    }
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
}

/// [`Transport`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: Arc<Inner>,
}

impl HttpTransport {
    pub fn new(cfg: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&cfg.user_agent)
                .map_err(|e| ExtractionError::InvalidArgument(format!("user agent: {e}")))?,
        );
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.youtube.com"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.youtube.com/"));
        headers.insert(
            HeaderName::from_static("x-youtube-client-name"),
            HeaderValue::from_static("1"),
        );
        headers.insert(
            HeaderName::from_static("x-youtube-client-version"),
            HeaderValue::from_str(&cfg.client_version)
                .map_err(|e| ExtractionError::InvalidArgument(format!("client version: {e}")))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner { http }),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        cookies: &HashMap<String, String>,
        locale: &Localization,
    ) -> Result<Response> {
        debug!(url, cookies = cookies.len(), "GET");

        let mut rb = self
            .inner
            .http
            .get(url)
            .header(ACCEPT_LANGUAGE, locale.accept_language());
        if !cookies.is_empty() {
            rb = rb.header(COOKIE, cookie_header(cookies));
        }

        let resp = rb.send().await?.error_for_status()?;
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?.to_vec();
        debug!(url, status, bytes = body.len(), "response");

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_response_json() {
        let resp = Response {
            status: 200,
            headers: HeaderMap::new(),
            body: br#"[{"page":"watch"}]"#.to_vec(),
        };
        assert_eq!(resp.json().unwrap()[0]["page"], "watch");
    }

    #[test]
    fn test_response_not_json() {
        let resp = Response {
            status: 200,
            headers: HeaderMap::new(),
            body: b"<html></html>".to_vec(),
        };
        assert_eq!(resp.json().unwrap_err().kind(), ErrorKind::InvalidJson);
    }

    #[test]
    fn test_http_transport_rejects_bad_user_agent() {
        let cfg = HttpConfig {
            user_agent: "bad\nagent".to_string(),
            ..HttpConfig::default()
        };
        let err = HttpTransport::new(&cfg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
