//! Continuation of a mix.
//!
//! There is no continuation token: the next page is the watch page of the last
//! item of the current window, fetched with the mix cookie. Every response
//! repeats up to 24 earlier items plus the item at `currentIndex`, which was
//! already yielded, so only the tail after it is new.

use crate::error::{ExtractionError, Result};
use crate::mix::collector::ITEM_RENDERER;
use crate::ytm::endpoint::{STRUCTURED_RESPONSE_MARKER, url_from_navigation_endpoint};
use serde_json::Value;

/// URL of the page following `window`, with the JSON marker appended.
pub fn next_page_url(window: &[Value]) -> Result<String> {
    let last = window
        .last()
        .ok_or_else(|| ExtractionError::ContinuationNotFound("window is empty".to_string()))?;

    let endpoint = last
        .as_object()
        .and_then(|o| o.get(ITEM_RENDERER))
        .and_then(|r| r.get("navigationEndpoint"))
        .ok_or_else(|| {
            ExtractionError::ContinuationNotFound(format!(
                "last entry has no {ITEM_RENDERER}.navigationEndpoint"
            ))
        })?;

    let url = url_from_navigation_endpoint(endpoint).ok_or_else(|| {
        ExtractionError::ContinuationNotFound("navigation endpoint has no url".to_string())
    })?;

    Ok(url + STRUCTURED_RESPONSE_MARKER)
}

/// Drops everything up to and including `current_index`.
///
/// An index outside the window means the server answered something we cannot
/// continue from, so it is an error rather than an empty page.
pub fn trim(window: &[Value], current_index: usize) -> Result<&[Value]> {
    if current_index >= window.len() {
        return Err(ExtractionError::ContinuationNotFound(format!(
            "currentIndex {current_index} is outside a window of {} items",
            window.len()
        )));
    }
    Ok(&window[current_index + 1..])
}
