use crate::ytm::client::Response;
use reqwest::header::SET_COOKIE;
use std::collections::HashMap;

/// YouTube identifies mixes by this cookie; forwarding it keeps continuations free of duplicates.
pub const MIX_COOKIE_NAME: &str = "VISITOR_INFO1_LIVE";

/// Reads a cookie value out of the response's `Set-Cookie` headers.
/// The last matching header wins.
pub fn read_cookie(name: &str, response: &Response) -> Option<String> {
    response
        .headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| {
            // `name=value; Path=/; Domain=...`
            let pair = raw.split(';').next()?.trim();
            let (n, v) = pair.split_once('=')?;
            (n.trim() == name).then(|| v.trim().to_string())
        })
        .last()
}

/// Renders a cookie map as a `Cookie` request header value.
pub fn cookie_header(cookies: &HashMap<String, String>) -> String {
    let mut pairs = cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>();
    pairs.sort();
    pairs.join("; ")
}
