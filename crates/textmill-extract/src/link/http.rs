//! Plain and browser-mimicking HTTP tiers

use super::{FetchTier, Tier};
use crate::config::PipelineConfig;
use crate::error::FetchError;
use crate::html::{decode_html, decode_lossy, html_to_text};
use async_trait::async_trait;
use encoding_rs::Encoding;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Single GET with a short timeout and the configured user agent
pub struct StaticTier {
    client: Client,
    timeout: Duration,
    max_bytes: usize,
}

impl StaticTier {
    pub fn new(config: &PipelineConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.static_timeout())
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            timeout: config.static_timeout(),
            max_bytes: config.max_input_bytes,
        })
    }
}

#[async_trait]
impl FetchTier for StaticTier {
    fn tier(&self) -> Tier {
        Tier::Static
    }

    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        get_page(&self.client, url, self.timeout, self.max_bytes).await
    }
}

/// GET that presents itself as desktop Chrome: browser headers, cookie
/// jar and compressed transfer. Gets past the simplest bot filters.
pub struct EvasiveTier {
    client: Client,
    timeout: Duration,
    max_bytes: usize,
}

impl EvasiveTier {
    pub fn new(config: &PipelineConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.evasive_timeout())
            .user_agent(CHROME_USER_AGENT)
            .default_headers(chrome_headers())
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            timeout: config.evasive_timeout(),
            max_bytes: config.max_input_bytes,
        })
    }
}

#[async_trait]
impl FetchTier for EvasiveTier {
    fn tier(&self) -> Tier {
        Tier::Evasive
    }

    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        get_page(&self.client, url, self.timeout, self.max_bytes).await
    }
}

fn chrome_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        "sec-ch-ua",
        HeaderValue::from_static(
            "\"Chromium\";v=\"124\", \"Google Chrome\";v=\"124\", \"Not-A.Brand\";v=\"99\"",
        ),
    );
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"Windows\""));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers
}

async fn get_page(
    client: &Client,
    url: &Url,
    timeout: Duration,
    max_bytes: usize,
) -> Result<String, FetchError> {
    let mut response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| request_error(e, timeout))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }
    if let Some(length) = response.content_length() {
        if length > max_bytes as u64 {
            return Err(FetchError::ContentTooLarge {
                size: usize::try_from(length).unwrap_or(usize::MAX),
                max: max_bytes,
            });
        }
    }

    let charset = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(charset_of)
        .and_then(|label| Encoding::for_label(label.as_bytes()));

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| request_error(e, timeout))? {
        append_capped(&mut body, &chunk, max_bytes)?;
    }

    let html = match charset {
        Some(encoding) => decode_lossy(&body, encoding),
        None => decode_html(&body),
    };
    Ok(html_to_text(&html))
}

/// Grow `body` by `chunk`, failing once it would pass `max_bytes`. Bodies
/// without a Content-Length are only bounded here.
fn append_capped(body: &mut Vec<u8>, chunk: &[u8], max_bytes: usize) -> Result<(), FetchError> {
    let size = body.len() + chunk.len();
    if size > max_bytes {
        return Err(FetchError::ContentTooLarge { size, max: max_bytes });
    }
    body.extend_from_slice(chunk);
    Ok(())
}

/// `charset` parameter of a Content-Type header value
fn charset_of(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

fn request_error(err: reqwest::Error, timeout: Duration) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(timeout.as_secs())
    } else {
        FetchError::Network(err.to_string())
    }
}
