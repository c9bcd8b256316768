//! Headless Chromium via the DevTools protocol

use super::dynamic::{BrowserLauncher, BrowserSession};
use crate::error::FetchError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

/// Bound on each step of closing a session
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Launches a local headless Chromium for each session
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    request_timeout: Duration,
}

impl ChromiumLauncher {
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

fn browser_error(err: impl std::fmt::Display) -> FetchError {
    FetchError::Browser(err.to_string())
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError> {
        let config = BrowserConfig::builder()
            .request_timeout(self.request_timeout)
            .build()
            .map_err(FetchError::Browser)?;
        let (browser, mut handler) = Browser::launch(config).await.map_err(browser_error)?;

        // The DevTools connection only makes progress while its event stream
        // is polled.
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Box::new(ChromiumSession {
            browser,
            events,
            page: None,
        }))
    }
}

struct ChromiumSession {
    browser: Browser,
    events: JoinHandle<()>,
    page: Option<Page>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &Url) -> Result<Option<u16>, FetchError> {
        let page = self.browser.new_page("about:blank").await.map_err(browser_error)?;
        page.goto(url.as_str()).await.map_err(browser_error)?;
        let status = page
            .wait_for_navigation_response()
            .await
            .ok()
            .flatten()
            .and_then(|request| request.response.as_ref().map(|response| response.status))
            .and_then(|status| u16::try_from(status).ok());
        self.page = Some(page);
        Ok(status)
    }

    async fn content(&mut self) -> Result<String, FetchError> {
        let page = self
            .page
            .as_ref()
            .ok_or_else(|| FetchError::Browser("no page has been loaded".to_string()))?;
        page.content().await.map_err(browser_error)
    }

    async fn close(mut self: Box<Self>) {
        if let Some(page) = self.page.take() {
            match timeout(SHUTDOWN_TIMEOUT, page.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => debug!(error = %err, "closing page failed"),
                Err(_) => debug!("closing page timed out"),
            }
        }
        match timeout(SHUTDOWN_TIMEOUT, self.browser.close()).await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => debug!(error = %err, "closing browser failed"),
            Err(_) => warn!("browser did not close in time"),
        }
        match timeout(SHUTDOWN_TIMEOUT, self.browser.wait()).await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => debug!(error = %err, "waiting for browser exit failed"),
            Err(_) => {
                warn!("browser still running, killing it");
                if let Err(err) = timeout(SHUTDOWN_TIMEOUT, self.browser.kill()).await {
                    debug!(error = %err, "killing browser timed out");
                }
            }
        }
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.events.abort();
    }
}
