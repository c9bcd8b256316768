//! Headless browser tier
//!
//! The browser itself sits behind [`BrowserLauncher`] and [`BrowserSession`]
//! so the tier's control flow can be driven without a real browser.

use super::{FetchTier, Tier};
use crate::config::PipelineConfig;
use crate::error::FetchError;
use crate::html::html_to_text;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Starts a fresh browser session
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError>;
}

/// One live browser. [`BrowserSession::close`] consumes the session, so it
/// can only run once.
#[async_trait]
pub trait BrowserSession: Send {
    /// Load `url` and wait for the page to finish loading. Returns the main
    /// document's HTTP status when the browser reports one.
    async fn navigate(&mut self, url: &Url) -> Result<Option<u16>, FetchError>;

    /// Serialized DOM of the current page
    async fn content(&mut self) -> Result<String, FetchError>;

    async fn close(self: Box<Self>);
}

/// Full page render in a headless browser
pub struct DynamicTier {
    launcher: Box<dyn BrowserLauncher>,
    navigation_timeout: Duration,
    settle_delay: Duration,
    challenge_markers: Vec<String>,
    max_bytes: usize,
}

impl DynamicTier {
    pub fn new(launcher: Box<dyn BrowserLauncher>, config: &PipelineConfig) -> Self {
        Self {
            launcher,
            navigation_timeout: config.navigation_timeout(),
            settle_delay: config.settle_delay(),
            challenge_markers: config
                .challenge_markers
                .iter()
                .map(|marker| marker.to_lowercase())
                .collect(),
            max_bytes: config.max_input_bytes,
        }
    }

    async fn render(&self, session: &mut dyn BrowserSession, url: &Url) -> Result<String, FetchError> {
        let status = tokio::time::timeout(self.navigation_timeout, session.navigate(url))
            .await
            .map_err(|_| FetchError::Timeout(self.navigation_timeout.as_secs()))??;
        if let Some(status) = status.filter(|status| *status >= 400) {
            return Err(FetchError::HttpStatus(status));
        }

        tokio::time::sleep(self.settle_delay).await;

        let html = tokio::time::timeout(self.navigation_timeout, session.content())
            .await
            .map_err(|_| FetchError::Timeout(self.navigation_timeout.as_secs()))??;
        if html.len() > self.max_bytes {
            return Err(FetchError::ContentTooLarge {
                size: html.len(),
                max: self.max_bytes,
            });
        }
        if let Some(marker) = self.challenge_marker(&html) {
            return Err(FetchError::ChallengePageDetected(marker.to_string()));
        }

        Ok(html_to_text(&html))
    }

    fn challenge_marker(&self, html: &str) -> Option<&str> {
        let lowered = html.to_lowercase();
        self.challenge_markers
            .iter()
            .find(|marker| lowered.contains(marker.as_str()))
            .map(String::as_str)
    }
}

#[async_trait]
impl FetchTier for DynamicTier {
    fn tier(&self) -> Tier {
        Tier::Dynamic
    }

    /// The session is closed exactly once whichever way rendering ends
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let mut session = self.launcher.launch().await?;
        let rendered = self.render(session.as_mut(), url).await;
        if tokio::time::timeout(self.navigation_timeout, session.close())
            .await
            .is_err()
        {
            warn!(%url, "browser session did not close in time");
        }
        debug!(%url, ok = rendered.is_ok(), "browser session closed");
        rendered
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::FetchErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// What a mock page does when driven
    #[derive(Clone)]
    pub(crate) enum Script {
        Page(&'static str),
        Status(u16),
        Hang,
        NavigationError,
        /// Renders the page, then never finishes closing
        StuckClose(&'static str),
    }

    pub(crate) struct MockLauncher {
        pub script: Script,
        pub launches: Arc<AtomicUsize>,
        pub closes: Arc<AtomicUsize>,
    }

    impl MockLauncher {
        pub(crate) fn new(script: Script) -> Self {
            Self {
                script,
                launches: Arc::new(AtomicUsize::new(0)),
                closes: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    struct MockSession {
        script: Script,
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BrowserLauncher for MockLauncher {
        async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MockSession {
                script: self.script.clone(),
                closes: Arc::clone(&self.closes),
            }))
        }
    }

    #[async_trait]
    impl BrowserSession for MockSession {
        async fn navigate(&mut self, _url: &Url) -> Result<Option<u16>, FetchError> {
            match self.script {
                Script::Page(_) | Script::StuckClose(_) => Ok(Some(200)),
                Script::Status(status) => Ok(Some(status)),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(None)
                }
                Script::NavigationError => Err(FetchError::Browser("net::ERR_NAME_NOT_RESOLVED".into())),
            }
        }

        async fn content(&mut self) -> Result<String, FetchError> {
            match self.script {
                Script::Page(html) | Script::StuckClose(html) => Ok(html.to_string()),
                _ => Ok(String::new()),
            }
        }

        async fn close(self: Box<Self>) {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if let Script::StuckClose(_) = self.script {
                std::future::pending::<()>().await;
            }
        }
    }

    fn tier(launcher: MockLauncher) -> DynamicTier {
        let config = PipelineConfig::default()
            .with_navigation_timeout(5)
            .with_settle_delay(250);
        DynamicTier::new(Box::new(launcher), &config)
    }

    fn url() -> Url {
        Url::parse("https://example.com/article").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_renders_and_closes() {
        let launcher = MockLauncher::new(Script::Page("<html><body><p>Rendered story</p></body></html>"));
        let closes = Arc::clone(&launcher.closes);
        let text = tier(launcher).fetch(&url()).await.unwrap();
        assert_eq!(text, "Rendered story");
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_timeout_closes_session() {
        let launcher = MockLauncher::new(Script::Hang);
        let closes = Arc::clone(&launcher.closes);
        let err = tier(launcher).fetch(&url()).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_close_is_bounded() {
        let launcher = MockLauncher::new(Script::StuckClose("<p>Rendered story</p>"));
        let closes = Arc::clone(&launcher.closes);
        let started = tokio::time::Instant::now();

        let text = tier(launcher).fetch(&url()).await.unwrap();
        assert_eq!(text, "Rendered story");
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        // settle delay plus the close bound
        assert!(started.elapsed() <= Duration::from_millis(5_250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_challenge_page_detected() {
        let launcher = MockLauncher::new(Script::Page(
            "<html><title>Just a moment...</title><body>Checking your browser before accessing</body></html>",
        ));
        let closes = Arc::clone(&launcher.closes);
        let err = tier(launcher).fetch(&url()).await.unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::ChallengePageDetected);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_status_and_navigation_failure_close_session() {
        for script in [Script::Status(404), Script::NavigationError] {
            let launcher = MockLauncher::new(script);
            let closes = Arc::clone(&launcher.closes);
            assert!(tier(launcher).fetch(&url()).await.is_err());
            assert_eq!(closes.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_challenge_markers_case_insensitive() {
        let tier = tier(MockLauncher::new(Script::Hang));
        assert_eq!(
            tier.challenge_marker("<p>PLEASE ENABLE JAVASCRIPT to view</p>"),
            Some("please enable javascript")
        );
        assert_eq!(tier.challenge_marker("<p>An ordinary page</p>"), None);
    }
}
