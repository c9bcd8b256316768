//! Escalating link fetcher
//!
//! A URL is tried against an ordered list of tiers, cheapest first. Each
//! tier's rendered text is normalized and checked against the good-enough
//! predicate; the first tier that passes wins and later tiers never run.
//!
//! ```text
//! ┌────────┐  short   ┌─────────┐  short   ┌─────────┐
//! │ Static │ ───────► │ Evasive │ ───────► │ Dynamic │ ──► Exhausted
//! └────────┘  /error  └─────────┘  /error  └─────────┘
//!      │ ok                │ ok                 │ ok
//!      └───────────────────┴────────────────────┴──────► normalized text
//! ```

mod dynamic;
mod http;

#[cfg(feature = "browser")]
mod chromium;

pub use dynamic::{BrowserLauncher, BrowserSession, DynamicTier};
pub use http::{EvasiveTier, StaticTier};

#[cfg(feature = "browser")]
pub use chromium::ChromiumLauncher;

use crate::config::PipelineConfig;
use crate::error::{FetchError, FetchErrorKind};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::time::Duration;
use textmill_normalize::normalize;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

static URL_IN_TEXT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"https?://[^\s]+").ok());

/// One strategy level, in escalation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Static,
    Evasive,
    Dynamic,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Static => "static",
            Tier::Evasive => "evasive",
            Tier::Dynamic => "dynamic",
        })
    }
}

/// How a single tier attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Accepted { chars: usize },
    Failed { kind: FetchErrorKind, detail: String },
}

/// Record of one tier attempt
#[derive(Debug, Clone)]
pub struct FetchAttempt {
    pub tier: Tier,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
    pub http_status: Option<u16>,
    pub timed_out: bool,
}

impl FetchAttempt {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Accepted { .. })
    }
}

/// A way of turning a URL into rendered, not yet normalized, page text
#[async_trait]
pub trait FetchTier: Send + Sync {
    fn tier(&self) -> Tier;

    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Escalation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetcherPolicy {
    /// Text must be longer than this many characters to stop escalation
    pub min_text_length: usize,
}

impl Default for FetcherPolicy {
    fn default() -> Self {
        Self {
            min_text_length: crate::config::DEFAULT_MIN_TEXT_LENGTH,
        }
    }
}

/// Whether `text` is long enough to accept without trying a costlier tier
pub fn is_good_enough(text: &str, threshold: usize) -> bool {
    text.trim().chars().count() > threshold
}

/// The first `http://` or `https://` token in free text
pub fn first_url_in(text: &str) -> Option<&str> {
    URL_IN_TEXT.as_ref()?.find(text).map(|m| m.as_str())
}

fn parse_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl(format!(
            "unsupported scheme {:?} in {}",
            other, raw
        ))),
    }
}

/// Runs fetch tiers in order until one yields good-enough text
pub struct LinkFetcher {
    tiers: Vec<Box<dyn FetchTier>>,
    policy: FetcherPolicy,
}

impl fmt::Debug for LinkFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkFetcher")
            .field("tiers", &self.tiers())
            .field("policy", &self.policy)
            .finish()
    }
}

impl LinkFetcher {
    pub fn new(tiers: Vec<Box<dyn FetchTier>>, policy: FetcherPolicy) -> Self {
        Self { tiers, policy }
    }

    /// Static and Evasive HTTP tiers, then headless Chromium when the
    /// `browser` feature is enabled
    pub fn from_config(config: &PipelineConfig) -> Result<Self, FetchError> {
        #[allow(unused_mut)]
        let mut tiers: Vec<Box<dyn FetchTier>> = vec![
            Box::new(StaticTier::new(config)?),
            Box::new(EvasiveTier::new(config)?),
        ];
        #[cfg(feature = "browser")]
        tiers.push(Box::new(DynamicTier::new(
            Box::new(ChromiumLauncher::new(config.navigation_timeout())),
            config,
        )));

        Ok(Self::new(
            tiers,
            FetcherPolicy {
                min_text_length: config.min_text_length,
            },
        ))
    }

    /// Configured tiers, in escalation order
    pub fn tiers(&self) -> Vec<Tier> {
        self.tiers.iter().map(|tier| tier.tier()).collect()
    }

    /// Normalized text for `url`, or the reason every tier failed
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.fetch_with_report(url).await.0
    }

    /// Like [`LinkFetcher::fetch`], also returning a record of every tier
    /// that ran.
    ///
    /// The last tier's text is accepted when it is non-empty even if it falls
    /// short of the threshold, since there is nothing left to escalate to.
    pub async fn fetch_with_report(
        &self,
        url: &str,
    ) -> (Result<String, FetchError>, Vec<FetchAttempt>) {
        let url = match parse_url(url) {
            Ok(url) => url,
            Err(err) => return (Err(err), Vec::new()),
        };

        let mut attempts = Vec::with_capacity(self.tiers.len());
        let last = self.tiers.len().saturating_sub(1);

        for (index, tier) in self.tiers.iter().enumerate() {
            let started = Instant::now();
            let result = tier.fetch(&url).await.map(|raw| normalize(&raw));
            let elapsed = started.elapsed();

            let error = match result {
                Ok(text)
                    if is_good_enough(&text, self.policy.min_text_length)
                        || (index == last && !text.is_empty()) =>
                {
                    let chars = text.chars().count();
                    info!(tier = %tier.tier(), %url, chars, elapsed_ms = elapsed.as_millis() as u64, "fetch accepted");
                    debug!(preview = %text.chars().take(200).collect::<String>(), "accepted text");
                    attempts.push(FetchAttempt {
                        tier: tier.tier(),
                        outcome: AttemptOutcome::Accepted { chars },
                        elapsed,
                        http_status: None,
                        timed_out: false,
                    });
                    return (Ok(text), attempts);
                }
                Ok(text) => FetchError::InsufficientContent {
                    chars: text.chars().count(),
                },
                Err(err) => err,
            };

            let http_status = match error {
                FetchError::HttpStatus(status) => Some(status),
                _ => None,
            };
            let timed_out = error.is_timeout();
            warn!(
                tier = %tier.tier(),
                %url,
                error = %error,
                elapsed_ms = elapsed.as_millis() as u64,
                ?http_status,
                timed_out,
                "fetch tier failed"
            );
            if index < last {
                info!(from = %tier.tier(), %url, "escalating to next tier");
            }
            attempts.push(FetchAttempt {
                tier: tier.tier(),
                http_status,
                timed_out,
                outcome: AttemptOutcome::Failed {
                    kind: error.kind(),
                    detail: error.to_string(),
                },
                elapsed,
            });
        }

        (
            Err(FetchError::Exhausted {
                attempts: attempts.clone(),
            }),
            attempts,
        )
    }
}
