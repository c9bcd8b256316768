//! Entry points: bytes or a URL in, clean text or a typed failure out

use crate::archive::ArchiveWalker;
use crate::artifact::SourceArtifact;
use crate::config::PipelineConfig;
use crate::error::{ExtractError, FetchError, Result};
use crate::link::{FetchAttempt, LinkFetcher};
use crate::registry::{FormatRegistry, Handler};
use std::sync::Arc;
use tracing::{info, warn};

/// Ties the registry, archive walker and link fetcher together.
///
/// A pipeline holds no per-request state; one instance can serve any number
/// of concurrent callers.
#[derive(Debug)]
pub struct Pipeline {
    registry: Arc<FormatRegistry>,
    walker: ArchiveWalker,
    fetcher: LinkFetcher,
    config: PipelineConfig,
}

impl Pipeline {
    /// Pipeline over the standard registry and the configured fetch tiers
    pub fn new(config: PipelineConfig) -> std::result::Result<Self, FetchError> {
        let fetcher = LinkFetcher::from_config(&config)?;
        Ok(Self::with_parts(FormatRegistry::global(), fetcher, config))
    }

    /// Pipeline over an injected registry and fetcher
    pub fn with_parts(
        registry: Arc<FormatRegistry>,
        fetcher: LinkFetcher,
        config: PipelineConfig,
    ) -> Self {
        Self {
            walker: ArchiveWalker::new(Arc::clone(&registry), &config),
            registry,
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Extract text from `bytes` declared as `declared_content_type`.
    ///
    /// Document formats return their extractor's output; HTML and web
    /// archives come back normalized. Archives are walked one level deep.
    pub fn extract_from_bytes(&self, bytes: &[u8], declared_content_type: &str) -> Result<String> {
        self.extract(bytes, declared_content_type, None)
    }

    pub fn extract_artifact(&self, artifact: &SourceArtifact) -> Result<String> {
        self.extract(
            &artifact.bytes,
            &artifact.declared_content_type,
            artifact.origin_name.as_deref(),
        )
    }

    fn extract(&self, bytes: &[u8], content_type: &str, origin: Option<&str>) -> Result<String> {
        if bytes.len() > self.config.max_input_bytes {
            return Err(ExtractError::ContentTooLarge {
                size: bytes.len(),
                max: self.config.max_input_bytes,
            });
        }

        let result = match self.registry.resolve(content_type)? {
            Handler::Document(format) => format.extract(bytes),
            Handler::Archive(kind) => self.walker.walk_named(bytes, kind, origin),
        };

        match &result {
            Ok(text) => info!(
                content_type,
                origin = origin.unwrap_or("<unnamed>"),
                chars = text.chars().count(),
                "extracted"
            ),
            Err(err) => warn!(
                content_type,
                origin = origin.unwrap_or("<unnamed>"),
                kind = ?err.kind(),
                error = %err,
                "extraction failed"
            ),
        }
        result
    }

    /// Fetch, render and normalize the page at `url`
    pub async fn extract_from_url(&self, url: &str) -> std::result::Result<String, FetchError> {
        self.fetcher.fetch(url).await
    }

    /// Like [`Pipeline::extract_from_url`], also returning every tier attempt
    pub async fn extract_from_url_with_report(
        &self,
        url: &str,
    ) -> (std::result::Result<String, FetchError>, Vec<FetchAttempt>) {
        self.fetcher.fetch_with_report(url).await
    }
}
