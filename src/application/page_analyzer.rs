//! Page analysis use case
//!
//! Normalizes the target URL, retrieves the markup through the proxy chain,
//! then parses and audits it. Parsing is synchronous and happens after the
//! fetch completes; the parsed tree never crosses an await point.

use anyhow::{Context, Result};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::domain::analysis::PageAnalysis;
use crate::domain::page_url::PageUrl;
use crate::domain::report_assembler;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::fetch_error::FetchError;
use crate::infrastructure::parsing::PageExtractor;
use crate::infrastructure::parsing_error::ParsingError;
use crate::infrastructure::proxy_fetch::ProxyFetchChain;

pub const PARSE_FAILURE_MESSAGE: &str = "The page was retrieved but its markup could not be analyzed.";

/// Failure of a whole analysis run
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{}", PARSE_FAILURE_MESSAGE)]
    Parse(#[from] ParsingError),
}

impl AnalysisError {
    /// Text suitable for showing to the person who asked for the analysis
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

pub struct PageAnalyzer {
    chain: ProxyFetchChain,
    extractor: PageExtractor,
}

impl PageAnalyzer {
    pub fn new(chain: ProxyFetchChain, extractor: PageExtractor) -> Self {
        Self { chain, extractor }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let chain = ProxyFetchChain::from_config(&config.fetch).context("Failed to build proxy fetch chain")?;
        let extractor = PageExtractor::new(config.parsing.clone()).context("Failed to build page extractor")?;
        Ok(Self::new(chain, extractor))
    }

    /// Analyze the page behind `input`, a URL with or without scheme
    pub async fn analyze(&self, input: &str) -> Result<PageAnalysis, AnalysisError> {
        self.analyze_with_cancellation(input, &CancellationToken::new()).await
    }

    pub async fn analyze_with_cancellation(
        &self,
        input: &str,
        token: &CancellationToken,
    ) -> Result<PageAnalysis, AnalysisError> {
        let url = PageUrl::normalize(input);
        let span = info_span!("analysis", id = %Uuid::new_v4(), url = %url);

        async {
            info!("Starting page analysis");
            let html = self.chain.fetch_html_with_cancellation(url.as_str(), token).await?;
            let analysis = self.analyze_html(url.as_str(), html)?;

            info!(
                score = analysis.accessibility.score,
                errors = analysis.summary.error_count,
                links = analysis.summary.link_count,
                images = analysis.summary.image_count,
                "Page analysis completed"
            );
            Ok::<_, AnalysisError>(analysis)
        }
        .instrument(span)
        .await
    }

    /// Parse and audit markup that has already been retrieved
    pub fn analyze_html(&self, url: &str, html: String) -> Result<PageAnalysis, ParsingError> {
        let document = self.extractor.parse(&html)?;
        debug!(recovered_errors = document.recovered_errors(), "Parsed document");

        let structure = self.extractor.extract(&document, url);
        Ok(report_assembler::assemble(url, html, structure))
    }
}
