//! Proxy fetch chain
//!
//! Retrieves a page's markup through an ordered list of third-party relay
//! strategies. Strategies run strictly one after another; the first
//! non-empty body wins and the remaining strategies are never attempted.
//! Each attempt is bounded by its own timeout, and a timed-out attempt is
//! dropped (releasing its connection) before the next one starts.

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::infrastructure::config::{FetchConfig, RelayConfig, RelayEnvelope};
use crate::infrastructure::fetch_error::{FetchError, RelayError};
use crate::infrastructure::http_client::RelayHttpClient;

/// Placeholder in relay templates replaced by the encoded target URL
pub const TARGET_PLACEHOLDER: &str = "{url}";

/// Everything except ASCII alphanumerics and `-_.!~*'()` is escaped
const TARGET_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// One way of retrieving a page's markup
#[async_trait]
pub trait RelayStrategy: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Fetch the raw HTML of `target_url`
    async fn attempt(&self, target_url: &str) -> Result<String, RelayError>;
}

#[derive(Debug, Deserialize)]
struct ContentsEnvelope {
    contents: Option<String>,
}

/// Relay reached over HTTP, described by a [`RelayConfig`]
pub struct HttpRelay {
    config: RelayConfig,
    client: Arc<RelayHttpClient>,
}

impl HttpRelay {
    pub fn new(config: RelayConfig, client: Arc<RelayHttpClient>) -> Self {
        Self { config, client }
    }

    /// Relay request URL for the given target
    pub fn request_url(&self, target_url: &str) -> Result<String, RelayError> {
        build_request_url(&self.config, target_url)
    }
}

#[async_trait]
impl RelayStrategy for HttpRelay {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn attempt(&self, target_url: &str) -> Result<String, RelayError> {
        let request_url = self.request_url(target_url)?;
        let transport = |source| RelayError::Transport {
            relay: self.config.name.clone(),
            source,
        };

        let response = self.client.get(&request_url).await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::HttpStatus {
                relay: self.config.name.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        unwrap_envelope(&self.config, body)
    }
}

/// Substitute the percent-encoded target into the relay template
pub fn build_request_url(config: &RelayConfig, target_url: &str) -> Result<String, RelayError> {
    if !config.url_template.contains(TARGET_PLACEHOLDER) {
        return Err(RelayError::InvalidEndpoint {
            relay: config.name.clone(),
            template: config.url_template.clone(),
        });
    }

    let encoded = utf8_percent_encode(target_url, TARGET_ENCODE_SET).to_string();
    Ok(config.url_template.replace(TARGET_PLACEHOLDER, &encoded))
}

/// Extract the page body from the relay's response envelope
pub fn unwrap_envelope(config: &RelayConfig, body: String) -> Result<String, RelayError> {
    match config.envelope {
        RelayEnvelope::RawText => Ok(body),
        RelayEnvelope::JsonContents => {
            let envelope: ContentsEnvelope =
                serde_json::from_str(&body).map_err(|e| RelayError::MalformedEnvelope {
                    relay: config.name.clone(),
                    reason: e.to_string(),
                })?;

            envelope
                .contents
                .filter(|contents| !contents.is_empty())
                .ok_or_else(|| RelayError::MalformedEnvelope {
                    relay: config.name.clone(),
                    reason: "no contents".to_string(),
                })
        }
    }
}

/// Ordered fallback over relay strategies
pub struct ProxyFetchChain {
    strategies: Vec<Arc<dyn RelayStrategy>>,
    attempt_timeout: Duration,
}

impl ProxyFetchChain {
    pub fn new(strategies: Vec<Arc<dyn RelayStrategy>>, attempt_timeout: Duration) -> Self {
        Self {
            strategies,
            attempt_timeout,
        }
    }

    /// Build HTTP relays for every configured endpoint, sharing one client
    pub fn from_config(config: &FetchConfig) -> anyhow::Result<Self> {
        let client = Arc::new(RelayHttpClient::new(config)?);
        let strategies = config
            .relays
            .iter()
            .map(|relay| {
                Arc::new(HttpRelay::new(relay.clone(), Arc::clone(&client))) as Arc<dyn RelayStrategy>
            })
            .collect();

        Ok(Self::new(
            strategies,
            Duration::from_secs(config.attempt_timeout_seconds),
        ))
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|strategy| strategy.name()).collect()
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Fetch the raw HTML of `url`, walking the strategies in order
    pub async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.fetch_html_with_cancellation(url, &CancellationToken::new())
            .await
    }

    /// Like [`fetch_html`](Self::fetch_html), aborting the in-flight attempt
    /// when `token` is cancelled
    pub async fn fetch_html_with_cancellation(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<String, FetchError> {
        for (index, strategy) in self.strategies.iter().enumerate() {
            if token.is_cancelled() {
                return Err(FetchError::Cancelled);
            }

            let outcome = tokio::select! {
                biased;
                () = token.cancelled() => {
                    warn!(relay = strategy.name(), "Page retrieval cancelled");
                    return Err(FetchError::Cancelled);
                }
                outcome = self.run_attempt(strategy.as_ref(), url) => outcome,
            };

            match outcome {
                Ok(body) => {
                    info!(
                        relay = strategy.name(),
                        attempt = index + 1,
                        bytes = body.len(),
                        "Fetched page through relay"
                    );
                    return Ok(body);
                }
                Err(e) => {
                    warn!(
                        relay = strategy.name(),
                        attempt = index + 1,
                        error = %e,
                        "Proxy strategy failed, trying next"
                    );
                }
            }
        }

        error!(
            url,
            attempted = self.strategies.len(),
            "All proxy strategies failed"
        );
        Err(FetchError::AllStrategiesExhausted {
            attempted: self.strategies.len(),
        })
    }

    async fn run_attempt(&self, strategy: &dyn RelayStrategy, url: &str) -> Result<String, RelayError> {
        match tokio::time::timeout(self.attempt_timeout, strategy.attempt(url)).await {
            Ok(Ok(body)) if body.trim().is_empty() => Err(RelayError::EmptyBody {
                relay: strategy.name().to_string(),
            }),
            Ok(result) => result,
            Err(_) => Err(RelayError::Timeout {
                relay: strategy.name().to_string(),
                timeout: self.attempt_timeout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::relays;

    fn json_relay() -> RelayConfig {
        RelayConfig::new("allorigins", relays::ALL_ORIGINS, RelayEnvelope::JsonContents)
    }

    #[test]
    fn encodes_target_into_template() {
        let url = build_request_url(&json_relay(), "https://example.com/a?b=1&c=2").unwrap();
        assert_eq!(
            url,
            "https://api.allorigins.win/get?url=https%3A%2F%2Fexample.com%2Fa%3Fb%3D1%26c%3D2&disableCache=true"
        );
    }

    #[test]
    fn spaces_are_percent_encoded() {
        let relay = RelayConfig::new("corsproxy", relays::CORS_PROXY, RelayEnvelope::RawText);
        let url = build_request_url(&relay, "https://example.com/a b?q=x y&r=(1)!~*'").unwrap();
        assert_eq!(
            url,
            "https://corsproxy.io/?https%3A%2F%2Fexample.com%2Fa%20b%3Fq%3Dx%20y%26r%3D(1)!~*'"
        );
        assert!(!url.contains('+'));
    }

    #[test]
    fn template_without_placeholder_is_invalid() {
        let relay = RelayConfig::new("broken", "https://relay.test/", RelayEnvelope::RawText);
        assert!(matches!(
            build_request_url(&relay, "https://example.com"),
            Err(RelayError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn json_envelope_yields_contents() {
        let body = r#"{"contents":"<html><title>t</title></html>","status":{"http_code":200}}"#;
        assert_eq!(
            unwrap_envelope(&json_relay(), body.to_string()).unwrap(),
            "<html><title>t</title></html>"
        );
    }

    #[test]
    fn json_envelope_without_contents_is_malformed() {
        for body in [r#"{"contents":null}"#, r#"{"contents":""}"#, "{}", "<html>not json</html>"] {
            assert!(matches!(
                unwrap_envelope(&json_relay(), body.to_string()),
                Err(RelayError::MalformedEnvelope { .. })
            ));
        }
    }

    #[test]
    fn raw_envelope_passes_body_through() {
        let relay = RelayConfig::new("codetabs", relays::CODE_TABS, RelayEnvelope::RawText);
        assert_eq!(unwrap_envelope(&relay, "<p>hi</p>".into()).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn chain_from_default_config_keeps_relay_order() {
        let chain = ProxyFetchChain::from_config(&FetchConfig::default()).unwrap();
        assert_eq!(chain.strategy_names(), vec!["allorigins", "codetabs", "corsproxy"]);
        assert_eq!(chain.attempt_timeout(), Duration::from_secs(10));
    }
}
