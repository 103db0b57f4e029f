//! Infrastructure layer: relay fetching, HTML parsing and external integrations
//!
//! Configuration and logging live here too, next to the adapters they tune.

pub mod config;
pub mod fetch_error;
pub mod http_client;
pub mod logging;
pub mod parsing;
pub mod parsing_error;
pub mod proxy_fetch;
pub mod recommendation_provider;

pub use config::{AppConfig, ConfigManager, FetchConfig, LoggingConfig, ParsingConfig, RecommendationConfig};
pub use fetch_error::{FetchError, RelayError};
pub use http_client::RelayHttpClient;
pub use logging::{get_log_directory, init_logging_with_config};
pub use parsing::{PageExtractor, ParsedDocument};
pub use parsing_error::{ParsingError, ParsingResult};
pub use proxy_fetch::{HttpRelay, ProxyFetchChain, RelayStrategy};
pub use recommendation_provider::{
    ChatCompletionsProvider, RecommendationError, RecommendationProvider, recommend_or_fallback,
};
