//! `site-inspector <url> [--recommend]`
//!
//! Prints the analysis report as pretty JSON on stdout. Diagnostics go to
//! stderr through the tracing subscriber.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use site_inspector_lib::application::{AnalysisError, PageAnalyzer};
use site_inspector_lib::domain::{AuditRecommendations, PageAnalysis};
use site_inspector_lib::infrastructure::config::ConfigManager;
use site_inspector_lib::infrastructure::logging::init_logging_with_config;
use site_inspector_lib::infrastructure::recommendation_provider::{
    ChatCompletionsProvider, recommend_or_fallback,
};

const USAGE: &str = "usage: site-inspector <url> [--recommend]";

struct CliArgs {
    url: String,
    recommend: bool,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<CliArgs> {
    let mut url = None;
    let mut recommend = false;

    for arg in args {
        if arg == "--recommend" {
            recommend = true;
        } else if arg.starts_with("--") {
            bail!("unknown option {arg}\n{USAGE}");
        } else if url.is_none() {
            url = Some(arg);
        } else {
            bail!("unexpected argument {arg}\n{USAGE}");
        }
    }

    Ok(CliArgs {
        url: url.context(USAGE)?,
        recommend,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CliReport {
    analysis: PageAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommendations: Option<AuditRecommendations>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(64);
        }
    };

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("site-inspector: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<ExitCode> {
    let config = ConfigManager::new()?.load_config()?;
    init_logging_with_config(config.logging.clone())?;

    let analyzer = PageAnalyzer::from_config(&config)?;

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling analysis");
            ctrl_c_token.cancel();
        }
    });

    let analysis = match analyzer.analyze_with_cancellation(&args.url, &token).await {
        Ok(analysis) => analysis,
        Err(e @ AnalysisError::Fetch(_)) => {
            eprintln!("{}", e.user_message());
            return Ok(ExitCode::from(1));
        }
        Err(e @ AnalysisError::Parse(_)) => {
            eprintln!("{}", e.user_message());
            return Ok(ExitCode::from(2));
        }
    };

    let recommendations = if args.recommend || config.recommendations.enabled {
        Some(match ChatCompletionsProvider::from_env(&config.recommendations) {
            Ok(provider) => recommend_or_fallback(&provider, &analysis).await,
            Err(e) => {
                warn!("Recommendation service unavailable, using fallback: {}", e);
                AuditRecommendations::fallback()
            }
        })
    } else {
        None
    };

    let report = CliReport {
        analysis,
        recommendations,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize report")?
    );
    Ok(ExitCode::SUCCESS)
}
