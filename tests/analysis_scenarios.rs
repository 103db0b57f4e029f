//! End-to-end analysis runs over canned pages served by in-memory relays

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use site_inspector_lib::application::{AnalysisError, PageAnalyzer};
use site_inspector_lib::domain::{LandmarkRole, LinkClassification};
use site_inspector_lib::infrastructure::config::ParsingConfig;
use site_inspector_lib::infrastructure::fetch_error::{FetchError, RelayError};
use site_inspector_lib::infrastructure::parsing::PageExtractor;
use site_inspector_lib::infrastructure::proxy_fetch::{ProxyFetchChain, RelayStrategy};

struct CannedRelay {
    html: Option<&'static str>,
}

#[async_trait]
impl RelayStrategy for CannedRelay {
    fn name(&self) -> &str {
        "canned"
    }

    async fn attempt(&self, _target_url: &str) -> Result<String, RelayError> {
        self.html.map(str::to_string).ok_or_else(|| RelayError::EmptyBody {
            relay: "canned".to_string(),
        })
    }
}

fn analyzer_serving(html: Option<&'static str>) -> PageAnalyzer {
    let chain = ProxyFetchChain::new(
        vec![Arc::new(CannedRelay { html }) as Arc<dyn RelayStrategy>],
        Duration::from_secs(1),
    );
    PageAnalyzer::new(chain, PageExtractor::new(ParsingConfig::default()).unwrap())
}

const BLOG_PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>Example Blog</title>
  <meta name="description" content="Posts about things">
  <style>body { color: #333; } a { color: #0066cc; } h1 { color: #333333; }</style>
</head>
<body>
  <header role="banner"><a href="#content">Skip</a></header>
  <main id="content">
    <h1>Latest posts</h1>
    <h2>First post</h2>
    <p style="background:#333">Read <a href="/posts/1" title="Post 1">more</a></p>
    <a href="https://other.org/ref"> </a>
    <img src="img/cover.jpg?w=800" alt="Cover">
    <img src="https://cdn.example.net/pixel.gif">
    <button aria-label="">x</button>
    <table><caption>Stats</caption><thead><tr><th>a</th></tr></thead><tr><td>1</td></tr></table>
  </main>
  <footer>Bye</footer>
</body>
</html>"##;

#[tokio::test]
async fn analyzes_a_typical_page() {
    let analysis = analyzer_serving(Some(BLOG_PAGE))
        .analyze("  example.com/blog/ ")
        .await
        .unwrap();

    assert_eq!(analysis.url, "https://example.com/blog/");
    assert_eq!(analysis.title, "Example Blog");
    assert_eq!(analysis.meta_description, "Posts about things");
    assert_eq!(analysis.raw_html, BLOG_PAGE);

    let classes: Vec<_> = analysis.links.iter().map(|link| link.classification).collect();
    assert_eq!(
        classes,
        vec![LinkClassification::Anchor, LinkClassification::Internal, LinkClassification::External]
    );
    assert_eq!(analysis.links[2].text, "(Empty Text)");

    assert_eq!(analysis.images[0].resolved_src, "https://example.com/blog/img/cover.jpg?w=800");
    assert_eq!(analysis.images[0].file_name, "cover.jpg");
    assert_eq!(analysis.images[1].resolved_src, "https://cdn.example.net/pixel.gif");

    let roles: Vec<_> = analysis.accessibility.landmarks.iter().map(|l| l.role).collect();
    assert_eq!(roles, vec![LandmarkRole::Main, LandmarkRole::Banner, LandmarkRole::Contentinfo]);

    assert_eq!(
        analysis.accessibility.errors,
        vec!["Critical: Found 1 element(s) with empty 'aria-label' attribute.".to_string()]
    );
    assert_eq!(analysis.accessibility.score, 90);
    assert_eq!(analysis.accessibility.tables.len(), 1);
    assert_eq!(analysis.accessibility.tables[0].caption.as_deref(), Some("Stats"));

    let colors: Vec<(&str, usize)> = analysis
        .css
        .detected_colors
        .iter()
        .map(|color| (color.hex.as_str(), color.occurrence_count))
        .collect();
    assert_eq!(colors, vec![("#333", 2), ("#0066CC", 1), ("#333333", 1)]);
    assert_eq!(analysis.css.inline_style_element_count, 1);

    assert_eq!(analysis.summary.link_count, 3);
    assert_eq!(analysis.summary.image_count, 2);
    assert_eq!(analysis.summary.error_count, 1);
    assert_eq!(analysis.summary.warning_count, 1);
}

#[tokio::test]
async fn double_h1_without_main_scores_eighty() {
    let analysis = analyzer_serving(Some("<h1>A</h1><h1>B</h1>"))
        .analyze("https://example.com")
        .await
        .unwrap();

    assert_eq!(
        analysis.accessibility.errors,
        vec![
            "Multiple H1 tags found.".to_string(),
            "No 'main' landmark detected.".to_string()
        ]
    );
    assert_eq!(analysis.accessibility.score, 80);
}

#[tokio::test]
async fn heading_skip_and_late_h1_are_reported() {
    let analysis = analyzer_serving(Some("<main><h2>Intro</h2><h1>Title</h1><h4>Deep</h4></main>"))
        .analyze("https://example.com")
        .await
        .unwrap();

    assert_eq!(
        analysis.accessibility.errors,
        vec![
            "Page does not start with an H1.".to_string(),
            "Header skip detected: H1 followed by H4".to_string()
        ]
    );
}

#[tokio::test]
async fn unreachable_page_reports_fetch_error() {
    let error = analyzer_serving(None).analyze("example.com").await.unwrap_err();
    assert!(matches!(
        error,
        AnalysisError::Fetch(FetchError::AllStrategiesExhausted { attempted: 1 })
    ));
}

#[tokio::test]
async fn repeated_runs_produce_identical_reports() {
    let analyzer = analyzer_serving(Some(BLOG_PAGE));
    let first = analyzer.analyze("example.com/blog/").await.unwrap();
    let second = analyzer.analyze("example.com/blog/").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn report_serializes_with_camel_case_fields() {
    let analyzer = analyzer_serving(None);
    let analysis = analyzer
        .analyze_html("https://example.com", "<main><h1>x</h1><img src=a.png></main>".to_string())
        .unwrap();

    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["metaDescription"], "No meta description found.");
    assert_eq!(json["images"][0]["fileName"], "a.png");
    assert_eq!(json["accessibility"]["score"], 100);
    assert_eq!(json["summary"]["warningCount"], 1);
    assert_eq!(json["css"]["inlineStyleElementCount"], 0);
}

#[tokio::test]
async fn concurrent_analyses_are_independent() {
    let analyzer = Arc::new(analyzer_serving(Some(BLOG_PAGE)));

    let handles: Vec<_> = ["example.com/blog/", "https://example.com/blog/", "example.com/other"]
        .into_iter()
        .map(|url| {
            let analyzer = Arc::clone(&analyzer);
            tokio::spawn(async move { analyzer.analyze(url).await })
        })
        .collect();

    let mut urls = Vec::new();
    for handle in handles {
        let analysis = handle.await.unwrap().unwrap();
        assert_eq!(analysis.accessibility.score, 90);
        urls.push(analysis.url);
    }
    assert_eq!(
        urls,
        vec!["https://example.com/blog/", "https://example.com/blog/", "https://example.com/other"]
    );
}
