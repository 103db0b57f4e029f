//! Image inventory

use scraper::Selector;
use tracing::debug;

use super::{ExtractionContext, ParsedDocument, StructureExtractor, compile_selector};
use crate::domain::analysis::{ImageRecord, UNKNOWN_FILE_NAME};
use crate::infrastructure::parsing_error::ParsingResult;

pub struct ImageExtractor {
    image: Selector,
}

impl ImageExtractor {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            image: compile_selector("img")?,
        })
    }
}

impl StructureExtractor for ImageExtractor {
    type Output = Vec<ImageRecord>;

    fn extract(&self, document: &ParsedDocument, context: &ExtractionContext) -> Vec<ImageRecord> {
        document
            .html()
            .select(&self.image)
            .map(|image| {
                let src = image.value().attr("src").unwrap_or_default();

                ImageRecord {
                    resolved_src: resolve_src(src, context),
                    alt: image.value().attr("alt").unwrap_or_default().to_string(),
                    title_attr: image.value().attr("title").unwrap_or_default().to_string(),
                    file_name: file_name_from_src(src),
                }
            })
            .collect()
    }
}

/// Resolve `src` against the page URL unless it already starts with `http`.
/// A failed resolution keeps the literal `src`.
pub fn resolve_src(src: &str, context: &ExtractionContext) -> String {
    if src.starts_with("http") {
        return src.to_string();
    }

    context.resolve(src).unwrap_or_else(|e| {
        debug!("Keeping unresolved image source: {}", e);
        src.to_string()
    })
}

/// Last `/`-delimited segment of the raw `src`, cut at the first `?`
pub fn file_name_from_src(src: &str) -> String {
    src.rsplit('/')
        .next()
        .and_then(|segment| segment.split('?').next())
        .filter(|name| !name.is_empty())
        .map_or_else(|| UNKNOWN_FILE_NAME.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://cdn.test/img/logo.png?v=3", "logo.png")]
    #[case("photo.jpg", "photo.jpg")]
    #[case("/assets/", "unknown")]
    #[case("", "unknown")]
    #[case("?only=query", "unknown")]
    #[case("a/b/c.svg?x=1?y=2", "c.svg")]
    fn derives_file_names(#[case] src: &str, #[case] expected: &str) {
        assert_eq!(file_name_from_src(src), expected);
    }

    #[test]
    fn resolves_relative_sources() {
        let context = ExtractionContext::new("https://example.com/blog/");
        assert_eq!(resolve_src("img/a.png", &context), "https://example.com/blog/img/a.png");
        assert_eq!(resolve_src("http://cdn.test/a.png", &context), "http://cdn.test/a.png");
    }

    #[test]
    fn falls_back_to_literal_src() {
        let context = ExtractionContext::new("not a url");
        assert_eq!(resolve_src("img/a.png", &context), "img/a.png");
    }

    #[test]
    fn missing_attributes_are_empty() {
        let document = ParsedDocument::parse(r#"<img src="/a.png"><img alt="Logo" title="t">"#, true).unwrap();
        let images = ImageExtractor::new()
            .unwrap()
            .extract(&document, &ExtractionContext::new("https://example.com"));

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].alt, "");
        assert_eq!(images[0].resolved_src, "https://example.com/a.png");
        assert_eq!(images[1].alt, "Logo");
        assert_eq!(images[1].file_name, "unknown");
        assert_eq!(images[1].resolved_src, "https://example.com/");
    }
}
