//! HTML parser for product page share tags.

use crate::metadata::selectors::meta;
use scraper::{Html, Selector};
use tracing::trace;

/// Fields lifted from a product page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageTags {
    pub image_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

/// Parses a product page, taking the first non-empty tag per field.
///
/// - image: `og:image`, `twitter:image`
/// - title: `og:title`, `twitter:title`, `<title>`
/// - description: `og:description`, `twitter:description`, `meta[name=description]`
pub fn parse_page(html: &str) -> PageTags {
    let document = Html::parse_document(html);

    let image_url = first_content(&document, &[&*meta::OG_IMAGE, &*meta::TWITTER_IMAGE]);

    let title = first_content(&document, &[&*meta::OG_TITLE, &*meta::TWITTER_TITLE])
        .or_else(|| document_title(&document));

    let description = first_content(
        &document,
        &[&*meta::OG_DESCRIPTION, &*meta::TWITTER_DESCRIPTION, &*meta::DESCRIPTION],
    );

    #[cfg(feature = "price")]
    let price = super::price::extract_price(&document);
    #[cfg(not(feature = "price"))]
    let price = None;

    trace!("Parsed tags: title={:?} image={:?}", title, image_url);

    PageTags { image_url, title, description, price }
}

/// Returns the `content` attribute of the first selector that yields a non-empty value.
pub(crate) fn first_content(document: &Html, selectors: &[&Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        document
            .select(selector)
            .next()
            .and_then(|e| e.value().attr("content"))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    })
}

fn document_title(document: &Html) -> Option<String> {
    document
        .select(&meta::TITLE)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}
