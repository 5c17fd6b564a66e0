//! CSS selectors for product page metadata.
//!
//! OpenGraph and Twitter tags are matched on their `property` attribute; the
//! plain description tag on `name`. Lookup order lives in the parser.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for share-card meta tags and the document title.
pub mod meta {
    use super::*;

    pub static OG_IMAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[property='og:image']").unwrap());

    pub static TWITTER_IMAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[property='twitter:image']").unwrap());

    pub static OG_TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[property='og:title']").unwrap());

    pub static TWITTER_TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[property='twitter:title']").unwrap());

    pub static OG_DESCRIPTION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[property='og:description']").unwrap());

    pub static TWITTER_DESCRIPTION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[property='twitter:description']").unwrap());

    /// `<meta name="description">`
    pub static DESCRIPTION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[name='description']").unwrap());

    /// Document `<title>`.
    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
}

/// Selectors for price hints.
#[cfg(feature = "price")]
pub mod price {
    use super::*;

    /// Product price meta properties, most specific first.
    pub static PRICE_PROPERTIES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        [
            "meta[property='product:price:amount']",
            "meta[property='og:price:amount']",
            "meta[property='price']",
        ]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
    });

    /// Schema.org microdata price.
    pub static ITEMPROP: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[itemprop='price']").unwrap());

    /// JSON-LD structured data blocks.
    pub static JSON_LD: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("script[type='application/ld+json']").unwrap());

    pub static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_selectors_compile() {
        let _ = &*meta::OG_IMAGE;
        let _ = &*meta::TWITTER_IMAGE;
        let _ = &*meta::OG_TITLE;
        let _ = &*meta::TWITTER_TITLE;
        let _ = &*meta::OG_DESCRIPTION;
        let _ = &*meta::TWITTER_DESCRIPTION;
        let _ = &*meta::DESCRIPTION;
        let _ = &*meta::TITLE;
    }

    #[test]
    fn test_property_and_name_are_distinct() {
        let html = Html::parse_document(
            r#"<html><head>
                <meta name="og:image" content="https://wrong/name.jpg">
                <meta property="og:image" content="https://right/property.jpg">
            </head></html>"#,
        );

        let found: Vec<_> =
            html.select(&meta::OG_IMAGE).filter_map(|e| e.value().attr("content")).collect();
        assert_eq!(found, vec!["https://right/property.jpg"]);
    }
}
