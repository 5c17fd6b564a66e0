//! Best-effort price extraction from product pages.
//!
//! Only compiled with the `price` feature. Order: price meta properties,
//! schema.org `itemprop`, JSON-LD offers, then a currency pattern in page text.

use crate::metadata::parser::first_content;
use crate::metadata::selectors::price;
use regex_lite::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

static JSON_LD_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""price"\s*:\s*["']?(\d+\.?\d{0,2})["']?"#).unwrap());

static JSON_LD_LOW_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""lowPrice"\s*:\s*["']?(\d+\.?\d{0,2})["']?"#).unwrap());

static TEXT_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$€£¥]\s*(\d{1,6}(?:[.,]\d{2})?)").unwrap());

/// Extracts the first recognisable price from a parsed page.
pub fn extract_price(document: &Html) -> Option<f64> {
    let selectors: Vec<&Selector> =
        price::PRICE_PROPERTIES.iter().chain(std::iter::once(&*price::ITEMPROP)).collect();

    let structured = first_content(document, &selectors).or_else(|| json_ld_price(document));

    if let Some(value) = structured.as_deref().and_then(parse_amount) {
        return Some(value);
    }

    text_price(document)
}

fn json_ld_price(document: &Html) -> Option<String> {
    document.select(&price::JSON_LD).find_map(|script| {
        let json = script.text().collect::<String>();
        JSON_LD_PRICE
            .captures(&json)
            .or_else(|| JSON_LD_LOW_PRICE.captures(&json))
            .map(|c| c[1].to_string())
    })
}

fn text_price(document: &Html) -> Option<f64> {
    let text = document
        .select(&price::BODY)
        .next()
        .map(|body| body.text().collect::<Vec<_>>().join(" "))?;

    let captures = TEXT_PRICE.captures(&text)?;
    let value = captures[1].replace(',', ".");
    debug!("Price from page text: {}", value);
    value.parse().ok()
}

/// Strips currency symbols and thousands separators before parsing.
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String =
        raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}
