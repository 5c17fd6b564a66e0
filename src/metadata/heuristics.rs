//! Heuristic parsing of generic e-commerce product URLs.
//!
//! ```text
//! nordstrom.com/s/straw-shoulder-bag/8461451        → nordstrom, "straw shoulder bag", 8461451
//! lululemon.com/.../pace-breaker-short.../prod11400110?color=71300
//!                                                   → lululemon, "pace breaker short ...", prod11400110
//! sephora.com/product/...-P502185?skuId=2597045     → sephora, "...", params ["skuid 2597045"]
//! ```

use crate::metadata::models::UrlComponents;
use regex_lite::Regex;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

/// Path segments that never name a product.
const NOISE_SEGMENTS: [&str; 5] = ["s", "p", "item", "listing", "product"];

/// Query parameters that describe the product variant (everything else is tracking).
const RELEVANT_PARAMS: [&str; 8] =
    ["color", "colour", "size", "style", "sku", "skuid", "variant", "option"];

static PRODUCT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:\d+|prod\d+)$").unwrap());

/// Splits a product URL into domain, product name, product id and variant params.
///
/// Returns an all-empty value when the URL cannot be parsed or has no product slug.
pub fn extract(url: &str) -> UrlComponents {
    let parsed = match Url::parse(url.trim()) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Cannot parse URL '{}': {}", url, e);
            return UrlComponents::default();
        }
    };

    let Some(host) = parsed.host_str() else {
        return UrlComponents::default();
    };

    let domain = brand_token(host);
    let segments: Vec<&str> = parsed.path().split('/').filter(|s| !s.is_empty()).collect();

    let (slug, product_id) = scan_path(&segments);
    let Some(slug) = slug else {
        debug!("No product slug in path: {}", parsed.path());
        return UrlComponents::default();
    };

    let product_name = normalize_slug(slug);
    if domain.is_empty() || product_name.is_empty() {
        return UrlComponents::default();
    }

    UrlComponents {
        domain: Some(domain),
        product_name: Some(product_name),
        product_id: product_id.map(String::from),
        query_params: parsed.query().map(relevant_params).unwrap_or_default(),
    }
}

/// `www.nordstrom.com` → `nordstrom`, `shop.lululemon.com` → `lululemon`.
fn brand_token(host: &str) -> String {
    let host = host.trim_end_matches('.');
    let host = host.strip_prefix("www.").unwrap_or(host);
    let labels: Vec<&str> = host.split('.').collect();

    if labels.len() >= 2 {
        labels[labels.len() - 2].to_string()
    } else {
        labels[0].to_string()
    }
}

fn is_product_id(segment: &str) -> bool {
    PRODUCT_ID.is_match(segment)
}

/// Picks the longest dash slug (first wins on ties) and the last product id seen.
fn scan_path<'a>(segments: &[&'a str]) -> (Option<&'a str>, Option<&'a str>) {
    let mut slug: Option<&str> = None;
    let mut product_id: Option<&str> = None;

    for (i, &segment) in segments.iter().enumerate() {
        if segment.len() <= 2 || NOISE_SEGMENTS.iter().any(|n| segment.eq_ignore_ascii_case(n)) {
            continue;
        }

        if is_product_id(segment) {
            product_id = Some(segment);
            continue;
        }

        if segment.starts_with('-') || segment.starts_with('_') || segment.starts_with("A-") {
            continue;
        }

        if segment.contains('-') && segment.len() > 3 {
            if slug.map_or(true, |current| segment.len() > current.len()) {
                slug = Some(segment);
            }

            if let Some(&next) = segments.get(i + 1) {
                if is_product_id(next) {
                    product_id = Some(next);
                }
            }
        }
    }

    (slug, product_id)
}

/// `"straw-shoulder-bag"` → `"straw shoulder bag"`.
fn normalize_slug(slug: &str) -> String {
    let decoded =
        urlencoding::decode(slug).map(|s| s.into_owned()).unwrap_or_else(|_| slug.to_string());

    let cleaned: String = decoded
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps whitelisted `key=value` pairs as `"key value"`, in URL order.
///
/// Purely numeric values are dropped unless the key looks like an identifier
/// (`sku`, `id`): `color=71300` is a cryptic code, `skuId=2597045` is not.
fn relevant_params(query: &str) -> Vec<String> {
    query
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.split('=');
            let (key, value) = (parts.next()?, parts.next()?);
            if parts.next().is_some() {
                return None;
            }

            let key = key.to_lowercase();
            if !RELEVANT_PARAMS.contains(&key.as_str()) {
                return None;
            }

            let value = urlencoding::decode(value).ok()?;
            let value = value.trim();
            if value.is_empty() {
                return None;
            }

            let is_numeric = value.chars().all(|c| c.is_ascii_digit());
            let is_identifier = key.contains("sku") || key.contains("id");
            if is_numeric && !is_identifier {
                debug!("Skipping numeric {} parameter: {}", key, value);
                return None;
            }

            Some(format!("{} {}", key, value))
        })
        .collect()
}
