//! Search query selection for the image search fallback.
//!
//! Strategies are evaluated in a fixed priority order; the first one that
//! applies becomes the primary query:
//!
//! 1. Amazon ASIN (`Amazon B08N5WRWNW`)
//! 2. Known product title, verbatim
//! 3. Domain + product name (+ id + variant params) parsed from the URL
//! 4. The raw URL
//!
//! Fallback simplification data comes from the URL heuristics and is attached
//! whenever they succeed, whichever strategy won.

use crate::metadata::heuristics;
use crate::metadata::models::{Fallback, QueryPlan, SearchStrategy, UrlComponents};
use regex_lite::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// ASIN patterns, tried in order.
static ASIN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)/dp/([A-Z0-9]{10})",
        r"(?i)/gp/product/([A-Z0-9]{10})",
        r"(?i)/d/([A-Z0-9]{10})",
        r"(?i)ASIN=([A-Z0-9]{10})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Everything a strategy evaluator may look at.
struct StrategyInput<'a> {
    url: &'a str,
    title: Option<&'a str>,
    components: &'a UrlComponents,
}

type Evaluator = fn(&StrategyInput<'_>) -> Option<SearchStrategy>;

const EVALUATORS: [Evaluator; 4] = [amazon_asin, known_title, domain_heuristic, raw_url];

/// Chooses the primary query for a URL and optional known title.
///
/// Returns `None` when no strategy applies (blank URL and no title).
pub fn build_query(url: &str, known_title: Option<&str>) -> Option<QueryPlan> {
    let components = heuristics::extract(url);
    let input = StrategyInput { url, title: known_title, components: &components };

    let strategy = EVALUATORS.iter().find_map(|evaluate| evaluate(&input))?;
    debug!("Using {} search: {}", strategy.label(), strategy.query());

    Some(QueryPlan { strategy, fallback: fallback_from(&components) })
}

/// Every applicable strategy in priority order; the first is the one [`build_query`] picks.
pub fn candidates(url: &str, known_title: Option<&str>) -> Vec<SearchStrategy> {
    let components = heuristics::extract(url);
    let input = StrategyInput { url, title: known_title, components: &components };

    EVALUATORS.iter().filter_map(|evaluate| evaluate(&input)).collect()
}

/// Extracts the 10-character ASIN from an Amazon product URL.
pub fn extract_asin(url: &str) -> Option<String> {
    if !url.to_lowercase().contains("amazon") {
        return None;
    }

    ASIN_PATTERNS.iter().find_map(|re| re.captures(url).map(|c| c[1].to_string()))
}

fn fallback_from(components: &UrlComponents) -> Option<Fallback> {
    match (&components.domain, &components.product_name) {
        (Some(domain), Some(name)) => Some(Fallback { domain: domain.clone(), name: name.clone() }),
        _ => None,
    }
}

fn amazon_asin(input: &StrategyInput<'_>) -> Option<SearchStrategy> {
    extract_asin(input.url).map(SearchStrategy::AmazonAsin)
}

fn known_title(input: &StrategyInput<'_>) -> Option<SearchStrategy> {
    input
        .title
        .filter(|t| !t.trim().is_empty())
        .map(|t| SearchStrategy::KnownTitle(t.to_string()))
}

fn domain_heuristic(input: &StrategyInput<'_>) -> Option<SearchStrategy> {
    let c = input.components;
    let (domain, name) = (c.domain.as_ref()?, c.product_name.as_ref()?);

    let mut parts = vec![domain.clone(), name.clone()];
    if let Some(id) = &c.product_id {
        parts.push(format!("item {}", id));
    }
    parts.extend(c.query_params.iter().cloned());

    Some(SearchStrategy::DomainHeuristic(parts.join(" ")))
}

fn raw_url(input: &StrategyInput<'_>) -> Option<SearchStrategy> {
    let url = input.url.trim();
    (!url.is_empty()).then(|| SearchStrategy::RawUrl(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amazon_asin_beats_title() {
        let plan = build_query("https://www.amazon.com/Some-Title/dp/B08N5WRWNW", Some("Echo Dot"))
            .unwrap();
        assert_eq!(plan.query(), "Amazon B08N5WRWNW");
        assert_eq!(plan.strategy, SearchStrategy::AmazonAsin("B08N5WRWNW".to_string()));
    }

    #[test]
    fn test_fallback_computed_even_when_asin_wins() {
        let plan = build_query("https://www.amazon.com/Some-Title/dp/B08N5WRWNW", None).unwrap();
        assert_eq!(
            plan.fallback,
            Some(Fallback { domain: "amazon".to_string(), name: "Some Title".to_string() })
        );
    }

    #[test]
    fn test_asin_patterns() {
        assert_eq!(
            extract_asin("https://www.amazon.com/gp/product/B000000001/ref=x"),
            Some("B000000001".to_string())
        );
        assert_eq!(
            extract_asin("https://www.amazon.co.uk/d/B0ABCDEF12"),
            Some("B0ABCDEF12".to_string())
        );
        assert_eq!(
            extract_asin("https://smile.amazon.com/exec?ASIN=B0ABCDEF12&tag=x"),
            Some("B0ABCDEF12".to_string())
        );
        assert_eq!(extract_asin("https://www.AMAZON.com/dp/b08n5wrwnw"), Some("b08n5wrwnw".into()));
    }

    #[test]
    fn test_asin_requires_amazon_host_text() {
        assert_eq!(extract_asin("https://a.co/d/B08N5WRWNW"), None);
        assert_eq!(extract_asin("https://www.amazon.com/b?node=123"), None);
    }

    #[test]
    fn test_amazon_without_asin_uses_title() {
        let plan = build_query("https://www.amazon.com/b?node=123", Some("Kindle")).unwrap();
        assert_eq!(plan.strategy, SearchStrategy::KnownTitle("Kindle".to_string()));
    }

    #[test]
    fn test_known_title_verbatim() {
        let plan = build_query("https://www.nordstrom.com/s/straw-shoulder-bag/8461451", Some(" Straw Bag "))
            .unwrap();
        assert_eq!(plan.query(), " Straw Bag ");
        assert!(plan.fallback.is_some());
    }

    #[test]
    fn test_blank_title_ignored() {
        let plan =
            build_query("https://www.nordstrom.com/s/straw-shoulder-bag/8461451", Some("   ")).unwrap();
        assert_eq!(plan.query(), "nordstrom straw shoulder bag item 8461451");
    }

    #[test]
    fn test_domain_heuristic_with_params() {
        let plan = build_query(
            "https://www.sephora.com/product/triclone-skin-tech-foundation-P502185?skuId=2597045",
            None,
        )
        .unwrap();
        assert_eq!(
            plan.strategy,
            SearchStrategy::DomainHeuristic(
                "sephora triclone skin tech foundation P502185 skuid 2597045".to_string()
            )
        );
    }

    #[test]
    fn test_raw_url_last_resort() {
        let plan = build_query("https://example.com/", None).unwrap();
        assert_eq!(plan.strategy, SearchStrategy::RawUrl("https://example.com/".to_string()));
        assert!(plan.fallback.is_none());
    }

    #[test]
    fn test_nothing_applies() {
        assert!(build_query("", None).is_none());
        assert!(build_query("  ", Some("")).is_none());
    }

    #[test]
    fn test_title_without_url() {
        let plan = build_query("", Some("Blue Mug")).unwrap();
        assert_eq!(plan.query(), "Blue Mug");
    }

    #[test]
    fn test_candidates_in_priority_order() {
        let labels: Vec<_> = candidates("https://www.amazon.com/Echo-Dot/dp/B08N5WRWNW", Some("Echo"))
            .iter()
            .map(|s| s.label())
            .collect();
        assert_eq!(labels, vec!["amazon-asin", "known-title", "domain-heuristic", "raw-url"]);
    }

    #[test]
    fn test_deterministic() {
        let url = "https://shop.lululemon.com/p/men-shorts/pace-breaker-short/prod11400110?color=black";
        assert_eq!(build_query(url, None), build_query(url, None));
    }
}
