//! Data models for resolved product metadata and the inputs used to find it.

use serde::{Deserialize, Serialize};

/// Representative image, title and description for one product URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMetadata {
    /// Product image URL
    pub image_url: Option<String>,
    /// Price, only populated when built with the `price` feature
    pub price: Option<f64>,
    /// Product title
    pub title: Option<String>,
    /// Product description
    pub description: Option<String>,
    /// True iff an image or a title was found
    pub success: bool,
    /// Most relevant failure when nothing usable was found
    pub error_message: Option<String>,
}

impl ProductMetadata {
    /// Creates a failed result carrying only an error message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self { error_message: Some(message.into()), ..Self::default() }
    }

    /// Returns true if an image URL is present and non-empty.
    pub fn has_image(&self) -> bool {
        is_present(&self.image_url)
    }

    /// Returns true if a title is present and non-empty.
    pub fn has_title(&self) -> bool {
        is_present(&self.title)
    }
}

fn is_present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Pieces of a product URL useful for building a search query.
///
/// Either every field is empty, or `domain` and `product_name` are both set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlComponents {
    /// Brand token taken from the host (`shop.lululemon.com` → `lululemon`)
    pub domain: Option<String>,
    /// Readable name derived from the longest dash slug
    pub product_name: Option<String>,
    /// Numeric or `prodNNN` path segment
    pub product_id: Option<String>,
    /// Whitelisted query parameters as `"key value"`
    pub query_params: Vec<String>,
}

impl UrlComponents {
    /// Returns true if the URL yielded no domain or product name.
    pub fn is_empty(&self) -> bool {
        self.domain.is_none() && self.product_name.is_none()
    }
}

/// How the primary search query was chosen, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value", rename_all = "snake_case")]
pub enum SearchStrategy {
    AmazonAsin(String),
    KnownTitle(String),
    DomainHeuristic(String),
    RawUrl(String),
}

impl SearchStrategy {
    /// The query string sent to the image search API.
    pub fn query(&self) -> String {
        match self {
            SearchStrategy::AmazonAsin(asin) => format!("Amazon {}", asin),
            SearchStrategy::KnownTitle(title) => title.clone(),
            SearchStrategy::DomainHeuristic(query) => query.clone(),
            SearchStrategy::RawUrl(url) => url.clone(),
        }
    }

    /// Short label for logs and plan output.
    pub fn label(&self) -> &'static str {
        match self {
            SearchStrategy::AmazonAsin(_) => "amazon-asin",
            SearchStrategy::KnownTitle(_) => "known-title",
            SearchStrategy::DomainHeuristic(_) => "domain-heuristic",
            SearchStrategy::RawUrl(_) => "raw-url",
        }
    }
}

/// Domain and product name reused for progressively simpler queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fallback {
    pub domain: String,
    pub name: String,
}

impl Fallback {
    /// Queries tried after the primary one, most specific first.
    pub fn simplified_queries(&self) -> Vec<String> {
        let mut queries = vec![format!("{} {}", self.domain, self.name)];

        let words: Vec<&str> = self.name.split_whitespace().collect();
        if words.len() > 4 {
            queries.push(format!("{} {}", self.domain, words[..4].join(" ")));
        }

        queries
    }
}

/// Primary strategy plus the data for fallback simplification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub strategy: SearchStrategy,
    pub fallback: Option<Fallback>,
}

impl QueryPlan {
    /// The primary query, before any fallback simplification.
    pub fn query(&self) -> String {
        self.strategy.query()
    }
}

/// Offline explanation of how a URL would be searched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub url: String,
    pub components: UrlComponents,
    /// Chosen primary strategy and fallback, if any strategy applies
    pub plan: Option<QueryPlan>,
    /// Every applicable strategy, highest priority first
    pub candidates: Vec<SearchStrategy>,
}

impl PlanReport {
    /// Queries in the order the resolver would send them.
    pub fn queries(&self) -> Vec<String> {
        let Some(plan) = &self.plan else {
            return Vec::new();
        };

        let mut queries = vec![plan.query()];
        for query in plan.fallback.iter().flat_map(Fallback::simplified_queries) {
            if !queries.contains(&query) {
                queries.push(query);
            }
        }
        queries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_metadata() {
        let meta = ProductMetadata::failed("Request timed out");
        assert!(!meta.success);
        assert_eq!(meta.error_message.as_deref(), Some("Request timed out"));
        assert!(!meta.has_image());
        assert!(!meta.has_title());
    }

    #[test]
    fn test_blank_fields_not_present() {
        let meta = ProductMetadata {
            image_url: Some("  ".to_string()),
            title: Some(String::new()),
            ..ProductMetadata::default()
        };
        assert!(!meta.has_image());
        assert!(!meta.has_title());
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let meta = ProductMetadata {
            image_url: Some("https://img/x.jpg".to_string()),
            success: true,
            ..ProductMetadata::default()
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"imageUrl\":\"https://img/x.jpg\""));
        assert!(json.contains("\"errorMessage\":null"));
    }

    #[test]
    fn test_strategy_queries() {
        assert_eq!(SearchStrategy::AmazonAsin("B08N5WRWNW".into()).query(), "Amazon B08N5WRWNW");
        assert_eq!(SearchStrategy::KnownTitle("Blue Mug".into()).query(), "Blue Mug");
        assert_eq!(SearchStrategy::RawUrl("https://x.com/".into()).query(), "https://x.com/");
    }

    #[test]
    fn test_fallback_short_name_single_query() {
        let fallback = Fallback { domain: "nordstrom".into(), name: "straw shoulder bag".into() };
        assert_eq!(fallback.simplified_queries(), vec!["nordstrom straw shoulder bag"]);
    }

    #[test]
    fn test_fallback_long_name_truncated() {
        let fallback =
            Fallback { domain: "target".into(), name: "kitchen towel set deluxe edition".into() };
        assert_eq!(
            fallback.simplified_queries(),
            vec!["target kitchen towel set deluxe edition", "target kitchen towel set deluxe"]
        );
    }

    #[test]
    fn test_plan_report_queries_deduplicated() {
        let report = PlanReport {
            url: "https://www.nordstrom.com/s/straw-shoulder-bag".into(),
            components: UrlComponents::default(),
            plan: Some(QueryPlan {
                strategy: SearchStrategy::DomainHeuristic("nordstrom straw shoulder bag".into()),
                fallback: Some(Fallback {
                    domain: "nordstrom".into(),
                    name: "straw shoulder bag".into(),
                }),
            }),
            candidates: Vec::new(),
        };
        assert_eq!(report.queries(), vec!["nordstrom straw shoulder bag"]);
    }

    #[test]
    fn test_plan_report_without_plan() {
        let report = PlanReport {
            url: String::new(),
            components: UrlComponents::default(),
            plan: None,
            candidates: Vec::new(),
        };
        assert!(report.queries().is_empty());
    }

    #[test]
    fn test_url_components_empty() {
        assert!(UrlComponents::default().is_empty());
    }
}
