//! Output formatting for resolved metadata and query plans (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::metadata::{PlanReport, ProductMetadata};
use serde::Serialize;

/// One resolved URL as it appears in batch JSON output.
#[derive(Serialize)]
struct Entry<'a> {
    url: &'a str,
    #[serde(flatten)]
    metadata: &'a ProductMetadata,
}

/// Formats pipeline results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the result for a single URL.
    pub fn format_metadata(&self, url: &str, metadata: &ProductMetadata) -> String {
        match self.format {
            OutputFormat::Json => self.json_single(metadata),
            OutputFormat::Table => self.table_single(url, metadata),
            OutputFormat::Markdown => self.markdown_single(url, metadata),
            OutputFormat::Csv => self.csv_batch(&[(url.to_string(), metadata.clone())]),
        }
    }

    /// Formats results for several URLs, in input order.
    pub fn format_batch(&self, results: &[(String, ProductMetadata)]) -> String {
        if results.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No URLs resolved.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_batch(results),
            OutputFormat::Table => self.table_batch(results),
            OutputFormat::Markdown => self.markdown_batch(results),
            OutputFormat::Csv => self.csv_batch(results),
        }
    }

    /// Formats an offline query plan.
    pub fn format_plan(&self, report: &PlanReport) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_plan(report),
            OutputFormat::Markdown => self.markdown_plan(report),
            OutputFormat::Csv => self.csv_plan(report),
        }
    }

    // JSON formatting

    fn json_single(&self, metadata: &ProductMetadata) -> String {
        serde_json::to_string_pretty(metadata).unwrap_or_else(|_| "{}".to_string())
    }

    fn json_batch(&self, results: &[(String, ProductMetadata)]) -> String {
        let entries: Vec<Entry<'_>> =
            results.iter().map(|(url, metadata)| Entry { url, metadata }).collect();
        serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_single(&self, url: &str, metadata: &ProductMetadata) -> String {
        let mut lines = Vec::new();

        lines.push(format!("URL:         {}", url));
        lines.push(format!("Status:      {}", status(metadata)));
        lines.push(format!("Title:       {}", metadata.title.as_deref().unwrap_or("N/A")));
        lines.push(format!("Image:       {}", metadata.image_url.as_deref().unwrap_or("N/A")));

        if let Some(description) = &metadata.description {
            lines.push(format!("Description: {}", truncate(description, 100)));
        }

        if let Some(price) = metadata.price {
            lines.push(format!("Price:       {:.2}", price));
        }

        if let Some(error) = &metadata.error_message {
            lines.push(format!("Error:       {}", error));
        }

        lines.join("\n")
    }

    fn table_batch(&self, results: &[(String, ProductMetadata)]) -> String {
        let status_width = 6;
        let image_width = 5;
        let title_width = 40;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<status_width$}  {:<image_width$}  {:<title_width$}  {}",
            "Status", "Image", "Title", "URL"
        ));
        lines.push(format!(
            "{:-<status_width$}  {:-<image_width$}  {:-<title_width$}  {:-<30}",
            "", "", "", ""
        ));

        for (url, metadata) in results {
            let image = if metadata.has_image() { "Yes" } else { "No" };
            let title = metadata.title.as_deref().map(|t| truncate(t, title_width));

            lines.push(format!(
                "{:<status_width$}  {:<image_width$}  {:<title_width$}  {}",
                status(metadata),
                image,
                title.as_deref().unwrap_or("N/A"),
                url
            ));
        }

        let resolved = results.iter().filter(|(_, m)| m.success).count();
        lines.push(String::new());
        lines.push(format!("Total: {} URLs, {} resolved", results.len(), resolved));

        lines.join("\n")
    }

    fn table_plan(&self, report: &PlanReport) -> String {
        let c = &report.components;
        let mut lines = Vec::new();

        lines.push(format!("URL:        {}", report.url));
        lines.push(format!("Domain:     {}", c.domain.as_deref().unwrap_or("N/A")));
        lines.push(format!("Product:    {}", c.product_name.as_deref().unwrap_or("N/A")));
        lines.push(format!("Item id:    {}", c.product_id.as_deref().unwrap_or("N/A")));
        if !c.query_params.is_empty() {
            lines.push(format!("Params:     {}", c.query_params.join(", ")));
        }

        match &report.plan {
            Some(plan) => lines.push(format!("Strategy:   {}", plan.strategy.label())),
            None => {
                lines.push("Strategy:   none (nothing to search for)".to_string());
                return lines.join("\n");
            }
        }

        lines.push(String::new());
        lines.push("Queries:".to_string());
        for (i, query) in report.queries().iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, query));
        }

        lines.push(String::new());
        lines.push("Candidates:".to_string());
        for strategy in &report.candidates {
            lines.push(format!("  {:<18} {}", strategy.label(), strategy.query()));
        }

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_single(&self, url: &str, metadata: &ProductMetadata) -> String {
        let mut lines = Vec::new();

        lines.push(format!("## {}", metadata.title.as_deref().unwrap_or(url)));
        lines.push(String::new());

        lines.push(format!("- **URL:** [{}]({})", url, url));
        lines.push(format!("- **Status:** {}", status(metadata)));

        if let Some(image) = &metadata.image_url {
            lines.push(format!("- **Image:** ![product image]({})", image));
        }

        if let Some(description) = &metadata.description {
            lines.push(format!("- **Description:** {}", description));
        }

        if let Some(price) = metadata.price {
            lines.push(format!("- **Price:** {:.2}", price));
        }

        if let Some(error) = &metadata.error_message {
            lines.push(format!("- **Error:** {}", error));
        }

        lines.join("\n")
    }

    fn markdown_batch(&self, results: &[(String, ProductMetadata)]) -> String {
        let mut lines = Vec::new();

        lines.push("| Status | Title | Image | URL |".to_string());
        lines.push("|--------|-------|-------|-----|".to_string());

        for (url, metadata) in results {
            let title = metadata.title.as_deref().map(|t| truncate(t, 40)).unwrap_or_default();
            let image = metadata
                .image_url
                .as_deref()
                .map(|i| format!("[image]({})", i))
                .unwrap_or_default();

            lines.push(format!(
                "| {} | {} | {} | {} |",
                status(metadata),
                title.replace('|', "\\|"),
                image,
                url
            ));
        }

        let resolved = results.iter().filter(|(_, m)| m.success).count();
        lines.push(String::new());
        lines.push(format!("*{} of {} URLs resolved*", resolved, results.len()));

        lines.join("\n")
    }

    fn markdown_plan(&self, report: &PlanReport) -> String {
        let c = &report.components;
        let mut lines = Vec::new();

        lines.push(format!("## Search plan for {}", report.url));
        lines.push(String::new());

        if let (Some(domain), Some(name)) = (&c.domain, &c.product_name) {
            lines.push(format!("- **Domain:** {}", domain));
            lines.push(format!("- **Product:** {}", name));
        }
        if let Some(id) = &c.product_id {
            lines.push(format!("- **Item id:** {}", id));
        }

        match &report.plan {
            Some(plan) => lines.push(format!("- **Strategy:** `{}`", plan.strategy.label())),
            None => lines.push("- **Strategy:** none".to_string()),
        }

        let queries = report.queries();
        if !queries.is_empty() {
            lines.push(String::new());
            for (i, query) in queries.iter().enumerate() {
                lines.push(format!("{}. `{}`", i + 1, query));
            }
        }

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "url,success,title,image_url,description,price,error".to_string()
    }

    fn csv_batch(&self, results: &[(String, ProductMetadata)]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for (url, metadata) in results {
            let field = |value: &Option<String>| {
                value.as_deref().map(Self::csv_escape).unwrap_or_default()
            };
            let price = metadata.price.map(|p| p.to_string()).unwrap_or_default();

            lines.push(format!(
                "{},{},{},{},{},{},{}",
                Self::csv_escape(url),
                metadata.success,
                field(&metadata.title),
                field(&metadata.image_url),
                field(&metadata.description),
                price,
                field(&metadata.error_message)
            ));
        }

        lines.join("\n")
    }

    fn csv_plan(&self, report: &PlanReport) -> String {
        let mut lines = vec!["step,strategy,query".to_string()];

        if let Some(plan) = &report.plan {
            for (i, query) in report.queries().iter().enumerate() {
                let strategy = if i == 0 { plan.strategy.label() } else { "fallback" };
                lines.push(format!("{},{},{}", i + 1, strategy, Self::csv_escape(query)));
            }
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

fn status(metadata: &ProductMetadata) -> &'static str {
    if metadata.success {
        "OK"
    } else {
        "FAILED"
    }
}

/// Shortens `s` to at most `max` characters, marking the cut with "...".
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
