//! Offline query plan: shows how a URL would be searched without touching the network.

use crate::config::Config;
use crate::format::Formatter;
use crate::metadata::{heuristics, strategy, PlanReport};

/// Builds the plan report for a URL and optional known title.
pub fn build_report(url: &str, title: Option<&str>) -> PlanReport {
    PlanReport {
        url: url.to_string(),
        components: heuristics::extract(url),
        plan: strategy::build_query(url, title),
        candidates: strategy::candidates(url, title),
    }
}

/// Prints the search strategy chosen for a URL.
pub struct PlanCommand {
    config: Config,
}

impl PlanCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn execute(&self, url: &str, title: Option<&str>) -> String {
        let report = build_report(url, title);
        Formatter::new(self.config.format).format_plan(&report)
    }
}
