//! URL output formatter

use crate::analysis::AnalysisReport;
use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;

/// URL formatter - outputs a map URL centred on the report's viewport
pub struct UrlFormatter;

impl UrlFormatter {
    /// Format URL with optional provider override
    pub fn format_with_provider(
        &self,
        report: &AnalysisReport<'_>,
        config: &Config,
        provider: Option<&str>,
    ) -> Result<String> {
        config.format_url(provider, &report.viewport)
    }
}

impl OutputFormatter for UrlFormatter {
    fn name(&self) -> &str {
        "url"
    }

    fn description(&self) -> &str {
        "Map URL for the focus area"
    }

    fn format(&self, report: &AnalysisReport<'_>, config: &Config) -> Result<String> {
        self.format_with_provider(report, config, None)
    }
}
