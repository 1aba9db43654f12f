//! Human-readable text output formatter

use crate::analysis::AnalysisReport;
use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::poi::{all_categories, PoiRecord};

/// Text formatter - outputs stats, focus area and one table page
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable summary and table"
    }

    fn format(&self, report: &AnalysisReport<'_>, _config: &Config) -> Result<String> {
        let mut output = String::new();
        let stats = &report.stats;

        // Header
        output.push_str(&format!("poi-median analysis ({})\n", report.id));
        output.push_str(&format!(
            "Created: {}\n\n",
            report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        // Stats
        output.push_str(&format!(
            "POIs: {} classified, {} errors, {} without usable coordinates\n",
            stats.total, stats.error_count, stats.malformed_count
        ));
        for category in all_categories() {
            output.push_str(&format!(
                "  {:<17} {}\n",
                format!("{}:", category),
                stats.count(category)
            ));
        }
        output.push_str(&format!(
            "Validity rate: {:.1}%\n\n",
            stats.validity_rate * 100.0
        ));

        // Focus area
        match &report.summary {
            Some(summary) => output.push_str(&format!(
                "Focus: ({:.6}, {:.6}) radius {:.0}m over {} POIs, zoom {:.1}\n\n",
                summary.centroid.lat,
                summary.centroid.lng,
                summary.radius_meters,
                summary.count,
                report.viewport.zoom
            )),
            None => output.push_str(&format!(
                "Focus: no data, default view ({:.6}, {:.6}) zoom {:.1}\n\n",
                report.viewport.center.lat, report.viewport.center.lng, report.viewport.zoom
            )),
        }

        // Table
        let page = &report.page;
        if page.items.is_empty() {
            output.push_str("No POIs match the current filters\n");
            return Ok(output);
        }

        output.push_str(&format!(
            "{:<12} {:<24} {:<17} {:>11} {:>12} {:>10}\n",
            "ID", "Name", "Status", "Latitude", "Longitude", "Distance"
        ));
        for record in &page.items {
            output.push_str(&format_row(record));
        }

        let first = (page.page - 1) * page.page_size + 1;
        let last = first + page.items.len() - 1;
        output.push_str(&format!(
            "\nShowing {}-{} of {} POIs (page {} of {})\n",
            first, last, page.total_count, page.page, page.total_pages
        ));

        Ok(output)
    }
}

fn format_row(record: &PoiRecord) -> String {
    let status = match record.category() {
        Some(category) => category.to_string(),
        None => "error".to_string(),
    };

    format!(
        "{:<12} {:<24} {:<17} {:>11} {:>12} {:>10}\n",
        truncate(&record.id, 12),
        truncate(record.display_name(), 24),
        status,
        format_coord(record.latitude),
        format_coord(record.longitude),
        record
            .distance_meters
            .map(|d| format!("{:.2} m", d))
            .unwrap_or_else(|| "N/A".to_string())
    )
}

fn format_coord(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.6}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('~');
        cut
    }
}
