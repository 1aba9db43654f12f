//! Analyze command handler
//!
//! Loads analysis results from a file, stdin or the analysis backend and
//! prints the stats, focus area and one table page.

use crate::analysis::Analysis;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::url::UrlFormatter;
use crate::format::{available_formats, get_formatter};
use crate::poi::all_categories;
use crate::query::sort::SortDirection;
use crate::query::QueryParams;
use clap::Args;
use std::io::Read;
use tracing::debug;

/// Analyze command arguments
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Results file, or "-" for stdin
    #[arg(conflicts_with_all = ["url", "remote"])]
    pub input: Option<String>,

    /// Fetch results from this URL
    #[arg(long, conflicts_with = "remote")]
    pub url: Option<String>,

    /// Fetch results from the configured source.url
    #[arg(long)]
    pub remote: bool,

    /// Status filter: all, valid, invalid, errors, or a category name
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Case-insensitive substring match on id or name
    #[arg(long, short = 'q')]
    pub search: Option<String>,

    /// Sort column: id, name, label, category, latitude, longitude, distance
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Page number (clamped to the last page)
    #[arg(long)]
    pub page: Option<usize>,

    /// Records per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Map provider for the url format
    #[arg(long)]
    pub provider: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,

    /// List outcome categories
    #[arg(short = 'C', long = "list-categories")]
    pub list_categories: bool,
}

/// Run the analyze command
pub async fn run(args: AnalyzeArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    if args.list_categories {
        list_categories();
        return Ok(());
    }

    let config = Config::load()?;
    let params = build_params(&args, &config)?;

    let payload = read_payload(&args, &config).await?;
    let analysis = Analysis::from_json(&payload)?;
    let report = analysis.report(&params, &config.map);

    let format = args.format.as_deref().unwrap_or(&config.defaults.format);
    let output = if format.eq_ignore_ascii_case("url") {
        UrlFormatter.format_with_provider(&report, &config, args.provider.as_deref())?
    } else {
        let formatter = get_formatter(format)
            .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;
        formatter.format(&report, &config)?
    };

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Resolve query flags over the configured defaults
fn build_params(args: &AnalyzeArgs, config: &Config) -> Result<QueryParams> {
    let mut params = QueryParams::from_config(config)?;

    if let Some(status) = &args.status {
        params.status = status.parse().map_err(Error::InvalidQuery)?;
    }
    if let Some(search) = &args.search {
        params.search = search.clone();
    }
    if let Some(sort_by) = &args.sort_by {
        params.sort_by = sort_by.parse().map_err(Error::InvalidQuery)?;
    }
    if args.desc {
        params.direction = SortDirection::Desc;
    }
    if let Some(page_size) = args.page_size {
        if page_size == 0 {
            return Err(Error::InvalidQuery("page size must be at least 1".to_string()));
        }
        params.page_size = page_size;
    }
    if let Some(page) = args.page {
        params.set_page(page);
    }

    Ok(params)
}

/// Read the raw results payload from the selected source
async fn read_payload(args: &AnalyzeArgs, config: &Config) -> Result<String> {
    let url = if args.remote {
        if config.source.url.is_empty() {
            return Err(Error::Config(
                "source.url is not set; use `poi-median config source.url <URL>`".to_string(),
            ));
        }
        Some(config.source.url.as_str())
    } else {
        args.url.as_deref()
    };

    if let Some(url) = url {
        debug!("Fetching results from {}", url);
        let response = reqwest::get(url).await?.error_for_status()?;
        return Ok(response.text().await?);
    }

    match args.input.as_deref() {
        Some("-") => {
            let mut payload = String::new();
            std::io::stdin().read_to_string(&mut payload)?;
            Ok(payload)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Err(Error::Config(
            "No input specified. Pass a results file, '-', --url or --remote".to_string(),
        )),
    }
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:8} - {}", format.name, format.description);
    }
}

/// Print outcome categories
fn list_categories() {
    println!("Outcome categories:");
    for category in all_categories() {
        let marker = if category.is_valid() { " (valid)" } else { "" };
        println!("  {:17} - {}{}", category.to_string(), category.description(), marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::sort::SortField;
    use crate::query::StatusFilter;
    use clap::Parser;
    use std::io::Write;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: AnalyzeArgs,
    }

    fn parse(argv: &[&str]) -> AnalyzeArgs {
        let mut full = vec!["poi-median"];
        full.extend_from_slice(argv);
        TestCli::parse_from(full).args
    }

    #[test]
    fn test_build_params_defaults() {
        let config = Config::default();
        let params = build_params(&parse(&["results.json"]), &config).unwrap();

        assert_eq!(params.status, StatusFilter::All);
        assert_eq!(params.sort_by, SortField::Id);
        assert_eq!(params.direction, SortDirection::Asc);
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 10);
    }

    #[test]
    fn test_build_params_flags() {
        let config = Config::default();
        let args = parse(&[
            "results.json",
            "--status",
            "wrong_location",
            "--search",
            "oxxo",
            "--sort-by",
            "distance",
            "--desc",
            "--page",
            "3",
            "--page-size",
            "25",
        ]);
        let params = build_params(&args, &config).unwrap();

        assert_eq!(
            params.status,
            StatusFilter::Category(crate::poi::Category::WrongLocation)
        );
        assert_eq!(params.search, "oxxo");
        assert_eq!(params.sort_by, SortField::Distance);
        assert_eq!(params.direction, SortDirection::Desc);
        assert_eq!(params.page, 3);
        assert_eq!(params.page_size, 25);
    }

    #[test]
    fn test_build_params_rejects_bad_values() {
        let config = Config::default();
        assert!(build_params(&parse(&["-", "--status", "sideways"]), &config).is_err());
        assert!(build_params(&parse(&["-", "--sort-by", "height"]), &config).is_err());
        assert!(build_params(&parse(&["-", "--page-size", "0"]), &config).is_err());
    }

    #[test]
    fn test_input_conflicts_with_url() {
        let result = TestCli::try_parse_from(["poi-median", "a.json", "--url", "http://x"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_read_payload_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"p1": {{"label": 1}}}}"#).unwrap();

        let args = parse(&[file.path().to_str().unwrap()]);
        let payload = read_payload(&args, &Config::default()).await.unwrap();
        let analysis = Analysis::from_json(&payload).unwrap();

        assert_eq!(analysis.dataset.len(), 1);
    }

    #[tokio::test]
    async fn test_read_payload_requires_source() {
        let config = Config::default();
        assert!(read_payload(&parse(&[]), &config).await.is_err());
        // source.url is empty by default
        assert!(read_payload(&parse(&["--remote"]), &config).await.is_err());
    }
}
