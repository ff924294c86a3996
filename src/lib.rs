//! salescope: sales file analyzer and report generator.
//!
//! Loads a CSV or Excel sales file, detects semantic columns by
//! keyword heuristics, cleans the data, computes derived metrics and
//! writes a text summary plus charts into a timestamped report folder.

use std::path::Path;

use tracing::info;

pub mod charts;
pub mod detect;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod report;
pub mod schema;

pub use detect::ColumnMap;
pub use error::SalesError;
pub use metrics::SalesMetrics;
pub use report::ReportOutput;

/// Run the whole pipeline for one input file.
///
/// `input` is resolved against `base` (directly, then under
/// `sample_data/`). On success the report folder, written file paths
/// and computed metrics are returned; nothing is written on failure.
pub fn run_report(base: &Path, input: &Path) -> Result<ReportOutput, SalesError> {
    let path = loader::resolve_input_path(base, input)?;
    let raw = loader::load_table(&path)?;

    let headers: Vec<String> = raw
        .get_column_names_str()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let map = ColumnMap::detect(&headers);
    info!(columns = %map.describe(), "detected semantic columns");

    let cleaned = loader::clean(raw, &map)?;
    let metrics = SalesMetrics::compute(&cleaned, &map)?;

    let report_dir = report::create_report_dir(base)?;
    let cleaned_data = report::write_cleaned_data(&cleaned, &report_dir)?;
    let summary = report::write_summary(&metrics, &report_dir)?;
    let chart_paths = charts::render_all(&cleaned, &map, &metrics, &report_dir)?;

    Ok(ReportOutput {
        report_dir,
        cleaned_data,
        summary,
        charts: chart_paths,
        metrics,
    })
}
