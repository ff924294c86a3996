use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::Local;
use polars::prelude::*;
use tracing::info;

use crate::error::SalesError;
use crate::metrics::SalesMetrics;
use crate::schema::report;

/// Everything one pipeline run produced: where the report landed, the
/// files written, and the computed metrics.
#[derive(Debug)]
pub struct ReportOutput {
    pub report_dir: PathBuf,
    pub cleaned_data: PathBuf,
    pub summary: PathBuf,
    pub charts: Vec<PathBuf>,
    pub metrics: SalesMetrics,
}

/// Create `reports/report_<timestamp>/` under `base`.
///
/// Only called after the input loaded successfully, so a failed run
/// never leaves an empty report folder behind.
pub fn create_report_dir(base: &Path) -> Result<PathBuf, SalesError> {
    let stamp = Local::now().format(report::TIMESTAMP_FORMAT);
    let dir = base
        .join(report::ROOT_DIR)
        .join(format!("{}{stamp}", report::DIR_PREFIX));
    fs::create_dir_all(&dir)?;
    info!(dir = %dir.display(), "created report folder");
    Ok(dir)
}

/// Write the full cleaned dataset, Total column included.
pub fn write_cleaned_data(df: &DataFrame, dir: &Path) -> Result<PathBuf, SalesError> {
    let path = dir.join(report::CLEANED_DATA);
    let mut file = File::create(&path)?;
    let mut out = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut out)?;
    Ok(path)
}

pub fn write_summary(metrics: &SalesMetrics, dir: &Path) -> Result<PathBuf, SalesError> {
    let path = dir.join(report::SUMMARY);
    fs::write(&path, render_summary(metrics))?;
    info!(path = %path.display(), "summary generated");
    Ok(path)
}

/// Fixed-format summary block. Dimension lines whose metric is absent
/// are omitted, the surrounding layout stays the same.
pub fn render_summary(metrics: &SalesMetrics) -> String {
    let mut out = String::new();
    out.push_str("========================================\n");
    out.push_str("           BUSINESS REPORT\n");
    out.push_str("========================================\n");
    out.push_str(&format!(
        "Report Date   : {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!(
        "Total Revenue : {}\n",
        format_amount(metrics.revenue)
    ));
    out.push_str(&format!("Total Orders  : {}\n", metrics.orders));
    out.push_str(&format!(
        "Avg Order Val : {}\n",
        format_amount(metrics.avg_order_value.unwrap_or(0.0))
    ));
    out.push_str("----------------------------------------\n");

    if let Some(product) = &metrics.best_product {
        out.push_str(&format!("Best Selling Product  : {product}\n"));
    }
    if let Some(category) = &metrics.top_category {
        out.push_str(&format!("Top Category          : {category}\n"));
    }
    if let Some(customer) = &metrics.top_customer {
        out.push_str(&format!("Top Customer          : {customer}\n"));
    }
    if let Some(city) = &metrics.top_city {
        out.push_str(&format!("Top City              : {city}\n"));
    }
    out.push_str("----------------------------------------\n");

    if let Some(growth) = metrics.mom_growth {
        out.push_str(&format!("Sales Growth (MoM)    : {growth:+.1}%\n"));
    }
    out.push_str("========================================\n");
    out
}

/// Thousands-separated amount with two decimals, e.g. `12,345.60`.
fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_metrics() -> SalesMetrics {
        SalesMetrics {
            revenue: 1234567.891,
            orders: 42,
            avg_order_value: Some(29394.47),
            ..SalesMetrics::default()
        }
    }

    #[test]
    fn amounts_are_grouped_with_two_decimals() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.5), "999.50");
        assert_eq!(format_amount(1000.0), "1,000.00");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(-1234.5), "-1,234.50");
    }

    #[test]
    fn summary_always_has_core_lines() {
        let text = render_summary(&base_metrics());
        assert!(text.contains("BUSINESS REPORT"));
        assert!(text.contains("Total Revenue : 1,234,567.89"));
        assert!(text.contains("Total Orders  : 42"));
        assert!(text.contains("Avg Order Val : 29,394.47"));
    }

    #[test]
    fn dimension_lines_appear_only_when_present() {
        let mut metrics = base_metrics();
        let text = render_summary(&metrics);
        assert!(!text.contains("Best Selling Product"));
        assert!(!text.contains("Top Category"));
        assert!(!text.contains("Sales Growth"));

        metrics.best_product = Some("Widget".to_string());
        metrics.top_city = Some("Oslo".to_string());
        metrics.mom_growth = Some(-12.34);
        let text = render_summary(&metrics);
        assert!(text.contains("Best Selling Product  : Widget"));
        assert!(text.contains("Top City              : Oslo"));
        assert!(text.contains("Sales Growth (MoM)    : -12.3%"));
        assert!(!text.contains("Top Customer"));
    }

    #[test]
    fn positive_growth_is_signed() {
        let mut metrics = base_metrics();
        metrics.mom_growth = Some(397.5);
        assert!(render_summary(&metrics).contains("Sales Growth (MoM)    : +397.5%"));
    }

    #[test]
    fn missing_average_prints_as_zero() {
        let metrics = SalesMetrics::default();
        assert!(render_summary(&metrics).contains("Avg Order Val : 0.00"));
    }

    #[test]
    fn report_dir_is_created_under_reports_root() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = create_report_dir(tmp.path()).unwrap();
        assert!(dir.is_dir());
        assert!(dir.starts_with(tmp.path().join("reports")));
        let name = dir.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("report_"));
    }
}
