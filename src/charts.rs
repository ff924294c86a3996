use std::path::{Path, PathBuf};

use plotters::element::Pie;
use plotters::prelude::*;
use polars::prelude::DataFrame;
use tracing::{info, warn};

use crate::detect::ColumnMap;
use crate::error::SalesError;
use crate::metrics::{self, SalesMetrics};
use crate::schema::report;

const CHART_SIZE: (u32, u32) = (900, 600);
const PIE_SIZE: (u32, u32) = (700, 700);

const BAR_COLOR: RGBColor = RGBColor(77, 171, 247);
const LINE_COLOR: RGBColor = RGBColor(46, 139, 87);
const CITY_COLOR: RGBColor = RGBColor(250, 128, 114);

const PIE_COLORS: [RGBColor; 8] = [
    RGBColor(66, 133, 244),
    RGBColor(219, 68, 55),
    RGBColor(244, 180, 0),
    RGBColor(15, 157, 88),
    RGBColor(171, 71, 188),
    RGBColor(0, 172, 193),
    RGBColor(255, 112, 67),
    RGBColor(158, 157, 36),
];

/// Render every chart whose semantic column was detected, in the fixed
/// report order. A chart with an unmapped column is skipped entirely,
/// no placeholder file is produced.
pub fn render_all(
    df: &DataFrame,
    map: &ColumnMap,
    summary: &SalesMetrics,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, SalesError> {
    let mut written = Vec::new();

    if let Some(product) = &map.product {
        let mut groups = metrics::revenue_by_group(df, product)?;
        groups.sort_by(|a, b| b.1.total_cmp(&a.1));
        groups.truncate(10);
        let path = out_dir.join(report::TOP_PRODUCTS_CHART);
        render_bar_chart(&groups, "Top 10 Products by Revenue", &path)?;
        written.push(path);
    }

    if map.date.is_some() {
        if summary.monthly_revenue.is_empty() {
            warn!("no parsable dates, skipping monthly trend chart");
        } else {
            let path = out_dir.join(report::MONTHLY_SALES_CHART);
            render_monthly_trend(&summary.monthly_revenue, &path)?;
            written.push(path);
        }
    }

    if let Some(category) = &map.category {
        let groups = metrics::revenue_by_group(df, category)?;
        if groups.iter().map(|(_, v)| v).sum::<f64>() > 0.0 {
            let path = out_dir.join(report::CATEGORY_CHART);
            render_category_pie(&groups, &path)?;
            written.push(path);
        } else {
            warn!("zero category revenue, skipping distribution chart");
        }
    }

    if let Some(city) = &map.city {
        let mut groups = metrics::revenue_by_group(df, city)?;
        groups.sort_by(|a, b| a.1.total_cmp(&b.1));
        let path = out_dir.join(report::CITY_CHART);
        render_city_bars(&groups, &path)?;
        written.push(path);
    }

    info!(charts = written.len(), "charts rendered");
    Ok(written)
}

fn render_bar_chart(
    data: &[(String, f64)],
    title: &str,
    path: &Path,
) -> Result<(), SalesError> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let max = data.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max).max(1.0);
    let labels: Vec<String> = data.iter().map(|(name, _)| truncate(name, 14)).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(80)
        .y_label_area_size(80)
        .build_cartesian_2d(0_i32..data.len().max(1) as i32, 0.0_f64..max * 1.1)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Revenue")
        .x_labels(data.len().max(1))
        .x_label_formatter(&|idx| {
            labels
                .get(*idx as usize)
                .cloned()
                .unwrap_or_default()
        })
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(data.iter().enumerate().map(|(i, (_, value))| {
            Rectangle::new(
                [(i as i32, 0.0), (i as i32 + 1, *value)],
                BAR_COLOR.mix(0.8).filled(),
            )
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

fn render_monthly_trend(series: &[(String, f64)], path: &Path) -> Result<(), SalesError> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let max = series.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max).max(1.0);
    let last = series.len().saturating_sub(1).max(1) as i32;

    let mut chart = ChartBuilder::on(&root)
        .caption("Monthly Revenue Trend", ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(0_i32..last, 0.0_f64..max * 1.1)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .y_desc("Revenue")
        .x_labels(series.len())
        .x_label_formatter(&|idx| {
            series
                .get(*idx as usize)
                .map(|(label, _)| label.clone())
                .unwrap_or_default()
        })
        .draw()
        .map_err(chart_err)?;

    let points: Vec<(i32, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, (_, value))| (i as i32, *value))
        .collect();

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &LINE_COLOR))
        .map_err(chart_err)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 4, LINE_COLOR.filled())),
        )
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

fn render_category_pie(groups: &[(String, f64)], path: &Path) -> Result<(), SalesError> {
    let root = BitMapBackend::new(path, PIE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let root = root
        .titled("Revenue by Category", ("sans-serif", 28))
        .map_err(chart_err)?;

    let sizes: Vec<f64> = groups.iter().map(|(_, v)| v.max(0.0)).collect();
    let labels: Vec<String> = groups.iter().map(|(name, _)| truncate(name, 18)).collect();
    let colors: Vec<RGBColor> = (0..groups.len())
        .map(|i| PIE_COLORS[i % PIE_COLORS.len()])
        .collect();

    let center = (PIE_SIZE.0 as i32 / 2, PIE_SIZE.1 as i32 / 2);
    let radius = PIE_SIZE.0 as f64 / 3.0;
    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style(("sans-serif", 18).into_font());
    pie.percentages(("sans-serif", 15).into_font());

    root.draw(&pie).map_err(chart_err)?;
    root.present().map_err(chart_err)?;
    Ok(())
}

fn render_city_bars(data: &[(String, f64)], path: &Path) -> Result<(), SalesError> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let max = data.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max).max(1.0);
    let labels: Vec<String> = data.iter().map(|(name, _)| truncate(name, 14)).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption("Revenue by City", ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(60)
        .y_label_area_size(110)
        .build_cartesian_2d(0.0_f64..max * 1.1, 0_i32..data.len().max(1) as i32)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Revenue")
        .y_labels(data.len().max(1))
        .y_label_formatter(&|idx| {
            labels
                .get(*idx as usize)
                .cloned()
                .unwrap_or_default()
        })
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(data.iter().enumerate().map(|(i, (_, value))| {
            Rectangle::new(
                [(0.0, i as i32), (*value, i as i32 + 1)],
                CITY_COLOR.mix(0.8).filled(),
            )
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

fn chart_err<E: std::fmt::Display>(err: E) -> SalesError {
    SalesError::Chart(err.to_string())
}

fn truncate(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let head: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
