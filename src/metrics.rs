use polars::prelude::*;

use crate::detect::ColumnMap;
use crate::error::SalesError;
use crate::schema::derived;

/// Aggregate metrics computed from the cleaned dataset.
///
/// Everything beyond revenue/orders is gated on the presence of its
/// semantic column and stays `None` (or empty) when that column was not
/// detected.
#[derive(Debug, Clone, Default)]
pub struct SalesMetrics {
    pub revenue: f64,
    pub orders: usize,
    /// Revenue / orders; `None` when the dataset has no rows.
    pub avg_order_value: Option<f64>,
    pub best_product: Option<String>,
    pub top_category: Option<String>,
    pub top_customer: Option<String>,
    pub top_city: Option<String>,
    /// Chronologically sorted `(YYYY-MM, revenue)` pairs.
    pub monthly_revenue: Vec<(String, f64)>,
    /// Percentage change between the two most recent months.
    pub mom_growth: Option<f64>,
}

impl SalesMetrics {
    pub fn compute(df: &DataFrame, map: &ColumnMap) -> Result<Self, SalesError> {
        let revenue = df.column(derived::TOTAL)?.f64()?.sum().unwrap_or(0.0);
        let orders = df.height();
        let avg_order_value = if orders > 0 {
            Some(revenue / orders as f64)
        } else {
            None
        };

        let best_product = leader_for(df, map.product.as_deref())?;
        let top_category = leader_for(df, map.category.as_deref())?;
        let top_customer = leader_for(df, map.customer.as_deref())?;
        let top_city = leader_for(df, map.city.as_deref())?;

        let monthly_revenue = match &map.date {
            Some(date) => monthly_revenue(df, date)?,
            None => Vec::new(),
        };
        let mom_growth = mom_growth(&monthly_revenue);

        Ok(Self {
            revenue,
            orders,
            avg_order_value,
            best_product,
            top_category,
            top_customer,
            top_city,
            monthly_revenue,
            mom_growth,
        })
    }
}

fn leader_for(df: &DataFrame, column: Option<&str>) -> Result<Option<String>, SalesError> {
    match column {
        Some(name) => Ok(leader(&revenue_by_group(df, name)?)),
        None => Ok(None),
    }
}

/// Per-group Total sums in first-encountered group order.
pub fn revenue_by_group(df: &DataFrame, group_col: &str) -> Result<Vec<(String, f64)>, SalesError> {
    let grouped = df
        .clone()
        .lazy()
        .group_by_stable([col(group_col)])
        .agg([col(derived::TOTAL).sum()])
        .collect()?;

    let keys = grouped.column(group_col)?.str()?;
    let sums = grouped.column(derived::TOTAL)?.f64()?;

    let mut result = Vec::with_capacity(grouped.height());
    for i in 0..grouped.height() {
        let Some(key) = keys.get(i) else { continue };
        result.push((key.to_string(), sums.get(i).unwrap_or(0.0)));
    }
    Ok(result)
}

/// Group with the strictly greatest sum. Ties resolve to the
/// first-encountered group, deterministic for a given input order.
fn leader(groups: &[(String, f64)]) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for (key, sum) in groups {
        match best {
            Some((_, current)) if *sum <= current => {}
            _ => best = Some((key, *sum)),
        }
    }
    best.map(|(key, _)| key.to_string())
}

/// Total revenue per calendar month, chronologically sorted.
/// Rows whose date failed to parse are excluded.
pub fn monthly_revenue(df: &DataFrame, date_col: &str) -> Result<Vec<(String, f64)>, SalesError> {
    let monthly = df
        .clone()
        .lazy()
        .filter(col(date_col).is_not_null())
        .group_by_stable([
            col(date_col).dt().year().cast(DataType::Int32).alias("year"),
            col(date_col)
                .dt()
                .month()
                .cast(DataType::Int32)
                .alias("month"),
        ])
        .agg([col(derived::TOTAL).sum()])
        .sort(["year", "month"], SortMultipleOptions::default())
        .collect()?;

    let years = monthly.column("year")?.i32()?;
    let months = monthly.column("month")?.i32()?;
    let sums = monthly.column(derived::TOTAL)?.f64()?;

    let mut series = Vec::with_capacity(monthly.height());
    for i in 0..monthly.height() {
        let (Some(year), Some(month)) = (years.get(i), months.get(i)) else {
            continue;
        };
        series.push((format!("{year:04}-{month:02}"), sums.get(i).unwrap_or(0.0)));
    }
    Ok(series)
}

/// Growth between the two most recent months, in percent.
/// A previous month of exactly zero yields 0.0, never infinity.
fn mom_growth(monthly: &[(String, f64)]) -> Option<f64> {
    if monthly.len() < 2 {
        return None;
    }
    let previous = monthly[monthly.len() - 2].1;
    let current = monthly[monthly.len() - 1].1;
    if previous == 0.0 {
        return Some(0.0);
    }
    Some((current - previous) / previous * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader;

    fn sales_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new(
                "Order Date".into(),
                ["2024-01-05", "2024-01-20", "2024-02-03"],
            ),
            Column::new("Item".into(), ["Widget", "Gadget", "Widget"]),
            Column::new("Qty".into(), ["2", "1", "1"]),
            Column::new("Unit Price".into(), ["10.0", "50.0", "40.0"]),
            Column::new("City".into(), ["Oslo", "Bergen", "Oslo"]),
        ])
        .unwrap()
    }

    fn sales_map() -> ColumnMap {
        ColumnMap::detect(&["Order Date", "Item", "Qty", "Unit Price", "City"])
    }

    fn cleaned_sales() -> DataFrame {
        loader::clean(sales_frame(), &sales_map()).unwrap()
    }

    #[test]
    fn computes_revenue_orders_and_average() {
        let metrics = SalesMetrics::compute(&cleaned_sales(), &sales_map()).unwrap();
        assert_eq!(metrics.orders, 3);
        assert!((metrics.revenue - 110.0).abs() < 1e-9);
        assert!((metrics.avg_order_value.unwrap() - 110.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn picks_group_leaders_by_summed_total() {
        let metrics = SalesMetrics::compute(&cleaned_sales(), &sales_map()).unwrap();
        // Widget 20 + 40 = 60 beats Gadget 50; Oslo 60 beats Bergen 50.
        assert_eq!(metrics.best_product.as_deref(), Some("Widget"));
        assert_eq!(metrics.top_city.as_deref(), Some("Oslo"));
        assert_eq!(metrics.top_category, None);
        assert_eq!(metrics.top_customer, None);
    }

    #[test]
    fn leader_ties_go_to_first_encountered_group() {
        let groups = vec![
            ("first".to_string(), 10.0),
            ("second".to_string(), 10.0),
            ("third".to_string(), 5.0),
        ];
        assert_eq!(leader(&groups).as_deref(), Some("first"));
    }

    #[test]
    fn leader_of_no_groups_is_none() {
        assert_eq!(leader(&[]), None);
    }

    #[test]
    fn monthly_series_is_chronological_and_labelled() {
        let map = sales_map();
        let monthly =
            monthly_revenue(&cleaned_sales(), map.date.as_deref().unwrap()).unwrap();
        assert_eq!(
            monthly,
            vec![("2024-01".to_string(), 70.0), ("2024-02".to_string(), 40.0)]
        );
    }

    #[test]
    fn growth_compares_two_most_recent_months() {
        let metrics = SalesMetrics::compute(&cleaned_sales(), &sales_map()).unwrap();
        // (40 - 70) / 70 * 100
        assert!((metrics.mom_growth.unwrap() - (-30.0 / 70.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn growth_is_zero_when_previous_month_is_zero() {
        let monthly = vec![("2024-01".to_string(), 0.0), ("2024-02".to_string(), 50.0)];
        assert_eq!(mom_growth(&monthly), Some(0.0));
    }

    #[test]
    fn growth_requires_two_months() {
        assert_eq!(mom_growth(&[("2024-01".to_string(), 10.0)]), None);
        assert_eq!(mom_growth(&[]), None);
    }

    #[test]
    fn empty_dataset_yields_no_average_and_no_leaders() {
        let df = DataFrame::new(vec![
            Column::new("Item".into(), Vec::<String>::new()),
            Column::new("Qty".into(), Vec::<String>::new()),
            Column::new("Unit Price".into(), Vec::<String>::new()),
        ])
        .unwrap();
        let map = ColumnMap::detect(&["Item", "Qty", "Unit Price"]);
        let cleaned = loader::clean(df, &map).unwrap();

        let metrics = SalesMetrics::compute(&cleaned, &map).unwrap();
        assert_eq!(metrics.orders, 0);
        assert_eq!(metrics.revenue, 0.0);
        assert_eq!(metrics.avg_order_value, None);
        assert_eq!(metrics.best_product, None);
    }
}
