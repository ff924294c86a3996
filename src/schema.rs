/// Name constants for the salescope pipeline.
/// Single source of truth for derived columns, detection keywords and
/// report artifact names.

// ── Derived columns ─────────────────────────────────────────────────────────
pub mod derived {
    pub const TOTAL: &str = "Total";
}

// ── Detection keywords ──────────────────────────────────────────────────────
//
// One list per semantic role, ordered most specific first: the detector
// takes the first keyword/header hit per role.
pub mod keywords {
    pub const DATE: [&str; 4] = ["date", "day", "time", "order_date"];
    pub const PRICE: [&str; 4] = ["price", "amount", "cost", "rate"];
    pub const QUANTITY: [&str; 4] = ["qty", "quantity", "units", "count"];
    pub const PRODUCT: [&str; 3] = ["product", "item", "name"];
    pub const CUSTOMER: [&str; 4] = ["customer", "client", "buyer", "user"];
    pub const CITY: [&str; 3] = ["city", "location", "place"];
    pub const CATEGORY: [&str; 4] = ["category", "group", "type", "dept"];
}

// ── Input resolution ────────────────────────────────────────────────────────
pub mod input {
    /// Fallback subfolder tried when the given path does not exist.
    pub const SAMPLE_DATA_DIR: &str = "sample_data";

    /// Recognized input file extensions (lowercase).
    pub const EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

    /// Directory-name fragments excluded from the suggestion scan.
    pub const SCAN_SKIP: [&str; 3] = ["reports", ".git", "target"];
}

// ── Report artifacts ────────────────────────────────────────────────────────
pub mod report {
    /// Root folder holding all generated reports.
    pub const ROOT_DIR: &str = "reports";

    /// Report folder name prefix; the run timestamp is appended.
    pub const DIR_PREFIX: &str = "report_";
    pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

    pub const CLEANED_DATA: &str = "cleaned_data.csv";
    pub const SUMMARY: &str = "summary.txt";

    pub const TOP_PRODUCTS_CHART: &str = "top_products.png";
    pub const MONTHLY_SALES_CHART: &str = "monthly_sales.png";
    pub const CATEGORY_CHART: &str = "category_distribution.png";
    pub const CITY_CHART: &str = "city_performance.png";
}
