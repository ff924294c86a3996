use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, DataType as _, Reader};
use polars::prelude::*;
use tracing::info;
use walkdir::WalkDir;

use crate::detect::ColumnMap;
use crate::error::SalesError;
use crate::schema::{derived, input};

// ── Path resolution ─────────────────────────────────────────────────────────

/// Resolve the user-supplied path against `base`.
///
/// Tries the path as given, then under the `sample_data/` subfolder.
/// When both miss, the base directory is scanned recursively for
/// CSV/spreadsheet files and resolution fails with those as
/// suggestions. No report folder exists yet at this point.
pub fn resolve_input_path(base: &Path, given: &Path) -> Result<PathBuf, SalesError> {
    let direct = if given.is_absolute() {
        given.to_path_buf()
    } else {
        base.join(given)
    };
    if direct.is_file() {
        return Ok(direct);
    }

    let fallback = base.join(input::SAMPLE_DATA_DIR).join(given);
    if fallback.is_file() {
        info!(path = %fallback.display(), "auto-detected input under sample_data");
        return Ok(fallback);
    }

    Err(SalesError::FileNotFound {
        path: given.to_path_buf(),
        suggestions: scan_candidates(base),
    })
}

/// Recursively collect CSV/spreadsheet files under `base`, pruning
/// report, version-control and build directories.
fn scan_candidates(base: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let walker = WalkDir::new(base)
        .into_iter()
        .filter_entry(|e| !is_pruned_dir(e));
    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if input::EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            let rel = entry
                .path()
                .strip_prefix(base)
                .unwrap_or(entry.path())
                .to_path_buf();
            found.push(rel);
        }
    }
    found
}

fn is_pruned_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| input::SCAN_SKIP.contains(&name))
            .unwrap_or(false)
}

// ── Loading ─────────────────────────────────────────────────────────────────

/// Load a tabular file into a DataFrame, dispatched by extension.
/// All columns come back as String; typed casts happen in [`clean`].
pub fn load_table(path: &Path) -> Result<DataFrame, SalesError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let df = match ext.as_str() {
        "xlsx" | "xls" => read_spreadsheet(path),
        _ => read_csv_as_strings(path),
    }?;

    info!(rows = df.height(), columns = df.width(), "loaded input file");
    Ok(df)
}

/// Read a CSV file with all columns as String dtype.
/// Trims whitespace from column names.
fn read_csv_as_strings(path: &Path) -> Result<DataFrame, SalesError> {
    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| load_error(path, e))?;
    let df = reader.finish().map_err(|e| load_error(path, e))?;
    trim_column_names(df).map_err(|e| load_error(path, e))
}

/// Read the first worksheet of an Excel workbook.
///
/// Cells are rendered to strings and re-encoded as CSV in memory so the
/// spreadsheet path shares the CSV reader above.
fn read_spreadsheet(path: &Path) -> Result<DataFrame, SalesError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| load_error(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SalesError::Load {
            path: path.to_path_buf(),
            reason: "no worksheet found".to_string(),
        })?
        .map_err(|e| load_error(path, e))?;

    let csv_text = range_to_csv(&range);
    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(csv_text.into_bytes()));
    let df = reader.finish().map_err(|e| load_error(path, e))?;
    trim_column_names(df).map_err(|e| load_error(path, e))
}

fn range_to_csv(range: &calamine::Range<Data>) -> String {
    let mut lines = Vec::with_capacity(range.height());
    for row in range.rows() {
        let line = row
            .iter()
            .map(|cell| {
                let text = cell
                    .as_string()
                    .unwrap_or_else(|| format!("{cell}"));
                if text.contains(',') || text.contains('"') || text.contains('\n') {
                    format!("\"{}\"", text.replace('"', "\"\""))
                } else {
                    text
                }
            })
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }
    lines.join("\n")
}

fn trim_column_names(mut df: DataFrame) -> PolarsResult<DataFrame> {
    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;
    Ok(df)
}

fn load_error(path: &Path, err: impl std::fmt::Display) -> SalesError {
    SalesError::Load {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

// ── Cleaning ────────────────────────────────────────────────────────────────

/// Clean the dataset and derive the Total column, in pipeline order:
///
/// 1. drop exact duplicate rows (first occurrence kept),
/// 2. fill every missing cell with the empty string,
/// 3. cast mapped price/quantity columns to Float64 (junk becomes 0.0),
/// 4. coerce the mapped date column to Datetime (unparsable -> null),
/// 5. append `Total` = price x quantity, or constant 0.0 when either
///    side is unmapped, so downstream aggregation always finds it.
pub fn clean(df: DataFrame, map: &ColumnMap) -> Result<DataFrame, SalesError> {
    let before = df.height();
    let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    if deduped.height() < before {
        info!(dropped = before - deduped.height(), "removed duplicate rows");
    }

    let mut lazy = deduped.lazy().with_columns([all().as_expr().fill_null(lit(""))]);

    if let Some(price) = &map.price {
        lazy = lazy.with_columns([numeric_cast(price)]);
    }
    if let Some(quantity) = &map.quantity {
        lazy = lazy.with_columns([numeric_cast(quantity)]);
    }
    if let Some(date) = &map.date {
        lazy = lazy.with_columns([datetime_cast(date)]);
    }

    let total = match (&map.price, &map.quantity) {
        (Some(price), Some(quantity)) => (col(price.as_str()) * col(quantity.as_str()))
            .alias(derived::TOTAL),
        _ => lit(0.0).alias(derived::TOTAL),
    };

    Ok(lazy.with_columns([total]).collect()?)
}

/// Strip whitespace and cast to Float64; unparsable values become 0.0.
fn numeric_cast(name: &str) -> Expr {
    col(name)
        .str()
        .strip_chars(lit(" \t\r\n"))
        .cast(DataType::Float64)
        .fill_null(lit(0.0))
}

/// Parse a string column to Datetime; unparsable values become null.
fn datetime_cast(name: &str) -> Expr {
    col(name)
        .str()
        .strip_chars(lit(" \t\r\n"))
        .str()
        .to_datetime(
            Some(TimeUnit::Microseconds),
            None,
            StrptimeOptions {
                strict: false,
                ..Default::default()
            },
            lit("raise"),
        )
}
