use std::path::Path;

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use tracing_subscriber::EnvFilter;

use salescope::{run_report, SalesError};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("salescope=info")),
        )
        .init();

    let input: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Excel/CSV file path (e.g. sales_data.csv)")
        .interact_text()?;

    match run_report(Path::new("."), Path::new(input.trim())) {
        Ok(output) => {
            println!(
                "\n{} {}",
                style("Report ready →").green().bold(),
                output.report_dir.display()
            );
            Ok(())
        }
        Err(SalesError::FileNotFound { path, suggestions }) => {
            eprintln!(
                "{} '{}' not found.",
                style("Error:").red().bold(),
                path.display()
            );
            if suggestions.is_empty() {
                eprintln!("No Excel or CSV files found in the project.");
            } else {
                eprintln!("\nSuggested files you can use:");
                for suggestion in &suggestions {
                    eprintln!(" - {}", suggestion.display());
                }
            }
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("{} {err}", style("Error:").red().bold());
            std::process::exit(1);
        }
    }
}
