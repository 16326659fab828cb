//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use optimizer_lib::aggregate::ReportOutput;
use optimizer_lib::report::CellValue;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
#[allow(dead_code)]
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Format a dollar amount
pub fn format_currency(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Render one report's table with its title and savings headline
pub fn print_report(output: &ReportOutput) {
    println!("\n{}", output.title.bold());

    let currency_columns = output.presentation.currency_columns;
    let mut builder = Builder::default();
    builder.push_record(output.table.columns().iter().map(String::as_str));
    for row in output.table.rows() {
        builder.push_record(
            row.iter()
                .enumerate()
                .map(|(idx, cell)| format_cell(cell, currency_columns.contains(&idx))),
        );
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");

    if output.display_savings {
        print_success(&format!(
            "Estimated monthly savings: {}",
            format_currency(output.savings).green()
        ));
    }
}

fn format_cell(cell: &CellValue, currency: bool) -> String {
    match cell {
        CellValue::Float(v) if currency => format_currency(*v),
        other => other.to_string(),
    }
}
