//! Shared output formatting for scan reports.

use anyhow::Result;
use layer_guard_core::{Severity, ViolationReport};

use crate::OutputFormat;

/// Print a scan report in the specified format.
pub fn print(report: &ViolationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

fn print_text(report: &ViolationReport) {
    for violation in &report.violations {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} at {}:{}:{}",
            violation.kind.rule_name(),
            violation.file.display(),
            violation.line,
            violation.column,
        );
        println!("  {}: {}", severity_indicator, violation.message);
        if !violation.import_statement.is_empty() {
            println!("  > {}", violation.import_statement);
        }
        for suggestion in &violation.suggestions {
            println!("  = help: {suggestion}");
        }
        println!();
    }

    let counts = &report.by_severity;
    let summary_color = if counts.errors > 0 {
        "\x1b[31m"
    } else if counts.warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s) ({} ms)\x1b[0m",
        summary_color,
        counts.errors,
        counts.warnings,
        counts.infos,
        report.files_analyzed,
        report.elapsed_ms,
    );
}

fn print_json(report: &ViolationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &ViolationReport) {
    for violation in &report.violations {
        println!("{violation}");
    }
}
