//! Healing command: show remediation options and optionally apply fixes.

use anyhow::{Context, Result};
use std::path::Path;

use layer_guard_engine::heal::heal;
use layer_guard_engine::watch::Watcher;

/// Runs the heal command.
pub fn run(path: &Path, apply: bool, config_path: Option<&Path>) -> Result<()> {
    let config = crate::config_resolver::load(path, config_path)?;

    let mut watcher = Watcher::new(path, config.clone()).context("configuration rejected")?;
    let report = watcher.scan_all();

    if report.violations.is_empty() {
        println!("\x1b[32mNo violations found, nothing to heal.\x1b[0m");
        return Ok(());
    }

    let mut applied = 0usize;
    let mut failed = 0usize;

    for violation in &report.violations {
        let suggestion = heal(violation, &config, watcher.preset());

        println!("{}", violation.format());
        println!("  context: {}", suggestion.context);
        print_option(&suggestion.primary, true);
        for option in &suggestion.alternatives {
            print_option(option, false);
        }

        if apply {
            if let Some(fix) = &suggestion.primary.auto_fix {
                let outcome = fix.apply(path);
                if outcome.success {
                    applied += 1;
                    println!("  \x1b[32mapplied:\x1b[0m {}", outcome.message);
                } else {
                    failed += 1;
                    println!(
                        "  \x1b[31mfix failed:\x1b[0m {}",
                        outcome.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
        }
        println!();
    }

    if apply {
        println!("Applied {applied} fix(es), {failed} failed.");
        if applied > 0 {
            println!("Re-run `layer-guard check` to verify the result.");
        }
    } else {
        println!("Run with --apply to execute the primary fixes.");
    }

    Ok(())
}

fn print_option(option: &layer_guard_engine::heal::HealingOption, primary: bool) {
    let marker = if primary { "*" } else { "-" };
    let auto = if option.auto_fix.is_some() {
        " [auto]"
    } else {
        ""
    };
    println!("  {marker} {}{auto}: {}", option.label, option.explanation);
    if let (Some(before), Some(after)) = (&option.before, &option.after) {
        println!("      before: {before}");
        println!("      after:  {after}");
    }
}
