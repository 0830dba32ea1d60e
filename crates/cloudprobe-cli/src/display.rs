//! Display formatting for CLI output

use cloudprobe_schema::{RunSummary, TargetOutcome, ValidationRun};
use console::style;

/// Print one line per outcome (one per violation for invalid documents)
pub fn print_run(run: &ValidationRun) {
    for outcome in &run.outcomes {
        let icon = match outcome {
            TargetOutcome::Valid { .. } => style("✓").green(),
            TargetOutcome::NoValidator { .. } => style("⚠").yellow(),
            TargetOutcome::Invalid { .. } | TargetOutcome::ParseFailed { .. } => style("✗").red(),
        };
        for line in outcome.render_lines() {
            println!("  {} {}", icon, line);
        }
    }
    println!();
    print_summary(&run.summary());
}

/// Print summary line
pub fn print_summary(summary: &RunSummary) {
    let problems = summary.invalid + summary.no_validator + summary.parse_failed;
    if problems == 0 {
        println!(
            "{} Validation passed: {} document(s) validated",
            style("✓").green().bold(),
            summary.valid
        );
        return;
    }

    println!(
        "{} Validation failed: {} valid, {} invalid, {} without validator, {} unparsable",
        style("✗").red().bold(),
        summary.valid,
        summary.invalid,
        summary.no_validator,
        summary.parse_failed
    );
}
