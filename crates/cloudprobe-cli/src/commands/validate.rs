//! Validate command - check manifests against the schemas of a CRD directory

use console::style;
use std::path::{Path, PathBuf};

use cloudprobe_schema::{SchemaRegistry, validate_targets};

use crate::display;
use crate::error::{CliError, Result};

pub fn run(crds: &Path, targets: &[PathBuf], json_output: bool, strict: bool) -> Result<()> {
    if !json_output {
        println!(
            "{} Loading CRDs from {}",
            style("→").blue(),
            crds.display()
        );
    }

    let registry = SchemaRegistry::build(crds)?;

    if !json_output {
        println!(
            "  {} {} validator(s) registered",
            style("✓").green(),
            registry.len()
        );
        println!();
        println!("{} Validating {} file(s)...", style("→").blue(), targets.len());
    }

    let run = validate_targets(targets, &registry);
    let summary = run.summary();

    if json_output {
        let output = serde_json::json!({
            "valid": run.is_clean(),
            "summary": summary,
            "outcomes": run.outcomes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        display::print_run(&run);
    }

    if strict && !run.is_clean() {
        return Err(CliError::validation_failed(summary));
    }

    Ok(())
}
