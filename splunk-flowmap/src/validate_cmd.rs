use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use splunk_flowmap::report::colorize_findings;
use splunk_flowmap::store::GraphStore;
use splunk_flowmap::validate::{build_validation_report, render_validation_text, ValidationReport};

use crate::cli::{OutputFormat, ValidateArgs};

pub fn run_validate(args: ValidateArgs) -> Result<()> {
    let report = match (&args.graph, &args.store, &args.graph_id) {
        (_, Some(root), Some(id)) => {
            let findings = GraphStore::new(root)
                .validate_and_store(id)
                .with_context(|| format!("failed to validate stored graph {id}"))?;
            ValidationReport::new(findings)
        }
        (Some(path), _, _) => build_validation_report(&read_graph(path)?),
        _ => bail!("either a graph file or --store with --graph-id is required"),
    };

    print_report(&report, args.format)?;
    check_report(&report, args.strict)
}

fn read_graph(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid graph JSON in {}", path.display()))
}

pub fn print_report(report: &ValidationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", colorize_findings(&render_validation_text(report))),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

pub fn check_report(report: &ValidationReport, strict: bool) -> Result<()> {
    if report.errors > 0 {
        bail!("validation failed: {} errors", report.errors);
    }
    if strict && report.warnings > 0 {
        bail!("validation failed in strict mode: {} warnings", report.warnings);
    }
    Ok(())
}
