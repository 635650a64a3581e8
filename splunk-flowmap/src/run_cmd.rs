use anyhow::Result;
use serde_json::json;
use splunk_flowmap::validate::build_validation_report;

use crate::cli::{OutputFormat, RunArgs};
use crate::resolve_cmd::resolve_snapshot;
use crate::validate_cmd::{check_report, print_report};

pub fn run_pipeline(args: RunArgs) -> Result<()> {
    let graph = resolve_snapshot(&args.snapshot, args.keywords_file.as_deref())?;
    let graph_json = graph.to_json()?;
    let report = build_validation_report(&graph_json);

    match args.format {
        OutputFormat::Text => {
            println!(
                "graph hosts={} edges={}",
                graph.meta.host_count, graph.meta.edge_count
            );
            print_report(&report, OutputFormat::Text)?;
        }
        OutputFormat::Json => {
            let combined = json!({ "graph": graph_json, "report": report });
            println!("{}", serde_json::to_string_pretty(&combined)?);
        }
    }

    check_report(&report, args.strict)
}
