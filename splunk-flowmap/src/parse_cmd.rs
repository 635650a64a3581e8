use anyhow::{Context, Result};
use splunk_flowmap::report::render_parse_text;
use splunk_flowmap::snapshot::{parse_snapshot, ParsedConfig};

use crate::cli::{OutputFormat, ParseArgs, SnapshotArgs};

pub fn run_parse(args: ParseArgs) -> Result<()> {
    let parsed = load_snapshot(&args.snapshot)?;

    match args.format {
        OutputFormat::Text => println!("{}", render_parse_text(&parsed)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&parsed)?),
    }
    Ok(())
}

/// Parse the snapshot and apply the host labels given on the command line.
pub fn load_snapshot(args: &SnapshotArgs) -> Result<ParsedConfig> {
    let mut parsed = parse_snapshot(&args.dir, &args.job_id)
        .with_context(|| format!("failed to parse snapshot {}", args.dir.display()))?;
    parsed.host_metadata.environment = args.environment.clone();
    parsed.host_metadata.cluster = args.cluster.clone();
    Ok(parsed)
}
