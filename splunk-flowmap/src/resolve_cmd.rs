use std::fs;

use anyhow::{Context, Result};
use splunk_flowmap::graph::CanonicalGraph;
use splunk_flowmap::keywords::role_keywords_or_default;
use splunk_flowmap::resolve::build_canonical_graph;
use splunk_flowmap::store::GraphStore;

use crate::cli::{ResolveArgs, SnapshotArgs};
use crate::parse_cmd::load_snapshot;

pub fn run_resolve(args: ResolveArgs) -> Result<()> {
    let graph = resolve_snapshot(&args.snapshot, args.keywords_file.as_deref())?;

    if let (Some(root), Some(id)) = (&args.store, &args.graph_id) {
        GraphStore::new(root)
            .save_graph(id, &graph)
            .with_context(|| format!("failed to store graph {id}"))?;
    }

    let rendered = serde_json::to_string_pretty(&graph)?;
    match &args.output {
        Some(path) => fs::write(path, format!("{rendered}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}

pub fn resolve_snapshot(
    snapshot: &SnapshotArgs,
    keywords_file: Option<&std::path::Path>,
) -> Result<CanonicalGraph> {
    let parsed = load_snapshot(snapshot)?;
    let keywords = role_keywords_or_default(keywords_file);
    build_canonical_graph(&parsed, &keywords)
        .with_context(|| format!("failed to resolve snapshot {}", snapshot.dir.display()))
}
