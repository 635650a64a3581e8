//! Splunk configuration snapshot analysis.
//!
//! This library turns an extracted Splunk configuration tree (the `system/` and
//! `apps/` directories of one instance) into a canonical data-flow graph and
//! checks that graph for routing and security problems. Layer discovery,
//! precedence merging, and redaction live in the `conf-layers` crate; everything
//! here is Splunk-specific.
//!
//! # Architecture
//!
//! ## Extraction
//!
//! - [`inputs`]: `inputs.conf` stanzas classified by input kind
//! - [`outputs`]: `tcpout` groups with TLS, indexer discovery, and per-server settings
//! - [`props`]: `props.conf` stanzas and their `TRANSFORMS-*` references
//! - [`transforms`]: `transforms.conf` stanzas and derived routing flags
//! - [`snapshot`]: Assembly of all of the above into a [`snapshot::ParsedConfig`]
//!
//! ## Resolution
//!
//! - [`resolve`]: Host roles, transform evaluation, edge building and merging
//! - [`graph`]: The canonical graph model and its JSON shape
//! - [`keywords`]: Hostname/app keyword table for role fallback
//!
//! ## Validation & Storage
//!
//! - [`validate`]: Finding rules and the validation report
//! - [`store`]: Directory-backed graph and finding store
//! - [`report`]: Terminal rendering
//!
//! # Workflow
//!
//! 1. **Parse** the snapshot directory into a `ParsedConfig`
//! 2. **Resolve** it into a `CanonicalGraph`
//! 3. **Validate** the graph JSON into findings
//! 4. **Store** the graph and replace its findings
//!
//! # Examples
//!
//! ```ignore
//! use splunk_flowmap::keywords::default_role_keywords;
//! use splunk_flowmap::resolve::build_canonical_graph;
//! use splunk_flowmap::snapshot::parse_snapshot;
//! use splunk_flowmap::validate::build_validation_report;
//!
//! let parsed = parse_snapshot("extracted/uf01".as_ref(), "42")?;
//! let graph = build_canonical_graph(&parsed, &default_role_keywords())?;
//! let report = build_validation_report(&graph.to_json()?);
//! println!("errors={} warnings={}", report.errors, report.warnings);
//! ```

pub mod graph;
pub mod inputs;
pub mod keywords;
pub mod outputs;
pub mod props;
pub mod report;
pub mod resolve;
pub mod snapshot;
pub mod store;
pub mod transforms;
pub mod validate;
mod values;
