//! Assembly of one configuration snapshot into a [`ParsedConfig`].

use std::path::{Path, PathBuf};

use conf_layers::{app_names, load_merged};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::inputs::{parse_inputs, InputStanza};
use crate::outputs::{parse_outputs, OutputGroup};
use crate::props::{parse_props, PropsStanza};
use crate::transforms::{parse_transforms, TransformStanza};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("work directory not found: {}", path.display())]
    WorkDirNotFound { path: PathBuf },
}

/// Facts about the host the snapshot was taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMetadata {
    pub work_directory: String,
    pub job_id: String,
    /// Highest-precedence `[general] serverName` from `server.conf`.
    pub hostname: Option<String>,
    pub apps: Vec<String>,
    pub app_count: usize,
    pub input_count: usize,
    pub output_count: usize,
    pub props_count: usize,
    pub transforms_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

/// Stanza name → every file that contributed to it.
pub type Traceability = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedConfig {
    pub inputs: Vec<InputStanza>,
    pub outputs: Vec<OutputGroup>,
    pub props: Vec<PropsStanza>,
    pub transforms: Vec<TransformStanza>,
    pub host_metadata: HostMetadata,
    pub traceability: Traceability,
}

impl ParsedConfig {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }
}

/// Parse every supported `.conf` family under `work_dir`.
///
/// Individual unreadable files are skipped with a warning; only a missing
/// work directory is an error.
pub fn parse_snapshot(work_dir: &Path, job_id: &str) -> Result<ParsedConfig, ParseError> {
    if !work_dir.exists() {
        return Err(ParseError::WorkDirNotFound {
            path: work_dir.to_path_buf(),
        });
    }
    info!(work_dir = %work_dir.display(), job_id, "parsing snapshot");

    let inputs = parse_inputs(work_dir);
    let outputs = parse_outputs(work_dir);
    let props = parse_props(work_dir);
    let transforms = parse_transforms(work_dir);

    let hostname = load_merged(work_dir, "server.conf")
        .get("general")
        .and_then(|general| general.get("serverName"))
        .map(ToOwned::to_owned);
    debug!(hostname = ?hostname, "resolved serverName");

    let apps = app_names(work_dir);
    let host_metadata = HostMetadata {
        work_directory: work_dir.display().to_string(),
        job_id: job_id.to_string(),
        hostname,
        app_count: apps.len(),
        apps,
        input_count: inputs.len(),
        output_count: outputs.len(),
        props_count: props.len(),
        transforms_count: transforms.len(),
        environment: None,
        cluster: None,
    };

    let traceability = build_traceability(&inputs, &outputs, &props, &transforms);

    Ok(ParsedConfig {
        inputs,
        outputs,
        props,
        transforms,
        host_metadata,
        traceability,
    })
}

fn build_traceability(
    inputs: &[InputStanza],
    outputs: &[OutputGroup],
    props: &[PropsStanza],
    transforms: &[TransformStanza],
) -> Traceability {
    let mut map = Traceability::new();
    let mut add = |name: String, files: &[String]| {
        map.entry(name).or_default().extend(files.iter().cloned());
    };

    for input in inputs {
        add(input.stanza_name.clone(), &input.provenance.source_files);
    }
    for group in outputs {
        add(format!("tcpout:{}", group.group_name), &group.provenance.source_files);
    }
    for stanza in props {
        add(stanza.stanza_name.clone(), &stanza.provenance.source_files);
    }
    for transform in transforms {
        add(transform.name.clone(), &transform.provenance.source_files);
    }
    map
}
