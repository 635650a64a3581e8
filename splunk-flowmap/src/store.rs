//! Directory-backed store for graphs and their current findings.
//!
//! Layout under the store root:
//!
//! ```text
//! graphs/<graph-id>.json    canonical graph
//! findings/<graph-id>.json  findings from the latest validation run
//! ```
//!
//! Findings are replaced as a whole: a new set is written to a temporary file
//! and renamed over the previous one, so readers never observe a mix of runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::graph::CanonicalGraph;
use crate::validate::{validate_graph, Finding};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("graph not found: {id}")]
    NotFound { id: String },
    #[error("invalid graph id '{id}': only letters, digits, '_' and '-' are allowed")]
    InvalidId { id: String },
    #[error("store I/O failed for {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct GraphStore {
    root: PathBuf,
}

fn check_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId { id: id.to_string() })
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl GraphStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn graph_path(&self, id: &str) -> PathBuf {
        self.root.join("graphs").join(format!("{id}.json"))
    }

    fn findings_path(&self, id: &str) -> PathBuf {
        self.root.join("findings").join(format!("{id}.json"))
    }

    fn write_replacing(path: &Path, body: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(io_error(&tmp))?;
        fs::rename(&tmp, path).map_err(io_error(path))
    }

    fn read_json(path: &Path, id: &str) -> Result<Value, StoreError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { id: id.to_string() })
            }
            Err(err) => return Err(io_error(path)(err)),
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// Write (or overwrite) the graph stored under `id`.
    pub fn save_graph(&self, id: &str, graph: &CanonicalGraph) -> Result<PathBuf, StoreError> {
        check_id(id)?;
        let path = self.graph_path(id);
        let body = serde_json::to_vec_pretty(graph).map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })?;
        Self::write_replacing(&path, &body)?;
        info!(graph_id = id, path = %path.display(), "stored graph");
        Ok(path)
    }

    pub fn load_graph_json(&self, id: &str) -> Result<Value, StoreError> {
        check_id(id)?;
        Self::read_json(&self.graph_path(id), id)
    }

    /// Validate the stored graph and replace its findings with the new set.
    ///
    /// A missing graph is an error and leaves any existing findings untouched.
    pub fn validate_and_store(&self, id: &str) -> Result<Vec<Finding>, StoreError> {
        let graph = self.load_graph_json(id)?;
        let findings = validate_graph(&graph);

        let path = self.findings_path(id);
        let body = serde_json::to_vec_pretty(&findings).map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })?;
        Self::write_replacing(&path, &body)?;
        info!(graph_id = id, findings = findings.len(), "replaced findings");
        Ok(findings)
    }

    /// Findings from the latest validation run; empty if never validated.
    pub fn load_findings(&self, id: &str) -> Result<Vec<Finding>, StoreError> {
        check_id(id)?;
        let path = self.findings_path(id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let value = Self::read_json(&path, id)?;
        serde_json::from_value(value).map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })
    }
}
