//! Precedence merging of located `.conf` files into provenance-tracked stanzas.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::locate::{locate, LocatedFile};
use crate::parser::parse_file;
use crate::redact::redact;

/// A file (and owning app) that contributed to a stanza.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub file: String,
    pub app: Option<String>,
}

/// Where a merged stanza came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Highest-precedence contributing file.
    pub source_file: String,
    /// App owning [`Provenance::source_file`], `None` for system layers.
    pub source_app: Option<String>,
    /// Every contributing file, in precedence order.
    pub source_files: Vec<String>,
    /// App for each entry in [`Provenance::source_files`].
    pub source_apps: Vec<Option<String>>,
}

impl Provenance {
    fn record(&mut self, source: &SourceRef) {
        self.source_files.push(source.file.clone());
        self.source_apps.push(source.app.clone());
        self.source_file = source.file.clone();
        self.source_app = source.app.clone();
    }
}

/// One stanza after all layers were merged. Values are already redacted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StanzaRecord {
    pub values: IndexMap<String, String>,
    pub provenance: Provenance,
}

impl StanzaRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Stanza name → merged record, in first-seen order.
pub type MergedConf = IndexMap<String, StanzaRecord>;

/// Merge files already sorted by ascending precedence.
///
/// A file that fails to read or parse contributes nothing; a warning is logged
/// and the remaining layers are still merged.
pub fn merge_layers(files: &[LocatedFile]) -> MergedConf {
    let mut merged = MergedConf::new();

    for located in files {
        let conf = match parse_file(&located.path) {
            Ok(conf) => conf,
            Err(err) => {
                warn!(file = %located.relative, layer = %located.layer, error = %err, "skipping unparsable conf file");
                continue;
            }
        };
        debug!(file = %located.relative, layer = %located.layer, stanzas = conf.stanzas.len(), "merging conf layer");

        let source = SourceRef {
            file: located.relative.clone(),
            app: located.app.clone(),
        };
        for (name, entries) in conf.stanzas {
            let record = merged.entry(name).or_default();
            for (key, value) in &entries {
                let stored = redact(key, value).to_string();
                record.values.insert(key.clone(), stored);
            }
            record.provenance.record(&source);
        }
    }

    merged
}

/// Locate and merge `conf_name` under `root`.
pub fn load_merged(root: &Path, conf_name: &str) -> MergedConf {
    let files = locate(root, conf_name);
    merge_layers(&files)
}
