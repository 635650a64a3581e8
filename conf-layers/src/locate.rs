//! Discovery of one named `.conf` file across the four precedence layers.

use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

/// Precedence layer, ordered lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Layer {
    SystemDefault,
    SystemLocal,
    AppDefault,
    AppLocal,
}

impl Layer {
    /// Layer tag as used in log output and provenance.
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::SystemDefault => "system/default",
            Layer::SystemLocal => "system/local",
            Layer::AppDefault => "app/default",
            Layer::AppLocal => "app/local",
        }
    }
}

impl Display for Layer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One existing instance of a `.conf` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedFile {
    /// Absolute (or root-joined) path on disk.
    pub path: PathBuf,
    /// Path relative to the snapshot root, `/`-separated.
    pub relative: String,
    pub layer: Layer,
    /// App directory name for app layers, `None` for system layers.
    pub app: Option<String>,
}

/// Find every instance of `conf_name` under `root`, sorted by ascending precedence.
///
/// Apps are visited in lexicographic order. The sort is stable, so within the
/// app layers the app order is kept: all `apps/*/default` files precede all
/// `apps/*/local` files.
pub fn locate(root: &Path, conf_name: &str) -> Vec<LocatedFile> {
    let mut found = Vec::new();

    for (level, layer) in [
        ("default", Layer::SystemDefault),
        ("local", Layer::SystemLocal),
    ] {
        let path = root.join("system").join(level).join(conf_name);
        if path.is_file() {
            found.push(LocatedFile {
                relative: format!("system/{level}/{conf_name}"),
                path,
                layer,
                app: None,
            });
        }
    }

    for app in app_names(root) {
        for (level, layer) in [("default", Layer::AppDefault), ("local", Layer::AppLocal)] {
            let path = root.join("apps").join(&app).join(level).join(conf_name);
            if path.is_file() {
                found.push(LocatedFile {
                    relative: format!("apps/{app}/{level}/{conf_name}"),
                    path,
                    layer,
                    app: Some(app.clone()),
                });
            }
        }
    }

    found.sort_by_key(|f| f.layer);
    found
}

/// Sorted app directory names under `<root>/apps`. Missing directory yields none.
pub fn app_names(root: &Path) -> Vec<String> {
    let apps_dir = root.join("apps");
    if !apps_dir.is_dir() {
        return Vec::new();
    }

    let entries = match fs::read_dir(&apps_dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %apps_dir.display(), error = %err, "failed to list apps directory");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(ToOwned::to_owned))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::{app_names, locate, Layer};
    use std::fs;
    use std::path::Path;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, "[s]\n").expect("write");
    }

    #[test]
    fn orders_by_precedence_not_by_app_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        touch(root, "apps/zeta/default/inputs.conf");
        touch(root, "apps/alpha/local/inputs.conf");
        touch(root, "system/local/inputs.conf");
        touch(root, "apps/alpha/default/inputs.conf");
        touch(root, "system/default/inputs.conf");

        let found = locate(root, "inputs.conf");
        let rels: Vec<&str> = found.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(
            rels,
            vec![
                "system/default/inputs.conf",
                "system/local/inputs.conf",
                "apps/alpha/default/inputs.conf",
                "apps/zeta/default/inputs.conf",
                "apps/alpha/local/inputs.conf",
            ]
        );
        assert_eq!(found[4].layer, Layer::AppLocal);
        assert_eq!(found[4].app.as_deref(), Some("alpha"));
        assert_eq!(found[0].app, None);
    }

    #[test]
    fn ignores_other_files_and_missing_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        touch(root, "system/default/outputs.conf");
        fs::write(root.join("apps-not-a-dir"), "").expect("write");

        assert!(locate(root, "inputs.conf").is_empty());
        assert!(app_names(root).is_empty());
    }

    #[test]
    fn app_names_skip_plain_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        touch(root, "apps/search/default/app.conf");
        touch(root, "apps/Splunk_TA_nix/default/app.conf");
        fs::write(root.join("apps").join("README"), "x").expect("write");

        assert_eq!(app_names(root), vec!["Splunk_TA_nix", "search"]);
    }
}
