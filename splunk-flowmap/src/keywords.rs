use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::graph::Role;

/// One row of the hostname/app keyword table used as a last-resort role hint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleKeywords {
    #[serde(rename = "name")]
    pub role: Role,
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct KeywordFile {
    role: Vec<RoleKeywords>,
}

/// Errors returned when loading keyword files.
#[derive(Debug, Error)]
pub enum KeywordLoadError {
    #[error("failed to read keywords file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse keywords file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Load the role keyword table from a TOML file.
pub fn load_role_keywords(path: &Path) -> Result<Vec<RoleKeywords>, KeywordLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| KeywordLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_keywords(&raw, path.display().to_string())
}

/// Built-in table; table order decides which role wins.
pub fn default_role_keywords() -> Vec<RoleKeywords> {
    let embedded = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/keywords/roles.toml"));
    match parse_keywords(embedded, "embedded keywords".to_string()) {
        Ok(table) if !table.is_empty() => table,
        _ => fallback_role_keywords(),
    }
}

/// Use `path` when given, falling back to the built-in table if it cannot be loaded.
pub fn role_keywords_or_default(path: Option<&Path>) -> Vec<RoleKeywords> {
    let Some(path) = path else {
        return default_role_keywords();
    };
    match load_role_keywords(path) {
        Ok(table) => table,
        Err(err) => {
            warn!(file = %path.display(), error = %err, "using built-in role keywords");
            default_role_keywords()
        }
    }
}

fn parse_keywords(raw: &str, path: String) -> Result<Vec<RoleKeywords>, KeywordLoadError> {
    let parsed: KeywordFile =
        toml::from_str(raw).map_err(|source| KeywordLoadError::Parse { path, source })?;
    Ok(parsed.role)
}

fn fallback_role_keywords() -> Vec<RoleKeywords> {
    let row = |role, keywords: &[&str]| RoleKeywords {
        role,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    };
    vec![
        row(Role::UniversalForwarder, &["splunkforwarder", "uf_", "forwarder"]),
        row(Role::HeavyForwarder, &["heavy", "hf_", "splunk_ta_", "sa-"]),
        row(Role::Indexer, &["idx", "indexer", "cluster_master", "cluster_peer"]),
        row(Role::SearchHead, &["search", "sh_", "deployer"]),
    ]
}

/// First role (in table order) with a keyword contained in `hostname`, then in any app name.
///
/// Matching is on lowercased text.
pub fn match_role_keyword(table: &[RoleKeywords], hostname: &str, apps: &[String]) -> Option<Role> {
    let hostname = hostname.to_ascii_lowercase();
    let apps: Vec<String> = apps.iter().map(|app| app.to_ascii_lowercase()).collect();

    table.iter().find_map(|row| {
        let hit = |text: &str| row.keywords.iter().any(|k| text.contains(&k.to_ascii_lowercase()));
        (hit(&hostname) || apps.iter().any(|app| hit(app.as_str()))).then_some(row.role)
    })
}

#[cfg(test)]
mod tests {
    use super::{
        default_role_keywords, fallback_role_keywords, load_role_keywords, match_role_keyword,
        role_keywords_or_default, KeywordLoadError,
    };
    use crate::graph::Role;
    use std::fs;

    #[test]
    fn embedded_table_matches_fallback() {
        assert_eq!(default_role_keywords(), fallback_role_keywords());
    }

    #[test]
    fn first_role_in_table_order_wins() {
        let table = default_role_keywords();
        // "forwarder" (universal) precedes "heavy" in table order.
        assert_eq!(
            match_role_keyword(&table, "heavy-forwarder-01", &[]),
            Some(Role::UniversalForwarder)
        );
        assert_eq!(match_role_keyword(&table, "IDX07", &[]), Some(Role::Indexer));
        assert_eq!(
            match_role_keyword(&table, "box1", &["Splunk_TA_windows".to_string()]),
            Some(Role::HeavyForwarder)
        );
        assert_eq!(match_role_keyword(&table, "box1", &["base".to_string()]), None);
    }

    #[test]
    fn loads_custom_table_and_falls_back_on_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("roles.toml");
        fs::write(&path, "[[role]]\nname = \"search_head\"\nkeywords = [\"box\"]\n").expect("write");

        let table = load_role_keywords(&path).expect("load");
        assert_eq!(match_role_keyword(&table, "box1", &[]), Some(Role::SearchHead));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "[[role]]\nname = \"wizard\"\n").expect("write");
        assert!(matches!(load_role_keywords(&bad), Err(KeywordLoadError::Parse { .. })));
        assert_eq!(role_keywords_or_default(Some(&bad)), default_role_keywords());
        assert_eq!(
            role_keywords_or_default(Some(&dir.path().join("missing.toml"))),
            default_role_keywords()
        );
    }
}
