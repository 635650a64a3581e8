//! Small helpers shared by the typed stanza extractors.

use conf_layers::StanzaRecord;
use indexmap::IndexMap;

/// Splunk boolean: `1`, `true`, `yes` (case-insensitive) are true, anything else false.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

/// Tri-state boolean: absent key is `None`.
pub fn optional_bool(record: &StanzaRecord, key: &str) -> Option<bool> {
    record.get(key).map(is_truthy)
}

pub fn optional_string(record: &StanzaRecord, key: &str) -> Option<String> {
    record.get(key).map(ToOwned::to_owned)
}

/// Every key not consumed by a typed field, in stanza order.
pub fn residual_options(
    record: &StanzaRecord,
    consumed: impl Fn(&str) -> bool,
) -> IndexMap<String, String> {
    record
        .values
        .iter()
        .filter(|(key, _)| !consumed(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Split a comma-separated list, trimming entries and dropping empties.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
