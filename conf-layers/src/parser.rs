use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

/// Errors that can occur while parsing `.conf` text into a [`ConfFile`].
#[derive(Debug, Error)]
pub enum ConfError {
    /// Failed to read input file.
    #[error("failed to read conf file: {0}")]
    Io(#[from] std::io::Error),
    /// Input bytes were not valid UTF-8.
    #[error("invalid UTF-8 in conf file: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// A line could not be interpreted.
    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// One parsed `.conf` file: stanzas in file order, keys in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfFile {
    pub stanzas: IndexMap<String, IndexMap<String, String>>,
}

impl ConfFile {
    /// Return the raw key/value map for a stanza.
    pub fn stanza(&self, name: &str) -> Option<&IndexMap<String, String>> {
        self.stanzas.get(name)
    }

    /// Return a single value from a stanza.
    pub fn get(&self, stanza: &str, key: &str) -> Option<&str> {
        self.stanzas
            .get(stanza)
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }
}

/// Parse `.conf` text.
pub fn parse(text: &str) -> Result<ConfFile, ConfError> {
    let mut conf = ConfFile::default();
    let mut current: Option<String> = None;

    for (line_no, line) in logical_lines(text) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if trimmed.starts_with('[') {
            let Some(end) = trimmed.rfind(']') else {
                return Err(syntax(line_no, "unterminated stanza header"));
            };
            let name = trimmed[1..end].trim();
            if name.is_empty() {
                return Err(syntax(line_no, "empty stanza name"));
            }
            conf.stanzas.entry(name.to_string()).or_default();
            current = Some(name.to_string());
            continue;
        }

        let Some((key, value)) = split_key_value(trimmed) else {
            return Err(syntax(line_no, "expected 'key = value'"));
        };
        let Some(stanza) = current.as_ref() else {
            return Err(syntax(line_no, "key/value pair before any stanza header"));
        };
        if key.is_empty() {
            return Err(syntax(line_no, "empty key"));
        }
        if let Some(entries) = conf.stanzas.get_mut(stanza) {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    Ok(conf)
}

/// Parse a `.conf` file from disk.
pub fn parse_file(path: &Path) -> Result<ConfFile, ConfError> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes)?;
    parse(&text)
}

// Joins backslash-continued lines; each logical line keeps its first physical line number.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let (start, mut buf) = match pending.take() {
            Some((start, mut buf)) => {
                buf.push('\n');
                (start, buf)
            }
            None => (line_no, String::new()),
        };

        let raw = raw.trim_end_matches('\r');
        if let Some(stripped) = raw.strip_suffix('\\') {
            buf.push_str(stripped);
            pending = Some((start, buf));
        } else {
            buf.push_str(raw);
            out.push((start, buf));
        }
    }

    if let Some(last) = pending {
        out.push(last);
    }
    out
}

fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let idx = match (line.find('='), line.find(':')) {
        (Some(eq), Some(colon)) => eq.min(colon),
        (Some(eq), None) => eq,
        (None, Some(colon)) => colon,
        (None, None) => return None,
    };
    Some((line[..idx].trim(), line[idx + 1..].trim()))
}

fn syntax(line: usize, message: &str) -> ConfError {
    ConfError::Syntax {
        line,
        message: message.to_string(),
    }
}
