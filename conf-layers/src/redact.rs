//! Redaction of sensitive configuration values.
//!
//! Matching is on the whole key, case-insensitive. Redaction is applied by the
//! merger before a value is stored, so typed records built on top of a
//! [`crate::MergedConf`] never hold a secret.

/// Replacement stored in place of any sensitive value.
pub const REDACTED: &str = "<REDACTED>";

/// Lowercased keys whose values are always redacted.
pub const SENSITIVE_KEYS: &[&str] = &["pass4symmkey", "sslpassword", "password", "token", "secret"];

/// Return true when `key` names a sensitive setting.
pub fn is_sensitive(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    SENSITIVE_KEYS.contains(&lower.as_str())
}

/// Return the value to store for `key`: either `value` unchanged or [`REDACTED`].
pub fn redact<'a>(key: &str, value: &'a str) -> &'a str {
    if is_sensitive(key) {
        REDACTED
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::{is_sensitive, redact, REDACTED};

    #[test]
    fn matches_case_insensitively() {
        for key in ["pass4SymmKey", "PASS4SYMMKEY", "sslPassword", "Password", "TOKEN", "Secret"] {
            assert!(is_sensitive(key), "{key} should be sensitive");
        }
    }

    #[test]
    fn leaves_lookalike_keys_alone() {
        assert!(!is_sensitive("sslCertPath"));
        assert!(!is_sensitive("token_name"));
        assert_eq!(redact("server", "idx1:9997"), "idx1:9997");
    }

    #[test]
    fn replaces_sensitive_values() {
        assert_eq!(redact("pass4SymmKey", "changeme"), REDACTED);
    }
}
