//! Generic `.conf` parsing and layered precedence merging used by higher-level tools.
//!
//! Files are discovered across four scopes (lowest to highest precedence):
//! `system/default`, `system/local`, `apps/*/default`, `apps/*/local`.
//! Later layers overwrite same-named keys in earlier ones. Sensitive values are
//! redacted while merging so nothing downstream ever sees them.

pub mod locate;
pub mod merge;
pub mod parser;
pub mod redact;

pub use locate::{app_names, locate, Layer, LocatedFile};
pub use merge::{load_merged, merge_layers, MergedConf, Provenance, SourceRef, StanzaRecord};
pub use parser::{parse, parse_file, ConfError, ConfFile};
pub use redact::{is_sensitive, redact, REDACTED, SENSITIVE_KEYS};
