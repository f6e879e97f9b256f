//! Configuration errors.
//!
//! Every variant is fatal: the build aborts before any file is processed.

use std::io;
use std::path::PathBuf;

use kiln_core::TemplateError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("rule {rule}: unknown handler '{name}'")]
    UnknownHandler { rule: usize, name: String },

    #[error("rule {0} has no handlers")]
    EmptyRule(usize),

    #[error("invalid alias key '{0}'")]
    InvalidAlias(String),

    #[error("alias chain does not terminate: {}", .0.join(" -> "))]
    AliasCycle(Vec<String>),

    #[error("at least one resolve extension is required")]
    NoExtensions,

    #[error(transparent)]
    Template(#[from] TemplateError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
