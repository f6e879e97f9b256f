//! Build mode selection.
//!
//! The mode is derived exactly once per invocation from an [`Environment`]
//! snapshot and an optional invocation-level override, then passed by value
//! to everything that needs it.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Environment variable that selects production mode.
pub const MODE_VAR: &str = "NODE_ENV";

/// Operating mode of a build invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    pub fn is_production(self) -> bool {
        self == BuildMode::Production
    }

    pub fn is_development(self) -> bool {
        self == BuildMode::Development
    }

    /// Whether emitted code is compacted.
    pub fn minifies(self) -> bool {
        self.is_production()
    }

    /// Whether the bundle carries an inline source map.
    pub fn inline_source_map(self) -> bool {
        self.is_development()
    }

    /// Whether the live-reload client is part of the bundle.
    pub fn live_reload(self) -> bool {
        self.is_development()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Development => "development",
            BuildMode::Production => "production",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown build mode '{0}' (expected 'development' or 'production')")]
pub struct ParseModeError(pub String);

impl FromStr for BuildMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(BuildMode::Development),
            "production" | "prod" => Ok(BuildMode::Production),
            _ => Err(ParseModeError(s.to_owned())),
        }
    }
}

/// Immutable snapshot of environment variables.
///
/// Captured once at startup; components receive it (or values derived from
/// it) instead of reading the process environment themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: IndexMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn capture() -> Self {
        let mut vars: IndexMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        vars.sort_keys();
        Self { vars }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Select the build mode.
///
/// An explicit `override_mode` (e.g. `--mode` on the command line) wins over
/// the environment. Otherwise `NODE_ENV=production` selects production and
/// every other value, including an absent variable, selects development.
pub fn derive_mode(env: &Environment, override_mode: Option<BuildMode>) -> BuildMode {
    if let Some(mode) = override_mode {
        return mode;
    }
    match env.get(MODE_VAR) {
        Some("production") => BuildMode::Production,
        _ => BuildMode::Development,
    }
}
