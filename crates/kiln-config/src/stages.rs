//! Mode-gated pipeline stages.
//!
//! The pipeline is `ALWAYS_ON` followed by every entry of `OPTIONAL` whose
//! predicate holds for the build mode, in declared order.

use indexmap::IndexMap;
use kiln_core::{BuildMode, Environment};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Compile-time constants prepended to the bundle.
    Define,
    /// Generated HTML document referencing the bundle.
    HtmlTemplate,
    /// Client that reloads the page when the dev server rebuilds.
    LiveReload,
    /// Whitespace compaction of the whole bundle.
    Minify,
    /// Source map embedded as a data URL.
    InlineSourceMap,
}

pub const ALWAYS_ON: &[Stage] = &[Stage::Define, Stage::HtmlTemplate];

pub const OPTIONAL: &[(Stage, fn(BuildMode) -> bool)] = &[
    (Stage::LiveReload, BuildMode::live_reload),
    (Stage::Minify, BuildMode::minifies),
    (Stage::InlineSourceMap, BuildMode::inline_source_map),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Compose the stage list for `mode`.
    ///
    /// `live_reload` can switch the live-reload stage off in development; it
    /// never switches it on in production.
    pub fn compose(mode: BuildMode, live_reload: bool) -> Self {
        let optional = OPTIONAL
            .iter()
            .filter(|(stage, enabled)| enabled(mode) && (*stage != Stage::LiveReload || live_reload))
            .map(|(stage, _)| *stage);
        Self {
            stages: ALWAYS_ON.iter().copied().chain(optional).collect(),
        }
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

/// `define` section of the configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DefineConfig {
    /// Extra constants, emitted as-is.
    pub constants: IndexMap<String, Value>,
    /// Environment variables exposed under `process.env`.
    pub env: Vec<String>,
}

/// Resolved compile-time constants.
#[derive(Clone, Debug, PartialEq)]
pub struct Defines {
    values: IndexMap<String, Value>,
}

impl Defines {
    /// `__DEV__` and `process.env.NODE_ENV` follow `mode`; other
    /// `process.env` entries come from `env` for the allow-listed names.
    ///
    /// `APP_ENV` has no effect on `__DEV__`; only the build mode does.
    pub fn new(mode: BuildMode, config: &DefineConfig, env: &Environment) -> Self {
        let mut process_env = Map::new();
        for name in &config.env {
            if let Some(value) = env.get(name) {
                process_env.insert(name.clone(), Value::String(value.to_owned()));
            }
        }
        process_env.insert("NODE_ENV".into(), Value::String(mode.as_str().into()));

        let mut values = IndexMap::new();
        values.insert("__DEV__".to_owned(), Value::Bool(mode.is_development()));
        values.insert(
            "process".to_owned(),
            serde_json::json!({ "env": Value::Object(process_env) }),
        );
        for (name, value) in &config.constants {
            values.insert(name.clone(), value.clone());
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
