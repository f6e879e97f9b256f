//! `kiln.json` schema and compilation into an immutable [`BuildPlan`].
//!
//! The defaults reproduce the pipeline of a React Native for Web
//! application: TypeScript sources with `.web.*` platform variants, image and
//! font assets, CSS injected through style tags, and an HTML shell.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use kiln_core::{BuildMode, Environment};
use serde::{Deserialize, Serialize};

use crate::dev_server::{DevServerConfig, DevServerSettings};
use crate::error::{ConfigError, Result};
use crate::output::{OutputConfig, OutputDescriptor, plan_output};
use crate::resolve::{AliasTable, FileSystem, ResolutionPolicy};
use crate::rules::{HandlerOptions, HandlerUse, Pattern, Rule, TransformationChain};
use crate::stages::{DefineConfig, Defines, Pipeline};

/// Config file looked up in the project root when none is given.
pub const CONFIG_FILE: &str = "kiln.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct BuildConfig {
    /// Chunk name, available to templates as `[name]`.
    pub name: String,
    pub entry: PathBuf,
    pub rules: Vec<RuleConfig>,
    pub resolve: ResolveConfig,
    pub output: OutputConfig,
    pub html: HtmlConfig,
    pub define: DefineConfig,
    pub dev_server: DevServerSettings,
    pub target: TargetConfig,
    pub stats: StatsLevel,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    pub test: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    #[serde(rename = "use")]
    pub handlers: Vec<HandlerSpec>,
    #[serde(default)]
    pub priority: i32,
}

/// A handler given by name, or by name with options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HandlerSpec {
    Name(String),
    WithOptions {
        name: String,
        #[serde(default)]
        options: HandlerOptions,
    },
}

impl HandlerSpec {
    fn to_use(&self) -> HandlerUse {
        match self {
            HandlerSpec::Name(name) => HandlerUse::new(name.clone()),
            HandlerSpec::WithOptions { name, options } => {
                HandlerUse::with_options(name.clone(), options.clone())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ResolveConfig {
    /// Probed in order; list platform variants before generic ones.
    pub extensions: Vec<String>,
    /// Keys ending in `$` match exactly; others also match sub-paths.
    pub alias: IndexMap<String, String>,
    pub modules: Vec<PathBuf>,
    pub main_fields: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            extensions: [
                ".web.tsx", ".web.ts", ".tsx", ".ts", ".web.jsx", ".web.js", ".jsx", ".js",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            alias: [
                ("react-native$", "react-native-web"),
                ("react", "./node_modules/react"),
                ("react-dom", "./node_modules/react-dom"),
                ("react-native-web$", "./node_modules/react-native-web"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect(),
            modules: vec![PathBuf::from("node_modules")],
            main_fields: ["browser", "module", "main"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct HtmlConfig {
    /// Template file; a minimal document is generated when unset or missing.
    pub template: Option<PathBuf>,
    pub filename: String,
    pub title: String,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            template: Some(PathBuf::from("web/public/index.html")),
            filename: "index.html".into(),
            title: "kiln".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct TargetConfig {
    pub platform: String,
    /// Browser query handed to the compiler.
    pub browserslist: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            platform: "web".into(),
            browserslist: ">0.2%, not dead, not op_mini all, Chrome >= 38".into(),
        }
    }
}

/// Build output verbosity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatsLevel {
    #[default]
    ErrorsOnly,
    Minimal,
    Normal,
    Verbose,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            name: "app".into(),
            entry: PathBuf::from("index.web.tsx"),
            rules: default_rules(),
            resolve: ResolveConfig::default(),
            output: OutputConfig::default(),
            html: HtmlConfig::default(),
            define: DefineConfig::default(),
            dev_server: DevServerSettings::default(),
            target: TargetConfig::default(),
            stats: StatsLevel::default(),
        }
    }
}

fn default_rules() -> Vec<RuleConfig> {
    let rule = |test: &str, exclude: Option<&str>, handlers: &[&str]| RuleConfig {
        test: test.into(),
        exclude: exclude.map(Into::into),
        handlers: handlers
            .iter()
            .map(|h| HandlerSpec::Name((*h).into()))
            .collect(),
        priority: 0,
    };
    vec![
        rule(
            r"\.[jt]sx?$|\.mjs$|\.cjs$",
            Some(r"node_modules/(core-js/|scheduler/)"),
            &["compile"],
        ),
        rule(r"\.(gif|jpe?g|png|svg|ico)$", None, &["asset/resource"]),
        rule(r"\.(eot|svg|ttf|woff|woff2)$", None, &["asset/resource"]),
        rule(r"\.(css)$", None, &["css", "style"]),
        rule(r"\.html$", None, &["html"]),
        rule(r"\.json$", None, &["json"]),
    ]
}

impl BuildConfig {
    pub fn from_json(json: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json, path)
    }

    /// Load `explicit`, else `root/kiln.json` if present, else the defaults.
    ///
    /// Returns the config and the file it came from.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        let candidate = root.join(CONFIG_FILE);
        if candidate.is_file() {
            return Ok((Self::load(&candidate)?, Some(candidate)));
        }
        Ok((Self::default(), None))
    }

    /// Compile into the immutable plan for one build invocation.
    pub fn compile(&self, root: &Path, mode: BuildMode, env: &Environment) -> Result<BuildPlan> {
        let mut rules = Vec::with_capacity(self.rules.len());
        for config in &self.rules {
            let mut rule = Rule::new(Pattern::new(&config.test)?).priority(config.priority);
            if let Some(exclude) = &config.exclude {
                rule = rule.exclude(Pattern::new(exclude)?);
            }
            for spec in &config.handlers {
                rule = rule.handler(spec.to_use());
            }
            rules.push(rule);
        }

        if self.resolve.extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }
        let modules = self
            .resolve
            .modules
            .iter()
            .map(|m| {
                if m.components().count() > 1 {
                    root.join(m)
                } else {
                    m.clone()
                }
            })
            .collect();
        let policy = ResolutionPolicy::new(
            root,
            self.resolve.extensions.clone(),
            AliasTable::new(&self.resolve.alias)?,
        )
        .with_modules(modules)
        .with_main_fields(self.resolve.main_fields.clone());

        let output = plan_output(mode, &self.output, root)?;
        let dev_server = DevServerConfig::describe(&self.dev_server, &output, root);

        Ok(BuildPlan {
            root: root.to_path_buf(),
            mode,
            name: self.name.clone(),
            entry: root.join(&self.entry),
            chain: TransformationChain::new(rules),
            policy,
            pipeline: Pipeline::compose(mode, dev_server.live_reload),
            defines: Defines::new(mode, &self.define, env),
            output,
            dev_server,
            html_template: self.html.template.as_ref().map(|t| root.join(t)),
            html_filename: self.html.filename.clone(),
            html_title: self.html.title.clone(),
            target: self.target.clone(),
            stats: self.stats,
        })
    }
}

/// Everything one build invocation needs, derived once and never mutated.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub root: PathBuf,
    pub mode: BuildMode,
    pub name: String,
    pub entry: PathBuf,
    pub chain: TransformationChain,
    pub policy: ResolutionPolicy,
    pub pipeline: Pipeline,
    pub defines: Defines,
    pub output: OutputDescriptor,
    pub dev_server: DevServerConfig,
    pub html_template: Option<PathBuf>,
    pub html_filename: String,
    pub html_title: String,
    pub target: TargetConfig,
    pub stats: StatsLevel,
}

impl BuildPlan {
    /// Evaluate resolution and reads against `fs` instead of the disk.
    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.policy = self.policy.with_fs(fs);
        self
    }
}
