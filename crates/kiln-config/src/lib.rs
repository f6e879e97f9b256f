#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Build configuration for kiln.
//!
//! `config` reads `kiln.json` and compiles it into a [`BuildPlan`]: the
//! transformation chain (`rules`), the resolution policy (`resolve`), the
//! mode-gated stages (`stages`), the output descriptor (`output`) and the dev
//! server descriptor (`dev_server`). A plan is fixed for the lifetime of one
//! build invocation.

pub mod config;
pub mod dev_server;
pub mod error;
pub mod output;
pub mod resolve;
pub mod rules;
pub mod stages;

#[cfg(test)]
mod output_tests;
#[cfg(test)]
mod stages_tests;

pub use config::{
    BuildConfig, BuildPlan, CONFIG_FILE, HandlerSpec, HtmlConfig, ResolveConfig, RuleConfig,
    StatsLevel, TargetConfig,
};
pub use dev_server::{DevServerConfig, DevServerSettings};
pub use error::{ConfigError, Result};
pub use output::{OutputConfig, OutputDescriptor, SourceMapMode, plan_output};
pub use resolve::{
    AliasTable, DiskFs, FileSystem, MemoryFs, ModuleNotFound, ResolutionPolicy, normalize,
};
pub use rules::{HandlerOptions, HandlerUse, Pattern, Rule, TransformationChain};
pub use stages::{DefineConfig, Defines, Pipeline, Stage};
