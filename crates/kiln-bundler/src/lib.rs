#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Build engine for kiln.
//!
//! Drives a [`kiln_config::BuildPlan`]: walks the module graph from the entry,
//! applies each module's handler pipeline, renders the bundle with the
//! mode-gated stages, emits it next to its assets and HTML document, and
//! serves it during development.

pub mod build;
pub mod bundle;
pub mod collab;
pub mod dev;
pub mod emit;
pub mod error;
pub mod graph;
pub mod handlers;
pub mod lexical;
pub mod scan;

#[cfg(test)]
mod build_tests;
#[cfg(test)]
mod lexical_tests;

pub use build::{BuildOutput, Builder};
pub use collab::{
    CompileRequest, HtmlPage, HtmlTemplater, ModuleCompiler, PassthroughCompiler, ScriptInjector,
};
pub use emit::Artifact;
pub use error::{Error, Result};
pub use graph::{Module, ModuleGraph};
pub use handlers::{Handler, HandlerContext, HandlerRegistry, ModuleContent};
