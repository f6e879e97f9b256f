//! Content handlers: the named steps a rule's `use` list refers to.
//!
//! A module starts as [`ModuleContent::Raw`] bytes and is threaded through
//! its handlers in application order. Whatever comes out must be script
//! text; it becomes the module body in the bundle.

mod builtin;

#[cfg(test)]
mod builtin_tests;

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use kiln_config::{HandlerOptions, OutputDescriptor, TargetConfig};
use kiln_core::BuildMode;

use crate::collab::ModuleCompiler;

pub use builtin::{
    AssetResourceHandler, CompileHandler, CssHandler, HtmlHandler, JsonHandler, StyleHandler,
};
pub(crate) use builtin::js_string;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleContent {
    /// File bytes as read from disk.
    Raw(Vec<u8>),
    /// CommonJS-style module body.
    Script(String),
}

impl ModuleContent {
    pub fn into_text(self) -> Result<String, String> {
        match self {
            ModuleContent::Script(text) => Ok(text),
            ModuleContent::Raw(bytes) => {
                String::from_utf8(bytes).map_err(|e| format!("content is not UTF-8: {e}"))
            }
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ModuleContent::Raw(bytes) => bytes,
            ModuleContent::Script(text) => text.into_bytes(),
        }
    }
}

/// A file emitted next to the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub filename: String,
    pub source: std::path::PathBuf,
    pub content: Vec<u8>,
}

/// What a handler may see and produce besides the module content.
pub struct HandlerContext<'a> {
    pub path: &'a Path,
    /// Stable id of the module in the bundle.
    pub id: &'a str,
    pub mode: BuildMode,
    pub output: &'a OutputDescriptor,
    pub target: &'a TargetConfig,
    assets: &'a mut Vec<Asset>,
}

impl<'a> HandlerContext<'a> {
    pub fn new(
        path: &'a Path,
        id: &'a str,
        mode: BuildMode,
        output: &'a OutputDescriptor,
        target: &'a TargetConfig,
        assets: &'a mut Vec<Asset>,
    ) -> Self {
        Self {
            path,
            id,
            mode,
            output,
            target,
            assets,
        }
    }

    /// Queue `content` for emission under `filename`.
    pub fn emit_asset(&mut self, filename: String, content: Vec<u8>) {
        if self.assets.iter().any(|a| a.filename == filename) {
            return;
        }
        self.assets.push(Asset {
            filename,
            source: self.path.to_path_buf(),
            content,
        });
    }
}

pub type HandlerResult = Result<ModuleContent, String>;

pub trait Handler: Send + Sync {
    fn apply(
        &self,
        input: ModuleContent,
        cx: &mut HandlerContext<'_>,
        options: &HandlerOptions,
    ) -> HandlerResult;

    /// Whether the output may contain `import`/`require` edges worth following.
    fn scans_dependencies(&self) -> bool {
        false
    }
}

/// Handler names to implementations.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: IndexMap<String, Arc<dyn Handler>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.handlers.keys()).finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `compile`, `asset/resource`, `css`, `style`, `html` and `json`.
    pub fn with_builtins(compiler: Arc<dyn ModuleCompiler>) -> Self {
        let mut registry = Self::new();
        registry.register("compile", CompileHandler::new(compiler));
        registry.register("asset/resource", AssetResourceHandler);
        registry.register("css", CssHandler);
        registry.register("style", StyleHandler);
        registry.register("html", HtmlHandler);
        registry.register("json", JsonHandler);
        registry
    }

    /// Register `handler` under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, handler: impl Handler + 'static) {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}
