//! Module graph.
//!
//! Walked depth-first from the entry. Each module is read, run through the
//! handlers its rule names, scanned for dependencies, and every dependency
//! resolved before the walk descends into it. Module order is the order of
//! first visit, so identical inputs give identical bundles.

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use kiln_config::rules::normalize_separators;
use kiln_config::{BuildPlan, ConfigError};
use tracing::debug;

use crate::error::{Error, Result};
use crate::handlers::{Asset, HandlerContext, HandlerRegistry, ModuleContent};
use crate::scan::DependencyScanner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Root-relative path with forward slashes, prefixed with `./`.
    pub id: String,
    pub path: PathBuf,
    /// Original text, for the source map.
    pub source: String,
    /// Module body after the handler pipeline.
    pub code: String,
    /// Specifier as written to the id it resolved to.
    pub dependencies: IndexMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ModuleGraph {
    entry: String,
    modules: IndexMap<PathBuf, Module>,
    assets: Vec<Asset>,
}

impl ModuleGraph {
    pub fn build(plan: &BuildPlan, registry: &HandlerRegistry) -> Result<Self> {
        let scanner = DependencyScanner::new()?;
        let entry_id = module_id(&plan.root, &plan.entry);
        let mut graph = Self {
            entry: entry_id,
            modules: IndexMap::new(),
            assets: Vec::new(),
        };

        let mut visited = IndexSet::new();
        let mut stack = vec![plan.entry.clone()];
        while let Some(path) = stack.pop() {
            if !visited.insert(path.clone()) {
                continue;
            }
            let (module, resolved) = graph.load(plan, registry, &scanner, &path)?;
            debug!(id = %module.id, deps = resolved.len(), "module");
            graph.modules.insert(path, module);
            stack.extend(resolved.into_iter().rev());
        }
        Ok(graph)
    }

    fn load(
        &mut self,
        plan: &BuildPlan,
        registry: &HandlerRegistry,
        scanner: &DependencyScanner,
        path: &Path,
    ) -> Result<(Module, Vec<PathBuf>)> {
        let bytes = plan.policy.fs().read(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let source = String::from_utf8_lossy(&bytes).into_owned();
        let id = module_id(&plan.root, path);
        let transform_err = |handler: &str, diagnostic: String| Error::HandlerTransform {
            path: path.to_path_buf(),
            handler: handler.to_owned(),
            diagnostic,
        };

        let mut content = ModuleContent::Raw(bytes);
        let mut scans = true;
        if let Some((index, rule)) = plan.chain.matching_rule(path) {
            scans = false;
            for step in &rule.handlers {
                let handler = registry.get(&step.name).ok_or_else(|| {
                    Error::Configuration(ConfigError::UnknownHandler {
                        rule: index,
                        name: step.name.clone(),
                    })
                })?;
                let mut cx = HandlerContext::new(
                    path,
                    &id,
                    plan.mode,
                    &plan.output,
                    &plan.target,
                    &mut self.assets,
                );
                content = handler
                    .apply(content, &mut cx, &step.options)
                    .map_err(|d| transform_err(&step.name, d))?;
                scans |= handler.scans_dependencies();
            }
        }
        let code = content
            .into_text()
            .map_err(|d| transform_err("passthrough", d))?;

        let mut dependencies = IndexMap::new();
        let mut resolved = Vec::new();
        if scans {
            for specifier in scanner.scan(&code) {
                let target = plan.policy.resolve_module(specifier, path)?;
                debug!(specifier, target = %target.display(), "resolved");
                dependencies.insert(specifier.to_owned(), module_id(&plan.root, &target));
                resolved.push(target);
            }
        }

        let module = Module {
            id,
            path: path.to_path_buf(),
            source,
            code,
            dependencies,
        };
        Ok((module, resolved))
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Modules in visit order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn module(&self, path: &Path) -> Option<&Module> {
        self.modules.get(path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }
}

fn module_id(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => format!("./{}", normalize_separators(relative)),
        Err(_) => normalize_separators(path),
    }
}
