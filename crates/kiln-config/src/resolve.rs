//! Module resolution.
//!
//! Turns an import specifier into an absolute file path. Aliases are
//! consulted first; only specifiers that no alias claims are probed against
//! the extension list.
//!
//! Alias keys come in two forms:
//! - `name$` matches the specifier `name` exactly and nothing else.
//! - `name` matches `name` and any `name/sub/path`; the longest such key wins.
//!
//! Exact keys are checked before prefix keys. A match without a sub-path
//! returns the alias target without probing extensions. When that target is a
//! package directory, its entry point is still located the usual way (main
//! fields, then `index`). A prefix match with a sub-path substitutes the key
//! and resolves the result normally, so the sub-path may still omit its
//! extension.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{ConfigError, Result};

/// Longest alias chain followed before giving up.
pub const MAX_ALIAS_DEPTH: usize = 8;

/// Filesystem queries needed by resolution and by the build engine.
pub trait FileSystem: Send + Sync {
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        String::from_utf8(self.read(path)?)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskFs;

impl FileSystem for DiskFs {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// In-memory file tree. Directories exist implicitly as ancestors of files.
#[derive(Debug, Default, Clone)]
pub struct MemoryFs {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }
}

impl FileSystem for MemoryFs {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .keys()
            .any(|file| file != path && file.starts_with(path))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }
}

/// Resolution exhausted every alias and probe candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "module not found: '{specifier}' imported from '{}' (tried {} candidates with extensions [{}])",
    importer.display(),
    candidates.len(),
    extensions.join(", ")
)]
pub struct ModuleNotFound {
    pub specifier: String,
    pub importer: PathBuf,
    pub extensions: Vec<String>,
    pub candidates: Vec<PathBuf>,
}

impl ModuleNotFound {
    /// One candidate per line, for error output.
    pub fn render_candidates(&self) -> String {
        let mut out = String::new();
        for candidate in &self.candidates {
            out.push_str("  tried: ");
            out.push_str(&candidate.display().to_string());
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AliasHit<'a> {
    /// Specifier equals the key.
    Whole(&'a str),
    /// Specifier is `key/sub`; holds the target and `sub`.
    SubPath(&'a str, &'a str),
}

/// Alias table split into exact and prefix keys.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    exact: IndexMap<String, String>,
    /// Sorted by key length, longest first.
    prefix: Vec<(String, String)>,
}

impl AliasTable {
    pub fn new(entries: &IndexMap<String, String>) -> Result<Self> {
        let mut exact = IndexMap::new();
        let mut prefix = Vec::new();
        for (key, target) in entries {
            let (name, is_exact) = match key.strip_suffix('$') {
                Some(name) => (name, true),
                None => (key.as_str(), false),
            };
            if name.is_empty() || name.ends_with('/') || target.is_empty() {
                return Err(ConfigError::InvalidAlias(key.clone()));
            }
            if is_exact {
                exact.insert(name.to_owned(), target.clone());
            } else {
                prefix.push((name.to_owned(), target.clone()));
            }
        }
        prefix.sort_by_key(|(key, _)| std::cmp::Reverse(key.len()));

        let table = Self { exact, prefix };
        table.check_chains()?;
        Ok(table)
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefix.is_empty()
    }

    fn lookup<'a>(&'a self, specifier: &'a str) -> Option<AliasHit<'a>> {
        if let Some(target) = self.exact.get(specifier) {
            return Some(AliasHit::Whole(target));
        }
        self.prefix.iter().find_map(|(key, target)| {
            if specifier == key {
                return Some(AliasHit::Whole(target.as_str()));
            }
            specifier
                .strip_prefix(key.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|sub| AliasHit::SubPath(target.as_str(), sub))
        })
    }

    /// Reject targets that keep re-aliasing without reaching a path.
    fn check_chains(&self) -> Result<()> {
        let targets = self.exact.values().chain(self.prefix.iter().map(|(_, t)| t));
        for start in targets {
            let mut chain = vec![start.clone()];
            let mut current = start.as_str();
            while !is_path_like(current) {
                let Some(AliasHit::Whole(next)) = self.lookup(current) else {
                    break;
                };
                if chain.len() > MAX_ALIAS_DEPTH || chain.iter().any(|seen| seen == next) {
                    chain.push(next.to_owned());
                    return Err(ConfigError::AliasCycle(chain));
                }
                chain.push(next.to_owned());
                current = next;
            }
        }
        Ok(())
    }
}

/// Resolution settings plus the filesystem they are evaluated against.
#[derive(Clone)]
pub struct ResolutionPolicy {
    root: PathBuf,
    extensions: Vec<String>,
    aliases: AliasTable,
    modules: Vec<PathBuf>,
    main_fields: Vec<String>,
    fs: Arc<dyn FileSystem>,
}

impl std::fmt::Debug for ResolutionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionPolicy")
            .field("root", &self.root)
            .field("extensions", &self.extensions)
            .field("aliases", &self.aliases)
            .field("modules", &self.modules)
            .field("main_fields", &self.main_fields)
            .finish_non_exhaustive()
    }
}

/// Candidates tried during one resolution.
#[derive(Default)]
struct Probe {
    candidates: Vec<PathBuf>,
}

impl Probe {
    fn file(&mut self, fs: &dyn FileSystem, path: PathBuf) -> Option<PathBuf> {
        let found = fs.is_file(&path);
        self.candidates.push(path.clone());
        found.then_some(path)
    }
}

impl ResolutionPolicy {
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>, aliases: AliasTable) -> Self {
        Self {
            root: root.into(),
            extensions,
            aliases,
            modules: vec![PathBuf::from("node_modules")],
            main_fields: ["browser", "module", "main"]
                .into_iter()
                .map(String::from)
                .collect(),
            fs: Arc::new(DiskFs),
        }
    }

    /// Module roots. Relative names are searched in the importer's directory
    /// and every ancestor; absolute paths are used directly.
    pub fn with_modules(mut self, modules: Vec<PathBuf>) -> Self {
        self.modules = modules;
        self
    }

    pub fn with_main_fields(mut self, fields: Vec<String>) -> Self {
        self.main_fields = fields;
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Resolve `specifier` as imported from `importer`.
    pub fn resolve_module(
        &self,
        specifier: &str,
        importer: &Path,
    ) -> std::result::Result<PathBuf, ModuleNotFound> {
        let mut probe = Probe::default();
        let found = self.resolve_aliased(specifier, importer, &mut probe, 0);
        found.ok_or_else(|| ModuleNotFound {
            specifier: specifier.to_owned(),
            importer: importer.to_path_buf(),
            extensions: self.extensions.clone(),
            candidates: probe.candidates,
        })
    }

    fn resolve_aliased(
        &self,
        specifier: &str,
        importer: &Path,
        probe: &mut Probe,
        depth: usize,
    ) -> Option<PathBuf> {
        match self.aliases.lookup(specifier) {
            Some(AliasHit::Whole(target)) if depth < MAX_ALIAS_DEPTH => {
                self.resolve_alias_target(target, importer, probe, depth)
            }
            Some(AliasHit::SubPath(target, sub)) => {
                let request = format!("{}/{sub}", target.trim_end_matches('/'));
                if is_path_like(target) {
                    self.probe_path(&normalize(&self.root.join(&request)), probe)
                } else {
                    self.resolve_request(&request, importer, probe)
                }
            }
            _ => self.resolve_request(specifier, importer, probe),
        }
    }

    /// Locate an alias target without extension probing.
    fn resolve_alias_target(
        &self,
        target: &str,
        importer: &Path,
        probe: &mut Probe,
        depth: usize,
    ) -> Option<PathBuf> {
        if is_path_like(target) {
            return self.exact_target(normalize(&self.root.join(target)), probe);
        }
        if self.aliases.lookup(target).is_some() {
            return self.resolve_aliased(target, importer, probe, depth + 1);
        }
        self.module_dirs(importer)
            .into_iter()
            .find_map(|dir| self.exact_target(dir.join(target), probe))
    }

    /// A file as-is, or a package directory through its entry point.
    fn exact_target(&self, path: PathBuf, probe: &mut Probe) -> Option<PathBuf> {
        if self.fs.is_dir(&path) {
            return self.package_entry(&path, probe);
        }
        probe.file(self.fs.as_ref(), path)
    }

    fn resolve_request(&self, request: &str, importer: &Path, probe: &mut Probe) -> Option<PathBuf> {
        if is_relative(request) {
            let base = importer.parent().unwrap_or(&self.root).join(request);
            return self.probe_path(&normalize(&base), probe);
        }
        if Path::new(request).is_absolute() {
            return self.probe_path(&normalize(Path::new(request)), probe);
        }
        self.module_dirs(importer)
            .into_iter()
            .find_map(|dir| self.probe_path(&dir.join(request), probe))
    }

    /// Try `base`, then `base + ext` per extension, then `base` as a directory.
    fn probe_path(&self, base: &Path, probe: &mut Probe) -> Option<PathBuf> {
        let fs = self.fs.as_ref();
        if let Some(found) = probe.file(fs, base.to_path_buf()) {
            return Some(found);
        }
        if let Some(found) = self.probe_extensions(base, probe) {
            return Some(found);
        }
        if !fs.is_dir(base) {
            return None;
        }
        self.package_entry(base, probe)
    }

    /// Entry file of directory `dir`: each `package.json` main field as-is or
    /// with an extension, then `index` with an extension.
    fn package_entry(&self, dir: &Path, probe: &mut Probe) -> Option<PathBuf> {
        let fs = self.fs.as_ref();
        for entry in self.main_field_entries(dir) {
            if let Some(found) = probe
                .file(fs, entry.clone())
                .or_else(|| self.probe_extensions(&entry, probe))
            {
                return Some(found);
            }
        }
        self.probe_extensions(&dir.join("index"), probe)
    }

    fn probe_extensions(&self, base: &Path, probe: &mut Probe) -> Option<PathBuf> {
        let fs = self.fs.as_ref();
        self.extensions.iter().find_map(|ext| {
            let mut candidate = base.as_os_str().to_owned();
            candidate.push(ext);
            probe.file(fs, PathBuf::from(candidate))
        })
    }

    /// Entry points named by `package.json` in `dir`, in main-field order.
    fn main_field_entries(&self, dir: &Path) -> Vec<PathBuf> {
        let Ok(manifest) = self.fs.read_to_string(&dir.join("package.json")) else {
            return Vec::new();
        };
        let Ok(serde_json::Value::Object(fields)) = serde_json::from_str(&manifest) else {
            return Vec::new();
        };
        self.main_fields
            .iter()
            .filter_map(|field| fields.get(field)?.as_str())
            .map(|entry| normalize(&dir.join(entry)))
            .collect()
    }

    fn module_dirs(&self, importer: &Path) -> Vec<PathBuf> {
        let start = importer.parent().unwrap_or(&self.root);
        let mut dirs = Vec::new();
        for module in &self.modules {
            if module.is_absolute() {
                dirs.push(module.clone());
                continue;
            }
            dirs.extend(start.ancestors().map(|ancestor| ancestor.join(module)));
        }
        dirs
    }
}

fn is_relative(request: &str) -> bool {
    request == "." || request == ".." || request.starts_with("./") || request.starts_with("../")
}

fn is_path_like(target: &str) -> bool {
    is_relative(target) || Path::new(target).is_absolute()
}

/// Lexically remove `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
