//! Dev server descriptor.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::output::OutputDescriptor;

/// `devServer` section of the configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DevServerSettings {
    /// Extra directories served verbatim, relative to the project root.
    #[serde(rename = "static")]
    pub static_dirs: Vec<PathBuf>,
    /// Persist every rebuild to the target directory, not only to memory.
    pub write_to_disk: bool,
    pub host: String,
    pub port: u16,
    pub live_reload: bool,
}

impl Default for DevServerSettings {
    fn default() -> Self {
        Self {
            static_dirs: vec![PathBuf::from("web/public")],
            write_to_disk: true,
            host: "127.0.0.1".into(),
            port: 8080,
            live_reload: true,
        }
    }
}

/// How the build output is exposed during development.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DevServerConfig {
    /// Searched in order; the output target directory comes first.
    pub static_roots: Vec<PathBuf>,
    /// When set, artifacts are written to disk on every rebuild so processes
    /// reading the filesystem see them. Otherwise they live in memory only.
    pub write_to_disk: bool,
    pub host: String,
    pub port: u16,
    pub live_reload: bool,
}

impl DevServerConfig {
    pub fn describe(settings: &DevServerSettings, output: &OutputDescriptor, root: &Path) -> Self {
        let mut static_roots = vec![output.target_dir.clone()];
        for dir in &settings.static_dirs {
            let dir = root.join(dir);
            if !static_roots.contains(&dir) {
                static_roots.push(dir);
            }
        }
        Self {
            static_roots,
            write_to_disk: settings.write_to_disk,
            host: settings.host.clone(),
            port: settings.port,
            live_reload: settings.live_reload,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
