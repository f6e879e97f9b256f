//! Output planning: where artifacts go and what they are called.

use std::path::{Path, PathBuf};

use kiln_core::{BuildMode, FilenameTemplate};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// `output` section of the configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct OutputConfig {
    /// Target directory, relative to the project root.
    pub path: PathBuf,
    /// Bundle filename template.
    pub filename: String,
    /// Filename template for files emitted by the asset handler.
    pub asset_filename: String,
    /// Prefix for every URL that references an emitted file.
    pub public_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("build"),
            filename: "app-[contenthash].bundle.js".into(),
            asset_filename: "[contenthash][ext]".into(),
            public_path: String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceMapMode {
    Inline,
    None,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputDescriptor {
    pub target_dir: PathBuf,
    pub filename: FilenameTemplate,
    pub asset_filename: FilenameTemplate,
    pub public_path: String,
    /// Always set: the target directory is emptied before anything is written.
    pub clean: bool,
    pub minify: bool,
    pub source_map: SourceMapMode,
}

/// Plan the output for `mode`.
///
/// Fails when a filename template is malformed or not content-addressed.
pub fn plan_output(mode: BuildMode, config: &OutputConfig, root: &Path) -> Result<OutputDescriptor> {
    Ok(OutputDescriptor {
        target_dir: root.join(&config.path),
        filename: FilenameTemplate::parse(&config.filename)?,
        asset_filename: FilenameTemplate::parse(&config.asset_filename)?,
        public_path: config.public_path.clone(),
        clean: true,
        minify: mode.minifies(),
        source_map: if mode.inline_source_map() {
            SourceMapMode::Inline
        } else {
            SourceMapMode::None
        },
    })
}

impl OutputDescriptor {
    /// Content-addressed bundle filename for chunk `name`.
    pub fn bundle_filename(&self, name: &str, content: &[u8]) -> String {
        self.filename.render(name, ".js", content)
    }

    /// Content-addressed filename for an emitted asset.
    pub fn asset_filename(&self, source: &Path, content: &[u8]) -> String {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        self.asset_filename.render(&stem, &ext, content)
    }

    /// URL under which `filename` is referenced from HTML and code.
    pub fn public_url(&self, filename: &str) -> String {
        if self.public_path.is_empty() {
            return filename.to_owned();
        }
        if self.public_path.ends_with('/') {
            format!("{}{filename}", self.public_path)
        } else {
            format!("{}/{filename}", self.public_path)
        }
    }
}
